//! End-of-run statistics block.

use std::time::Duration;

use exocomp_sync::RunStatistics;

pub const RULE_WIDTH: usize = 80;

/// `3725s` → `1h 2m 5s`, `65s` → `1m 5s`, `5s` → `5s`.
pub fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Lines of the statistics block, without timestamps.
pub fn lines(stats: &RunStatistics, elapsed: Duration) -> Vec<String> {
    vec![
        rule(),
        "Execution Statistics".to_string(),
        rule(),
        format!("Items checked:  {}", stats.checked),
        format!("Items synced:   {}", stats.synced),
        format!("Items skipped:  {}", stats.skipped),
        format!("Errors:         {}", stats.errors),
        format!("Execution time: {}", format_duration(elapsed)),
        rule(),
    ]
}

pub fn log(stats: &RunStatistics, elapsed: Duration) {
    for line in lines(stats, elapsed) {
        tracing::info!("{line}");
    }
}
