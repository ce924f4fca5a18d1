//! Reconciler behavior over whole runs: skip rules, precedence, dry-run,
//! idempotence and the counter invariant.

use exocomp_core::{
    types::{EntityId, EntityView, PropertyKey, SiteKey},
    ModuleConfig,
};
use exocomp_sync::{
    observer::Level, BotModule, MemoryStore, Reconciler, RecordingObserver, RunStatistics,
    SitelinkPropertySync, SkipReason, SyncError, SyncOptions, SyncOutcome, WriteCall,
};
use rstest::rstest;

fn options(dry_run: bool) -> SyncOptions {
    SyncOptions {
        property: PropertyKey::from("P42"),
        site: SiteKey::from("wikidata"),
        dry_run,
    }
}

fn ids(list: &[&str]) -> Vec<EntityId> {
    list.iter().map(|s| EntityId::from(*s)).collect()
}

/// One entity of every shape the decision policy distinguishes.
fn mixed_store() -> MemoryStore {
    MemoryStore::new()
        .with_entity(EntityView::new("Q1").with_sitelink("wikidata", "Foo"))
        .with_entity(
            EntityView::new("Q2")
                .with_sitelink("wikidata", "Foo")
                .with_string_claim("P42", "Bar"),
        )
        .with_entity(EntityView::new("Q4"))
        .with_entity(
            EntityView::new("Q5")
                .with_sitelink("wikidata", "Same")
                .with_string_claim("P42", "Same"),
        )
        .with_entity(EntityView::new("Q6").with_string_claim("P42", "Baz"))
}

// ---------------------------------------------------------------------------
// 1. Scenarios
// ---------------------------------------------------------------------------

#[test]
fn q1_sitelink_only_writes_property() {
    let store = mixed_store();
    let reconciler = Reconciler::new(&store, RecordingObserver::new(), options(false));

    let stats = reconciler.run(ids(&["Q1"]));

    assert_eq!(stats.synced, 1);
    assert_eq!(
        store.writes(),
        vec![WriteCall::Property {
            id: EntityId::from("Q1"),
            property: PropertyKey::from("P42"),
            value: "Foo".to_string(),
        }]
    );
}

#[test]
fn q2_sitelink_wins_over_differing_property() {
    let store = mixed_store();
    let reconciler = Reconciler::new(&store, RecordingObserver::new(), options(false));

    let outcome = reconciler.sync_entity(&EntityId::from("Q2"));

    assert!(matches!(outcome, SyncOutcome::Synced { ref target, .. } if target == "Foo"));
    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    assert!(
        !writes.iter().any(|w| matches!(w, WriteCall::Sitelink { .. })),
        "sitelink must not be written when it leads"
    );
    assert!(matches!(&writes[0], WriteCall::Property { value, .. } if value == "Foo"));
}

#[test]
fn q3_missing_entity_counts_checked_and_error_only() {
    let store = mixed_store();
    let observer = RecordingObserver::new();
    let reconciler = Reconciler::new(&store, &observer, options(false));

    let stats = reconciler.run(ids(&["Q3"]));

    assert_eq!(
        stats,
        RunStatistics {
            checked: 1,
            synced: 0,
            skipped: 0,
            errors: 1
        }
    );
    assert!(store.writes().is_empty());
    assert!(observer.contains(Level::Warn, "Item Q3 not found"));
}

// ---------------------------------------------------------------------------
// 2. Properties
// ---------------------------------------------------------------------------

#[rstest]
#[case("Q4", SkipReason::NeitherPresent)]
#[case("Q5", SkipReason::AlreadyEqual)]
fn skips_issue_no_writes(#[case] id: &str, #[case] reason: SkipReason) {
    let store = mixed_store();
    let reconciler = Reconciler::new(&store, RecordingObserver::new(), options(false));

    assert_eq!(
        reconciler.sync_entity(&EntityId::from(id)),
        SyncOutcome::Skipped(reason)
    );
    assert!(store.writes().is_empty());
}

#[test]
fn property_only_writes_only_sitelink() {
    let store = mixed_store();
    let reconciler = Reconciler::new(&store, RecordingObserver::new(), options(false));

    reconciler.run(ids(&["Q6"]));

    assert_eq!(
        store.writes(),
        vec![WriteCall::Sitelink {
            id: EntityId::from("Q6"),
            site: SiteKey::from("wikidata"),
            title: "Baz".to_string(),
        }]
    );
}

#[test]
fn second_live_run_skips_everything_as_equal() {
    let store = mixed_store();
    let reconciler = Reconciler::new(&store, RecordingObserver::new(), options(false));
    let all = ids(&["Q1", "Q2", "Q5", "Q6"]);

    let first = reconciler.run(all.clone());
    assert_eq!(first.synced, 3);

    store.clear_writes();
    for id in &all {
        assert_eq!(
            reconciler.sync_entity(id),
            SyncOutcome::Skipped(SkipReason::AlreadyEqual),
            "{id} should already be in agreement"
        );
    }
    assert!(store.writes().is_empty());
}

#[rstest]
#[case(&[])]
#[case(&["Q1"])]
#[case(&["Q3", "Q3", "Q3"])]
#[case(&["Q1", "Q2", "Q3", "Q4", "Q5", "Q6"])]
fn counters_always_add_up(#[case] list: &[&str]) {
    let store = mixed_store().failing_fetch("Q4");
    let reconciler = Reconciler::new(&store, RecordingObserver::new(), options(false));

    let stats = reconciler.run(ids(list));

    assert_eq!(stats.checked, list.len() as u64);
    assert!(stats.is_consistent(), "{stats:?}");
}

#[test]
fn empty_run_has_zero_counters() {
    let store = MemoryStore::new();
    let reconciler = Reconciler::new(&store, RecordingObserver::new(), options(false));
    assert_eq!(reconciler.run(Vec::new()), RunStatistics::default());
}

#[test]
fn dry_run_never_writes_but_counts_synced() {
    let store = mixed_store();
    let reconciler = Reconciler::new(&store, RecordingObserver::new(), options(true));

    let stats = reconciler.run(ids(&["Q1", "Q2", "Q3", "Q4", "Q5", "Q6"]));

    assert!(store.writes().is_empty());
    assert_eq!(
        stats,
        RunStatistics {
            checked: 6,
            synced: 3,
            skipped: 2,
            errors: 1
        }
    );
}

#[test]
fn failed_writes_do_not_abort_the_run() {
    let store = mixed_store()
        .failing_property_writes()
        .failing_sitelink_writes();
    let reconciler = Reconciler::new(&store, RecordingObserver::new(), options(false));

    let stats = reconciler.run(ids(&["Q1", "Q2", "Q4", "Q6"]));

    assert_eq!(stats.checked, 4);
    assert_eq!(stats.errors, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.synced, 0);
    assert_eq!(store.writes().len(), 3, "every divergent entity is still attempted");
}

// ---------------------------------------------------------------------------
// 3. Module
// ---------------------------------------------------------------------------

#[test]
fn module_lists_and_reconciles_up_to_limit() {
    let store = mixed_store();
    let observer = RecordingObserver::new();
    let config = ModuleConfig {
        limit: 2,
        ..ModuleConfig::default()
    };
    let mut module = SitelinkPropertySync::from_config(&store, &observer, &config, false);

    module.execute().expect("execute");

    assert_eq!(module.stats().checked, 2);
    assert!(observer.contains(Level::Info, "[LIVE]"));
    assert!(observer.contains(Level::Info, "Processing 2 items"));
    assert!(observer.contains(Level::Info, "Sync complete. Stats: {\"checked\":2"));
}

#[test]
fn module_cli_flag_forces_dry_run() {
    let store = mixed_store();
    let observer = RecordingObserver::new();
    let mut module =
        SitelinkPropertySync::from_config(&store, &observer, &ModuleConfig::default(), true);

    assert!(module.options().dry_run);
    module.execute().expect("execute");

    assert!(store.writes().is_empty());
    assert!(observer.contains(Level::Info, "[DRY-RUN]"));
}

#[test]
fn module_with_nothing_listed_warns_and_succeeds() {
    let store = MemoryStore::new();
    let observer = RecordingObserver::new();
    let mut module =
        SitelinkPropertySync::from_config(&store, &observer, &ModuleConfig::default(), false);

    module.execute().expect("execute");

    assert_eq!(module.stats(), RunStatistics::default());
    assert!(observer.contains(Level::Warn, "No items found to process"));
}

#[test]
fn module_listing_failure_is_fatal() {
    let store = MemoryStore::new().failing_listing();
    let mut module = SitelinkPropertySync::from_config(
        &store,
        RecordingObserver::new(),
        &ModuleConfig::default(),
        false,
    );

    let err = module.execute().unwrap_err();
    assert!(matches!(err, SyncError::Listing { .. }));
    let cause = std::error::Error::source(&err).expect("cause");
    assert_eq!(cause.to_string(), "listing is unavailable");
}

#[test]
fn module_stats_reset_between_runs() {
    let store = mixed_store();
    let mut module = SitelinkPropertySync::from_config(
        &store,
        RecordingObserver::new(),
        &ModuleConfig::default(),
        false,
    );

    module.execute().expect("first");
    let first = module.stats();
    module.execute().expect("second");
    let second = module.stats();

    assert_eq!(first.checked, second.checked);
    assert_eq!(second.synced, 0);
    assert_eq!(second.skipped, second.checked);
}
