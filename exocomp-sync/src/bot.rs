//! Module registry: run named bot tasks one after another.

use serde::Serialize;

use crate::error::SyncError;
use crate::stats::RunStatistics;

/// Static description of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub author: &'static str,
}

/// A task the bot can run.
pub trait BotModule {
    /// Run the task to completion. Per-item failures are counted in
    /// [`stats`](Self::stats); only run-level failures are returned.
    fn execute(&mut self) -> Result<(), SyncError>;

    /// Statistics of the most recent `execute`.
    fn stats(&self) -> RunStatistics;

    fn metadata(&self) -> ModuleMetadata;
}

/// Named modules in registration order.
#[derive(Default)]
pub struct Bot<'a> {
    modules: Vec<(String, Box<dyn BotModule + 'a>)>,
}

impl<'a> Bot<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module` under `name`, replacing any module already there.
    pub fn register(&mut self, name: impl Into<String>, module: Box<dyn BotModule + 'a>) {
        let name = name.into();
        tracing::debug!("Module registered: {name}");
        match self.modules.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = module,
            None => self.modules.push((name, module)),
        }
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn module(&self, name: &str) -> Option<&(dyn BotModule + 'a)> {
        self.modules
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m.as_ref())
    }

    /// Run one module and return its statistics.
    pub fn run_module(&mut self, name: &str) -> Result<RunStatistics, SyncError> {
        let module = self
            .modules
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
            .ok_or_else(|| SyncError::ModuleNotFound(name.to_string()))?;

        tracing::info!("Running module: {name}");
        module.execute()?;

        let stats = module.stats();
        tracing::info!(
            "Module {name} completed with stats: {}",
            serde_json::to_string(&stats)?
        );
        Ok(stats)
    }

    /// Run every module. A failing module is logged and does not stop the rest.
    pub fn run_all(&mut self) -> Vec<(String, Result<RunStatistics, SyncError>)> {
        if self.modules.is_empty() {
            tracing::warn!("No modules registered");
            return Vec::new();
        }

        let names: Vec<String> = self.modules.iter().map(|(n, _)| n.clone()).collect();
        let mut results = Vec::with_capacity(names.len());
        for name in names {
            let result = self.run_module(&name);
            if let Err(err) = &result {
                tracing::error!("Error running module {name}: {err}");
            }
            results.push((name, result));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        runs: u64,
        fail: bool,
    }

    impl BotModule for Counting {
        fn execute(&mut self) -> Result<(), SyncError> {
            if self.fail {
                return Err(SyncError::ModuleNotFound("inner".to_string()));
            }
            self.runs += 1;
            Ok(())
        }

        fn stats(&self) -> RunStatistics {
            RunStatistics {
                checked: self.runs,
                skipped: self.runs,
                ..RunStatistics::default()
            }
        }

        fn metadata(&self) -> ModuleMetadata {
            ModuleMetadata {
                name: "Counting",
                description: "counts runs",
                version: "0.0.1",
                author: "tests",
            }
        }
    }

    fn counting(fail: bool) -> Box<dyn BotModule> {
        Box::new(Counting { runs: 0, fail })
    }

    #[test]
    fn unknown_module_is_an_error() {
        let mut bot = Bot::new();
        let err = bot.run_module("nope").unwrap_err();
        assert!(matches!(err, SyncError::ModuleNotFound(ref n) if n == "nope"));
    }

    #[test]
    fn run_module_returns_stats() {
        let mut bot = Bot::new();
        bot.register("a", counting(false));
        let stats = bot.run_module("a").unwrap();
        assert_eq!(stats.checked, 1);
        assert_eq!(bot.module("a").unwrap().metadata().name, "Counting");
    }

    #[test]
    fn run_all_continues_after_failure_in_registration_order() {
        let mut bot = Bot::new();
        bot.register("first", counting(true));
        bot.register("second", counting(false));
        let results = bot.run_all();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "first");
        assert!(results[0].1.is_err());
        assert!(results[1].1.is_ok());
    }

    #[test]
    fn register_same_name_replaces() {
        let mut bot = Bot::new();
        bot.register("a", counting(true));
        bot.register("a", counting(false));
        assert_eq!(bot.module_names(), vec!["a"]);
        assert!(bot.run_module("a").is_ok());
    }

    #[test]
    fn run_all_on_empty_bot_is_empty() {
        assert!(Bot::new().run_all().is_empty());
    }
}
