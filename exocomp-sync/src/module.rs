//! The sitelink/property sync module: list ids, reconcile them, keep stats.

use exocomp_core::config::ModuleConfig;

use crate::bot::{BotModule, ModuleMetadata};
use crate::error::SyncError;
use crate::observer::Observer;
use crate::reconcile::{Reconciler, SyncOptions};
use crate::stats::RunStatistics;
use crate::store::EntityStore;

/// Keeps one sitelink and one property in agreement across listed entities.
pub struct SitelinkPropertySync<S, O> {
    reconciler: Reconciler<S, O>,
    limit: usize,
    stats: RunStatistics,
}

impl<S: EntityStore, O: Observer> SitelinkPropertySync<S, O> {
    pub fn new(store: S, observer: O, options: SyncOptions, limit: usize) -> Self {
        Self {
            reconciler: Reconciler::new(store, observer, options),
            limit,
            stats: RunStatistics::default(),
        }
    }

    /// Build from module configuration. `force_dry_run` (the CLI flag) can
    /// only switch dry-run on, never off.
    pub fn from_config(store: S, observer: O, config: &ModuleConfig, force_dry_run: bool) -> Self {
        let options = SyncOptions {
            property: config.property.clone(),
            site: config.sitelink.clone(),
            dry_run: force_dry_run || config.dry_run,
        };
        Self::new(store, observer, options, config.limit)
    }

    pub fn options(&self) -> &SyncOptions {
        self.reconciler.options()
    }
}

impl<S: EntityStore, O: Observer> BotModule for SitelinkPropertySync<S, O> {
    fn execute(&mut self) -> Result<(), SyncError> {
        self.stats = RunStatistics::default();

        let options = self.reconciler.options();
        let observer = self.reconciler.observer();
        let mode = if options.dry_run { "DRY-RUN" } else { "LIVE" };
        observer.info(&format!(
            "Starting sitelink-property sync [{mode}] (Property: {}, Sitelink: {})",
            options.property, options.site
        ));

        let ids = self
            .reconciler
            .store()
            .list_entity_ids(self.limit)
            .map_err(|e| SyncError::Listing {
                source: Box::new(e),
            })?;

        if ids.is_empty() {
            observer.warn("No items found to process");
            return Ok(());
        }

        observer.info(&format!("Processing {} items", ids.len()));
        self.stats = self.reconciler.run(ids);

        self.reconciler.observer().info(&format!(
            "Sync complete. Stats: {}",
            serde_json::to_string(&self.stats)?
        ));
        Ok(())
    }

    fn stats(&self) -> RunStatistics {
        self.stats
    }

    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            name: "SitelinkPropertySync",
            description: "Synchronizes a sitelink with a specific property in Wikibase items",
            version: env!("CARGO_PKG_VERSION"),
            author: "WikiTrek",
        }
    }
}
