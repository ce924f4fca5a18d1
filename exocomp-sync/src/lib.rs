//! # exocomp-sync
//!
//! Sitelink/property reconciliation and the module shell that hosts it.
//!
//! Call [`Reconciler::run`] to reconcile a sequence of entity ids against an
//! [`EntityStore`], or register a [`SitelinkPropertySync`] module in a [`Bot`]
//! and let it list the ids itself.

pub mod bot;
pub mod error;
pub mod module;
pub mod observer;
pub mod reconcile;
pub mod stats;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bot::{Bot, BotModule, ModuleMetadata};
pub use error::SyncError;
pub use module::SitelinkPropertySync;
pub use observer::{LogObserver, Observer};
pub use reconcile::{decide, Decision, Reconciler, Side, SkipReason, SyncFailure, SyncOptions, SyncOutcome};
pub use stats::RunStatistics;
pub use store::EntityStore;
#[cfg(any(test, feature = "testing"))]
pub use testing::{MemoryStore, MemoryStoreError, RecordingObserver, WriteCall};
