//! Sitelink/property reconciliation.
//!
//! ## Decision policy (first match wins)
//!
//! 1. Neither side present → skip (`NeitherPresent`).
//! 2. Both present and byte-equal → skip (`AlreadyEqual`).
//! 3. Otherwise the target is the sitelink title if there is one, else the
//!    property value. Every side not already at the target is written.
//!
//! Because the target always equals one side, at most one write is issued per
//! entity in practice: the property when the sitelink leads, the sitelink when
//! only the property is set.

use std::fmt;

use exocomp_core::types::{EntityId, PropertyKey, SiteKey};

use crate::observer::Observer;
use crate::stats::RunStatistics;
use crate::store::EntityStore;

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// One of the two values kept in agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Sitelink,
    Property,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Sitelink => write!(f, "sitelink"),
            Side::Property => write!(f, "property"),
        }
    }
}

/// Why an entity needed no write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NeitherPresent,
    AlreadyEqual,
}

/// Result of the pure decision step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Sync { target: String, sides: Vec<Side> },
}

/// Decide whether and how two values must converge.
pub fn decide(sitelink: Option<&str>, property: Option<&str>) -> Decision {
    let target = match (sitelink, property) {
        (None, None) => return Decision::Skip(SkipReason::NeitherPresent),
        (Some(s), Some(p)) if s == p => return Decision::Skip(SkipReason::AlreadyEqual),
        (Some(s), _) => s,
        (None, Some(p)) => p,
    };

    let mut sides = Vec::with_capacity(1);
    if sitelink != Some(target) {
        sides.push(Side::Sitelink);
    }
    if property != Some(target) {
        sides.push(Side::Property);
    }
    Decision::Sync {
        target: target.to_string(),
        sides,
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A failed write to one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideFailure {
    pub side: Side,
    pub cause: String,
}

/// Why an entity ended in the error bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    /// The store has no such entity.
    NotFound,
    /// The store failed to fetch the entity.
    Fetch(String),
    /// Every attempted write failed.
    Write(Vec<SideFailure>),
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncFailure::NotFound => write!(f, "not found"),
            SyncFailure::Fetch(cause) => write!(f, "fetch failed: {cause}"),
            SyncFailure::Write(failures) => {
                let parts: Vec<String> = failures
                    .iter()
                    .map(|fail| format!("{}: {}", fail.side, fail.cause))
                    .collect();
                write!(f, "write failed ({})", parts.join("; "))
            }
        }
    }
}

/// Terminal outcome for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    /// `sides` lists the sides written, or in dry-run the sides that would be.
    Synced { target: String, sides: Vec<Side> },
    Error(SyncFailure),
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Which values to reconcile, and whether to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub property: PropertyKey,
    pub site: SiteKey,
    pub dry_run: bool,
}

/// Processes entities strictly one at a time: fetch, decide, write.
pub struct Reconciler<S, O> {
    store: S,
    observer: O,
    options: SyncOptions,
}

impl<S: EntityStore, O: Observer> Reconciler<S, O> {
    pub fn new(store: S, observer: O, options: SyncOptions) -> Self {
        Self {
            store,
            observer,
            options,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Reconcile every id in order and return fresh statistics for this run.
    ///
    /// Never stops early: a failing entity is counted and the next one is
    /// processed. Dropping the iterator early (e.g. on interrupt) leaves the
    /// counters valid for the ids already consumed.
    pub fn run<I>(&self, ids: I) -> RunStatistics
    where
        I: IntoIterator<Item = EntityId>,
    {
        let mut stats = RunStatistics::default();
        for id in ids {
            let outcome = self.sync_entity(&id);
            stats.record(&outcome);
        }
        stats
    }

    /// Reconcile a single entity.
    pub fn sync_entity(&self, id: &EntityId) -> SyncOutcome {
        let entity = match self.store.get_entity(id) {
            Ok(Some(entity)) => entity,
            Ok(None) => {
                self.observer.warn(&format!("Item {id} not found"));
                return SyncOutcome::Error(SyncFailure::NotFound);
            }
            Err(err) => {
                let cause = error_chain(&err);
                self.observer
                    .error(&format!("Error fetching {id}: {cause}"));
                return SyncOutcome::Error(SyncFailure::Fetch(cause));
            }
        };

        let sitelink = entity.sitelink_value(&self.options.site);
        let property = entity.property_value(&self.options.property);
        self.observer.debug(&format!(
            "Item {id}: sitelink={}, property={}",
            show(sitelink),
            show(property.as_deref())
        ));

        match decide(sitelink, property.as_deref()) {
            Decision::Skip(SkipReason::NeitherPresent) => {
                self.observer.debug(&format!(
                    "Item {id} has neither sitelink nor property, skipping"
                ));
                SyncOutcome::Skipped(SkipReason::NeitherPresent)
            }
            Decision::Skip(SkipReason::AlreadyEqual) => {
                self.observer
                    .debug(&format!("Item {id} already synchronized"));
                SyncOutcome::Skipped(SkipReason::AlreadyEqual)
            }
            Decision::Sync { target, sides } if self.options.dry_run => {
                self.observer.info(&format!(
                    "[DRY-RUN] Would sync {id}: sitelink={}, property={} -> {target}",
                    show(sitelink),
                    show(property.as_deref())
                ));
                SyncOutcome::Synced { target, sides }
            }
            Decision::Sync { target, sides } => self.apply(id, target, &sides),
        }
    }

    /// Issue one write per side. A failure on one side does not stop the other
    /// and does not undo a write that already succeeded.
    fn apply(&self, id: &EntityId, target: String, sides: &[Side]) -> SyncOutcome {
        let mut written = Vec::new();
        let mut failed = Vec::new();

        for &side in sides {
            let result = match side {
                Side::Sitelink => self.store.set_sitelink(id, &self.options.site, &target),
                Side::Property => self
                    .store
                    .set_property_value(id, &self.options.property, &target),
            };
            match result {
                Ok(()) => {
                    self.observer.info(&self.updated_message(id, side, &target));
                    written.push(side);
                }
                Err(err) => {
                    let cause = error_chain(&err);
                    self.observer
                        .error(&format!("Failed to update {side} for {id}: {cause}"));
                    failed.push(SideFailure { side, cause });
                }
            }
        }

        if written.is_empty() {
            SyncOutcome::Error(SyncFailure::Write(failed))
        } else {
            SyncOutcome::Synced {
                target,
                sides: written,
            }
        }
    }

    fn updated_message(&self, id: &EntityId, side: Side, target: &str) -> String {
        match side {
            Side::Sitelink => format!(
                "Updated sitelink {} for {id} to '{target}'",
                self.options.site
            ),
            Side::Property => format!(
                "Updated property {} for {id} to '{target}'",
                self.options.property
            ),
        }
    }
}

fn show(value: Option<&str>) -> &str {
    value.unwrap_or("(none)")
}

/// `err` followed by each of its sources, joined with `: `.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
