//! Fakes for driving the reconciler without a wiki.
//!
//! Compiled for this crate's own tests and, through the `testing` feature, for
//! dependents' tests. [`MemoryStore`] keeps entities in memory, records every
//! write it is asked to perform and can be told to fail. [`RecordingObserver`]
//! keeps every log message.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use exocomp_core::types::{EntityId, EntityView, PropertyKey, SiteKey};

use crate::observer::{Level, Observer};
use crate::store::EntityStore;

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// A write a store was asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCall {
    Sitelink {
        id: EntityId,
        site: SiteKey,
        title: String,
    },
    Property {
        id: EntityId,
        property: PropertyKey,
        value: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("entity {0} is unavailable")]
    Unavailable(EntityId),

    #[error("listing is unavailable")]
    ListingUnavailable,

    #[error("write to {0} rejected")]
    WriteRejected(EntityId),

    #[error("entity {0} does not exist")]
    NoSuchEntity(EntityId),
}

/// Entities held in memory. Single-threaded, like the reconciler itself.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entities: RefCell<BTreeMap<EntityId, EntityView>>,
    writes: RefCell<Vec<WriteCall>>,
    failing_fetch: BTreeSet<EntityId>,
    fail_listing: bool,
    fail_sitelink_writes: bool,
    fail_property_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(self, entity: EntityView) -> Self {
        self.entities
            .borrow_mut()
            .insert(entity.id.clone(), entity);
        self
    }

    /// Fetching `id` returns an error instead of the entity.
    pub fn failing_fetch(mut self, id: &str) -> Self {
        self.failing_fetch.insert(EntityId::from(id));
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn failing_sitelink_writes(mut self) -> Self {
        self.fail_sitelink_writes = true;
        self
    }

    pub fn failing_property_writes(mut self) -> Self {
        self.fail_property_writes = true;
        self
    }

    /// Every write attempted so far, failed ones included.
    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }

    pub fn entity(&self, id: &str) -> Option<EntityView> {
        self.entities.borrow().get(&EntityId::from(id)).cloned()
    }

    fn update<F>(&self, id: &EntityId, apply: F) -> Result<(), MemoryStoreError>
    where
        F: FnOnce(&mut EntityView),
    {
        let mut entities = self.entities.borrow_mut();
        let entity = entities
            .get_mut(id)
            .ok_or_else(|| MemoryStoreError::NoSuchEntity(id.clone()))?;
        apply(entity);
        Ok(())
    }
}

impl EntityStore for MemoryStore {
    type Error = MemoryStoreError;

    fn list_entity_ids(&self, limit: usize) -> Result<Vec<EntityId>, Self::Error> {
        if self.fail_listing {
            return Err(MemoryStoreError::ListingUnavailable);
        }
        Ok(self.entities.borrow().keys().take(limit).cloned().collect())
    }

    fn get_entity(&self, id: &EntityId) -> Result<Option<EntityView>, Self::Error> {
        if self.failing_fetch.contains(id) {
            return Err(MemoryStoreError::Unavailable(id.clone()));
        }
        Ok(self.entities.borrow().get(id).cloned())
    }

    fn set_sitelink(&self, id: &EntityId, site: &SiteKey, title: &str) -> Result<(), Self::Error> {
        self.writes.borrow_mut().push(WriteCall::Sitelink {
            id: id.clone(),
            site: site.clone(),
            title: title.to_string(),
        });
        if self.fail_sitelink_writes {
            return Err(MemoryStoreError::WriteRejected(id.clone()));
        }
        self.update(id, |entity| entity.insert_sitelink(site.as_str(), title))
    }

    fn set_property_value(
        &self,
        id: &EntityId,
        property: &PropertyKey,
        value: &str,
    ) -> Result<(), Self::Error> {
        self.writes.borrow_mut().push(WriteCall::Property {
            id: id.clone(),
            property: property.clone(),
            value: value.to_string(),
        });
        if self.fail_property_writes {
            return Err(MemoryStoreError::WriteRejected(id.clone()));
        }
        self.update(id, |entity| {
            entity.insert_claim(
                property.as_str(),
                serde_json::Value::String(value.to_string()),
                "string",
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Recording observer
// ---------------------------------------------------------------------------

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    entries: RefCell<Vec<(Level, String)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if some message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl Observer for RecordingObserver {
    fn log(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}
