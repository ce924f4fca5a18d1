//! The entity store seam consumed by the reconciler.
//!
//! [`EntityStore`] is implemented over HTTP by `exocomp-wikibase`; an
//! in-memory store for tests lives in `testing`.

use exocomp_core::types::{EntityId, EntityView, PropertyKey, SiteKey};

/// Read/write access to entities.
///
/// Implementations own transport concerns (auth, retries, pagination, value
/// encoding). `get_entity` returns `Ok(None)` for an entity that does not exist.
pub trait EntityStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Up to `limit` entity ids; may be empty, order not guaranteed.
    fn list_entity_ids(&self, limit: usize) -> Result<Vec<EntityId>, Self::Error>;

    fn get_entity(&self, id: &EntityId) -> Result<Option<EntityView>, Self::Error>;

    fn set_sitelink(&self, id: &EntityId, site: &SiteKey, title: &str) -> Result<(), Self::Error>;

    /// Write `value` as the value of `property`, encoded for the property's type.
    fn set_property_value(
        &self,
        id: &EntityId,
        property: &PropertyKey,
        value: &str,
    ) -> Result<(), Self::Error>;
}

impl<T: EntityStore + ?Sized> EntityStore for &T {
    type Error = T::Error;

    fn list_entity_ids(&self, limit: usize) -> Result<Vec<EntityId>, Self::Error> {
        (**self).list_entity_ids(limit)
    }

    fn get_entity(&self, id: &EntityId) -> Result<Option<EntityView>, Self::Error> {
        (**self).get_entity(id)
    }

    fn set_sitelink(&self, id: &EntityId, site: &SiteKey, title: &str) -> Result<(), Self::Error> {
        (**self).set_sitelink(id, site, title)
    }

    fn set_property_value(
        &self,
        id: &EntityId,
        property: &PropertyKey,
        value: &str,
    ) -> Result<(), Self::Error> {
        (**self).set_property_value(id, property, value)
    }
}
