//! Exocomp core library: domain types, entity projections, configuration.
//!
//! - [`types`]: newtypes and the fetched entity view
//! - [`config`]: YAML configuration, discovery and environment overrides
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ModuleConfig, SITELINK_PROPERTY_SYNC};
pub use error::ConfigError;
pub use types::{EntityId, EntityView, PropertyKey, SiteKey, ValueKind};
