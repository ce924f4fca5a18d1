//! Entity store over the MediaWiki action API of a Wikibase instance.
//!
//! [`WikibaseClient`] logs in with a bot password, then serves the reads and
//! writes the reconciler needs. Value encoding for property writes lives in
//! [`api::encode_value`].

pub mod api;
mod client;
mod error;

pub use client::{ClientOptions, WikibaseClient};
pub use error::WikibaseError;
