//! Pure helpers for the action API: error envelopes, response shapes, value
//! encoding. Nothing in here performs I/O.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Value};

use exocomp_core::types::{EntityId, EntityView, ValueKind};

use crate::error::WikibaseError;

/// Largest `aplimit` a regular (non-bot-flagged) account may request.
pub const MAX_PAGE_BATCH: usize = 500;

/// Turn an `{"error": {...}}` envelope into [`WikibaseError::Api`].
pub fn check_api_error(body: &Value) -> Result<(), WikibaseError> {
    match body.get("error") {
        Some(error) => Err(WikibaseError::Api {
            code: error
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            info: error
                .get("info")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        None => Ok(()),
    }
}

/// Read `query.tokens.<name>` from a `meta=tokens` response.
pub fn token_from(body: &Value, name: &'static str) -> Result<String, WikibaseError> {
    body.get("query")
        .and_then(|q| q.get("tokens"))
        .and_then(|t| t.get(name))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(WikibaseError::MissingToken(name))
}

// ---------------------------------------------------------------------------
// allpages
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AllPagesResponse {
    #[serde(default)]
    pub query: Option<AllPagesQuery>,
    #[serde(default, rename = "continue")]
    pub continuation: Option<AllPagesContinue>,
}

#[derive(Debug, Deserialize)]
pub struct AllPagesQuery {
    #[serde(default)]
    pub allpages: Vec<PageRef>,
}

#[derive(Debug, Deserialize)]
pub struct PageRef {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct AllPagesContinue {
    #[serde(default)]
    pub apcontinue: Option<String>,
}

impl AllPagesResponse {
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.query
            .iter()
            .flat_map(|q| q.allpages.iter())
            .map(|p| p.title.as_str())
    }

    pub fn next_continue(&self) -> Option<&str> {
        self.continuation.as_ref()?.apcontinue.as_deref()
    }
}

/// Entity id for a page listed in `namespace`.
///
/// Outside the main namespace titles carry a `Namespace:` prefix, removed at
/// the first `:` (`Item:Q42` → `Q42`). Main-namespace titles pass through
/// whole, colons included.
pub fn entity_id_from_title(title: &str, namespace: i32) -> EntityId {
    let id = match title.split_once(':') {
        Some((_, rest)) if namespace != 0 => rest,
        _ => title,
    };
    EntityId::from(id.trim())
}

// ---------------------------------------------------------------------------
// wbgetentities / wbgetclaims
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct EntitiesResponse {
    #[serde(default)]
    pub entities: BTreeMap<String, EntityView>,
}

impl EntitiesResponse {
    /// The requested entity, or `None` when absent or flagged `missing`.
    pub fn take(mut self, id: &EntityId) -> Option<EntityView> {
        self.entities
            .remove(id.as_str())
            .filter(|entity| !entity.is_missing())
    }
}

/// GUID of the first statement in a `wbgetclaims` response, if any.
pub fn first_claim_guid(body: &Value, property: &str) -> Option<String> {
    body.get("claims")?
        .get(property)?
        .get(0)?
        .get("id")?
        .as_str()
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Value encoding
// ---------------------------------------------------------------------------

/// `Q42` → `42`. Anything else is `None`.
pub fn item_numeric_id(value: &str) -> Option<u64> {
    let digits = value.strip_prefix('Q')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// JSON text for the `value` parameter of `wbcreateclaim`/`wbsetclaimvalue`.
pub fn encode_value(kind: ValueKind, value: &str) -> Result<String, WikibaseError> {
    match kind {
        ValueKind::Item => {
            let numeric = item_numeric_id(value).ok_or_else(|| WikibaseError::InvalidValue {
                value: value.to_string(),
                reason: "expected an item id such as Q42",
            })?;
            Ok(json!({ "entity-type": "item", "numeric-id": numeric }).to_string())
        }
        ValueKind::String => Ok(Value::String(value.to_string()).to_string()),
    }
}
