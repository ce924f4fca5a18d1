//! Domain types for Exocomp.
//!
//! The entity view mirrors the subset of the `wbgetentities` JSON document the
//! reconciler looks at. Everything in here is pure data: projections never touch
//! the network.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed entity identifier (e.g. `Q42`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed property key (e.g. `P42`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyKey(pub String);

impl PropertyKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for keys of the form `P<digits>`.
    pub fn is_well_formed(&self) -> bool {
        match self.0.strip_prefix('P') {
            Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed sitelink site key (e.g. `wikidata`, `enwiki`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteKey(pub String);

impl SiteKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for SiteKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SiteKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a property value is encoded when it is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Entity reference (`wikibase-item`), written as `{"entity-type":"item","numeric-id":N}`.
    #[default]
    Item,
    /// Plain string value.
    String,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Item => write!(f, "item"),
            ValueKind::String => write!(f, "string"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity view
// ---------------------------------------------------------------------------

/// A link from an entity to a page on another site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sitelink {
    pub site: String,
    pub title: String,
}

/// The value part of a snak.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataValue {
    pub value: Value,
    #[serde(rename = "type", default)]
    pub value_type: String,
}

/// The main snak of a statement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snak {
    pub snaktype: String,
    #[serde(default)]
    pub datavalue: Option<DataValue>,
}

impl Snak {
    /// Project the snak value to an opaque string.
    ///
    /// Entity references yield their id; `somevalue`/`novalue` snaks, empty
    /// strings and structured values without an id yield `None`.
    pub fn value_text(&self) -> Option<String> {
        if self.snaktype != "value" {
            return None;
        }
        match &self.datavalue.as_ref()?.value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Object(map) => {
                if let Some(Value::String(id)) = map.get("id") {
                    return (!id.is_empty()).then(|| id.clone());
                }
                let numeric = map.get("numeric-id")?.as_u64()?;
                let prefix = match map.get("entity-type").and_then(Value::as_str) {
                    Some("item") | None => "Q",
                    Some("property") => "P",
                    Some("lexeme") => "L",
                    Some(_) => return None,
                };
                Some(format!("{prefix}{numeric}"))
            }
            _ => None,
        }
    }
}

/// A single statement (claim) on an entity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Statement {
    /// Statement GUID, needed to replace the value in place.
    #[serde(default)]
    pub id: Option<String>,
    pub mainsnak: Snak,
}

/// The fetched representation of an entity, restricted to sitelinks and claims.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub sitelinks: BTreeMap<String, Sitelink>,
    #[serde(default, deserialize_with = "map_or_empty_list")]
    pub claims: BTreeMap<String, Vec<Statement>>,
    /// Present (as an empty string) when the entity does not exist.
    #[serde(default)]
    missing: Option<Value>,
}

impl EntityView {
    /// An empty view for `id`: no sitelinks, no claims.
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            sitelinks: BTreeMap::new(),
            claims: BTreeMap::new(),
            missing: None,
        }
    }

    /// `true` when the API reported the entity as missing.
    pub fn is_missing(&self) -> bool {
        self.missing.is_some()
    }

    /// Title of the sitelink to `site`, if one is set.
    pub fn sitelink_value(&self, site: &SiteKey) -> Option<&str> {
        self.sitelinks
            .get(site.as_str())
            .map(|link| link.title.as_str())
            .filter(|title| !title.is_empty())
    }

    /// Value of the first statement for `property`, if one is set.
    pub fn property_value(&self, property: &PropertyKey) -> Option<String> {
        self.claims
            .get(property.as_str())?
            .first()?
            .mainsnak
            .value_text()
    }

    /// The first statement for `property`.
    pub fn first_statement(&self, property: &PropertyKey) -> Option<&Statement> {
        self.claims.get(property.as_str())?.first()
    }

    /// Set (or replace) the sitelink to `site`.
    pub fn insert_sitelink(&mut self, site: &str, title: &str) {
        self.sitelinks.insert(
            site.to_string(),
            Sitelink {
                site: site.to_string(),
                title: title.to_string(),
            },
        );
    }

    /// Replace all statements for `property` with a single value statement.
    pub fn insert_claim(&mut self, property: &str, value: Value, value_type: &str) {
        let statement = Statement {
            id: Some(format!("{}${}", self.id, property)),
            mainsnak: Snak {
                snaktype: "value".to_string(),
                datavalue: Some(DataValue {
                    value,
                    value_type: value_type.to_string(),
                }),
            },
        };
        self.claims.insert(property.to_string(), vec![statement]);
    }

    pub fn with_sitelink(mut self, site: &str, title: &str) -> Self {
        self.insert_sitelink(site, title);
        self
    }

    pub fn with_item_claim(mut self, property: &str, item: &str) -> Self {
        self.insert_claim(
            property,
            serde_json::json!({ "entity-type": "item", "id": item }),
            "wikibase-entityid",
        );
        self
    }

    pub fn with_string_claim(mut self, property: &str, value: &str) -> Self {
        self.insert_claim(property, Value::String(value.to_string()), "string");
        self
    }
}

/// Wikibase encodes empty maps as `[]`; accept either shape.
fn map_or_empty_list<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrList<V> {
        Map(BTreeMap<String, V>),
        List(Vec<IgnoredAny>),
    }

    match MapOrList::<V>::deserialize(deserializer)? {
        MapOrList::Map(map) => Ok(map),
        MapOrList::List(list) if list.is_empty() => Ok(BTreeMap::new()),
        MapOrList::List(_) => Err(de::Error::custom("expected a map or an empty list")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn view(doc: Value) -> EntityView {
        serde_json::from_value(doc).expect("entity view")
    }

    #[test]
    fn newtype_display() {
        assert_eq!(EntityId::from("Q1").to_string(), "Q1");
        assert_eq!(PropertyKey::from("P42").to_string(), "P42");
        assert_eq!(SiteKey::from("wikidata").to_string(), "wikidata");
    }

    #[rstest]
    #[case("P42", true)]
    #[case("P1", true)]
    #[case("P", false)]
    #[case("Q42", false)]
    #[case("P4x", false)]
    #[case("", false)]
    fn property_key_shape(#[case] key: &str, #[case] ok: bool) {
        assert_eq!(PropertyKey::from(key).is_well_formed(), ok);
    }

    #[test]
    fn empty_list_sitelinks_and_claims_decode_as_empty_maps() {
        let entity = view(json!({ "id": "Q1", "sitelinks": [], "claims": [] }));
        assert!(entity.sitelinks.is_empty());
        assert!(entity.claims.is_empty());
        assert!(!entity.is_missing());
    }

    #[test]
    fn non_empty_list_is_rejected() {
        let err = serde_json::from_value::<EntityView>(json!({ "id": "Q1", "sitelinks": [1] }));
        assert!(err.is_err());
    }

    #[test]
    fn missing_flag_is_detected() {
        let entity = view(json!({ "id": "Q999", "missing": "" }));
        assert!(entity.is_missing());
    }

    #[test]
    fn sitelink_projection_reads_title() {
        let entity = view(json!({
            "id": "Q1",
            "sitelinks": { "wikidata": { "site": "wikidata", "title": "Q2", "badges": [] } },
        }));
        assert_eq!(entity.sitelink_value(&SiteKey::from("wikidata")), Some("Q2"));
        assert_eq!(entity.sitelink_value(&SiteKey::from("enwiki")), None);
    }

    #[test]
    fn empty_sitelink_title_is_absent() {
        let entity = EntityView::new("Q1").with_sitelink("wikidata", "");
        assert_eq!(entity.sitelink_value(&SiteKey::from("wikidata")), None);
    }

    #[rstest]
    #[case(json!({ "entity-type": "item", "numeric-id": 5, "id": "Q5" }), Some("Q5"))]
    #[case(json!({ "entity-type": "item", "numeric-id": 5 }), Some("Q5"))]
    #[case(json!({ "entity-type": "property", "numeric-id": 31 }), Some("P31"))]
    #[case(json!("Foo"), Some("Foo"))]
    #[case(json!(""), None)]
    #[case(json!(12), Some("12"))]
    #[case(json!({ "text": "hi", "language": "en" }), None)]
    fn property_projection_shapes(#[case] value: Value, #[case] expected: Option<&str>) {
        let entity = view(json!({
            "id": "Q1",
            "claims": { "P42": [{
                "id": "Q1$abc",
                "mainsnak": { "snaktype": "value", "property": "P42",
                              "datavalue": { "value": value, "type": "x" } },
            }] },
        }));
        assert_eq!(
            entity.property_value(&PropertyKey::from("P42")).as_deref(),
            expected
        );
    }

    #[test]
    fn novalue_snak_projects_to_absent() {
        let entity = view(json!({
            "id": "Q1",
            "claims": { "P42": [{ "mainsnak": { "snaktype": "novalue", "property": "P42" } }] },
        }));
        assert_eq!(entity.property_value(&PropertyKey::from("P42")), None);
    }

    #[test]
    fn only_first_statement_counts() {
        let entity = view(json!({
            "id": "Q1",
            "claims": { "P42": [
                { "mainsnak": { "snaktype": "value", "datavalue": { "value": "A", "type": "string" } } },
                { "mainsnak": { "snaktype": "value", "datavalue": { "value": "B", "type": "string" } } },
            ] },
        }));
        assert_eq!(
            entity.property_value(&PropertyKey::from("P42")).as_deref(),
            Some("A")
        );
    }

    #[test]
    fn builder_helpers_round_through_projections() {
        let entity = EntityView::new("Q1")
            .with_sitelink("wikidata", "Q7")
            .with_item_claim("P42", "Q7");
        assert_eq!(entity.sitelink_value(&SiteKey::from("wikidata")), Some("Q7"));
        assert_eq!(
            entity.property_value(&PropertyKey::from("P42")).as_deref(),
            Some("Q7")
        );
        assert!(entity.first_statement(&PropertyKey::from("P42")).is_some());
    }

    #[test]
    fn value_kind_serde_is_lowercase() {
        let kind: ValueKind = serde_yaml::from_str("string").expect("parse");
        assert_eq!(kind, ValueKind::String);
        assert_eq!(ValueKind::default().to_string(), "item");
    }
}
