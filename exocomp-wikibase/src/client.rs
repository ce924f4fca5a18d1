//! Blocking HTTP client for the action API.
//!
//! The agent keeps a cookie jar, so the session established by `login` is
//! reused by every later request. Write requests carry the CSRF token fetched
//! at login, the `bot` flag and the configured edit summary.

use std::time::Duration;

use serde_json::Value;

use exocomp_core::types::{EntityId, EntityView, PropertyKey, SiteKey, ValueKind};
use exocomp_sync::EntityStore;

use crate::api::{
    check_api_error, encode_value, entity_id_from_title, first_claim_guid, token_from,
    AllPagesResponse, EntitiesResponse, MAX_PAGE_BATCH,
};
use crate::error::WikibaseError;

/// Per-instance settings that shape requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub user_agent: String,
    pub timeout: Duration,
    /// Namespace listed by `list_entity_ids`.
    pub namespace: i32,
    pub summary: String,
    pub value_kind: ValueKind,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("ExocompBot/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            namespace: 0,
            summary: "Updated via Exocomp".to_string(),
            value_kind: ValueKind::Item,
        }
    }
}

pub struct WikibaseClient {
    agent: ureq::Agent,
    endpoint: String,
    options: ClientOptions,
    csrf_token: Option<String>,
}

impl WikibaseClient {
    /// `endpoint` is the full `api.php` URL.
    pub fn new(endpoint: impl Into<String>, options: ClientOptions) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(&options.user_agent)
            .timeout(options.timeout)
            .build();
        Self {
            agent,
            endpoint: endpoint.into(),
            options,
            csrf_token: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.csrf_token.is_some()
    }

    /// Name of the wiki; doubles as a connectivity check.
    pub fn site_name(&self) -> Result<String, WikibaseError> {
        let body = self.get(&[("action", "query"), ("meta", "siteinfo")])?;
        Ok(body
            .pointer("/query/general/sitename")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    /// Log in with a bot password and cache a CSRF token for writes.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), WikibaseError> {
        let body = self.get(&[("action", "query"), ("meta", "tokens"), ("type", "login")])?;
        let login_token = token_from(&body, "logintoken")?;

        let body = self.post(&[
            ("action", "login"),
            ("lgname", username),
            ("lgpassword", password),
            ("lgtoken", login_token.as_str()),
        ])?;
        let result = body
            .pointer("/login/result")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if result != "Success" {
            return Err(WikibaseError::LoginFailed {
                result: result.to_string(),
                reason: body
                    .pointer("/login/reason")
                    .and_then(Value::as_str)
                    .unwrap_or("no reason given")
                    .to_string(),
            });
        }

        let body = self.get(&[("action", "query"), ("meta", "tokens"), ("type", "csrf")])?;
        self.csrf_token = Some(token_from(&body, "csrftoken")?);
        tracing::debug!(user = username, "obtained CSRF token");
        Ok(())
    }

    fn get(&self, params: &[(&str, &str)]) -> Result<Value, WikibaseError> {
        tracing::trace!(endpoint = %self.endpoint, ?params, "GET");
        let mut request = self.agent.get(&self.endpoint).query("format", "json");
        for (key, value) in params {
            request = request.query(key, value);
        }
        let response = request
            .call()
            .map_err(|e| WikibaseError::from_ureq(&self.endpoint, e))?;
        self.decode(response)
    }

    /// POST a form. Passwords and tokens are never traced.
    fn post(&self, params: &[(&str, &str)]) -> Result<Value, WikibaseError> {
        let action = params
            .iter()
            .find(|(k, _)| *k == "action")
            .map(|(_, v)| *v)
            .unwrap_or_default();
        tracing::trace!(endpoint = %self.endpoint, action, "POST");

        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("format", "json"));
        let response = self
            .agent
            .post(&self.endpoint)
            .send_form(&form)
            .map_err(|e| WikibaseError::from_ureq(&self.endpoint, e))?;
        self.decode(response)
    }

    fn decode(&self, response: ureq::Response) -> Result<Value, WikibaseError> {
        let body: Value = response.into_json().map_err(WikibaseError::Decode)?;
        tracing::trace!(%body, "response");
        check_api_error(&body)?;
        Ok(body)
    }

    fn token(&self) -> Result<&str, WikibaseError> {
        self.csrf_token.as_deref().ok_or(WikibaseError::NotLoggedIn)
    }

    /// POST a write action with token, summary and bot flag appended.
    fn write(&self, params: &[(&str, &str)]) -> Result<Value, WikibaseError> {
        let token = self.token()?;
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("summary", self.options.summary.as_str()));
        form.push(("bot", "1"));
        form.push(("token", token));
        self.post(&form)
    }
}

impl EntityStore for WikibaseClient {
    type Error = WikibaseError;

    fn list_entity_ids(&self, limit: usize) -> Result<Vec<EntityId>, Self::Error> {
        let namespace = self.options.namespace.to_string();
        let mut ids = Vec::new();
        let mut continue_from: Option<String> = None;

        while ids.len() < limit {
            let batch = (limit - ids.len()).min(MAX_PAGE_BATCH).to_string();
            let mut params = vec![
                ("action", "query"),
                ("list", "allpages"),
                ("apnamespace", namespace.as_str()),
                ("aplimit", batch.as_str()),
            ];
            if let Some(from) = continue_from.as_deref() {
                params.push(("apcontinue", from));
            }

            let page: AllPagesResponse = serde_json::from_value(self.get(&params)?)?;
            ids.extend(
                page.titles()
                    .map(|title| entity_id_from_title(title, self.options.namespace)),
            );

            match page.next_continue() {
                Some(next) => continue_from = Some(next.to_string()),
                None => break,
            }
        }

        ids.truncate(limit);
        tracing::debug!(count = ids.len(), "listed entity ids");
        Ok(ids)
    }

    fn get_entity(&self, id: &EntityId) -> Result<Option<EntityView>, Self::Error> {
        let body = match self.get(&[
            ("action", "wbgetentities"),
            ("ids", id.as_str()),
            ("props", "sitelinks|claims"),
        ]) {
            Ok(body) => body,
            Err(WikibaseError::Api { code, .. }) if code == "no-such-entity" => return Ok(None),
            Err(err) => return Err(err),
        };
        let response: EntitiesResponse = serde_json::from_value(body)?;
        Ok(response.take(id))
    }

    fn set_sitelink(&self, id: &EntityId, site: &SiteKey, title: &str) -> Result<(), Self::Error> {
        self.write(&[
            ("action", "wbsetsitelink"),
            ("id", id.as_str()),
            ("linksite", site.as_str()),
            ("linktitle", title),
        ])?;
        Ok(())
    }

    /// Replace the first statement's value, or create a statement if there is none.
    fn set_property_value(
        &self,
        id: &EntityId,
        property: &PropertyKey,
        value: &str,
    ) -> Result<(), Self::Error> {
        let encoded = encode_value(self.options.value_kind, value)?;
        let claims = self.get(&[
            ("action", "wbgetclaims"),
            ("entity", id.as_str()),
            ("property", property.as_str()),
        ])?;

        match first_claim_guid(&claims, property.as_str()) {
            Some(guid) => self.write(&[
                ("action", "wbsetclaimvalue"),
                ("claim", guid.as_str()),
                ("snaktype", "value"),
                ("value", encoded.as_str()),
            ])?,
            None => self.write(&[
                ("action", "wbcreateclaim"),
                ("entity", id.as_str()),
                ("property", property.as_str()),
                ("snaktype", "value"),
                ("value", encoded.as_str()),
            ])?,
        };
        Ok(())
    }
}
