use thiserror::Error;

/// Error surface for the Wikibase client.
#[derive(Debug, Error)]
pub enum WikibaseError {
    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status} from {endpoint}")]
    Http { status: u16, endpoint: String },

    /// Connection, DNS or TLS failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not JSON.
    #[error("failed to decode response")]
    Decode(#[source] std::io::Error),

    #[error("unexpected response shape")]
    Json(#[from] serde_json::Error),

    /// The API returned an error envelope.
    #[error("API error {code}: {info}")]
    Api { code: String, info: String },

    #[error("login failed ({result}): {reason}")]
    LoginFailed { result: String, reason: String },

    #[error("missing token `{0}` in response")]
    MissingToken(&'static str),

    /// A write was attempted before `login`.
    #[error("not logged in")]
    NotLoggedIn,

    /// The value cannot be encoded for the configured property type.
    #[error("cannot encode '{value}': {reason}")]
    InvalidValue { value: String, reason: &'static str },
}

impl WikibaseError {
    pub(crate) fn from_ureq(endpoint: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => WikibaseError::Http {
                status,
                endpoint: endpoint.to_string(),
            },
            ureq::Error::Transport(transport) => WikibaseError::Transport(transport.to_string()),
        }
    }
}
