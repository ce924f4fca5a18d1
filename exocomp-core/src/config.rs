//! YAML configuration for the bot.
//!
//! # Lookup order
//!
//! ```text
//! --config <path>                       (explicit, must exist)
//! $EXOCOMP_CONFIG
//! ./exocomp.yaml
//! <config dir>/exocomp/config.yaml      (e.g. ~/.config/exocomp/config.yaml)
//! ```
//!
//! After the file is parsed, `EXOCOMP_*` environment variables override the
//! connection, credential and logging fields. Credentials are expected to come
//! from the environment (or a `.env` file loaded by the binary).
//!
//! # API pattern
//!
//! Functions touching process state have two forms:
//! - `fn_at(…)` / `fn_with(…)`: explicit inputs, used in tests
//! - `fn(…)`: reads the real environment and delegates

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{PropertyKey, SiteKey, ValueKind};

/// Registry name of the sitelink/property reconciliation module.
pub const SITELINK_PROPERTY_SYNC: &str = "sitelink-property-sync";

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "exocomp.yaml";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "EXOCOMP_CONFIG";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "warning", "error"];

// ---------------------------------------------------------------------------
// 1. Sections
// ---------------------------------------------------------------------------

/// Connection settings for the Wikibase instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikibaseConfig {
    pub url: String,
    pub api_path: String,
    pub user_agent: String,
}

impl Default for WikibaseConfig {
    fn default() -> Self {
        Self {
            url: "https://data.wikitrek.org".to_string(),
            api_path: "/w/api.php".to_string(),
            user_agent: format!("ExocompBot/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Bot-password credentials. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotCredentials {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Default for BotCredentials {
    fn default() -> Self {
        Self {
            username: "ExocompBot".to_string(),
            password: String::new(),
        }
    }
}

impl BotCredentials {
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for BotCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Log directory and threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub path: PathBuf,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./logs"),
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// The level as an `EnvFilter` directive (`warning` → `warn`).
    pub fn filter_directive(&self) -> String {
        match self.level.to_ascii_lowercase().as_str() {
            "warning" => "warn".to_string(),
            other => other.to_string(),
        }
    }
}

/// Settings for one bot module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    pub enabled: bool,
    pub property: PropertyKey,
    pub sitelink: SiteKey,
    pub dry_run: bool,
    pub value_kind: ValueKind,
    /// Maximum number of entity ids to process in one run.
    pub limit: usize,
    /// Namespace listed for entity pages.
    pub namespace: i32,
    /// Edit summary attached to every write.
    pub summary: String,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            property: PropertyKey::from("P42"),
            sitelink: SiteKey::from("wikidata"),
            dry_run: false,
            value_kind: ValueKind::Item,
            limit: 500,
            namespace: 0,
            summary: "Updated via Exocomp".to_string(),
        }
    }
}

/// Root of the YAML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub wikibase: WikibaseConfig,
    pub bot: BotCredentials,
    pub logging: LoggingConfig,
    pub modules: BTreeMap<String, ModuleConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let mut modules = BTreeMap::new();
        modules.insert(SITELINK_PROPERTY_SYNC.to_string(), ModuleConfig::default());
        Self {
            wikibase: WikibaseConfig::default(),
            bot: BotCredentials::default(),
            logging: LoggingConfig::default(),
            modules,
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Discovery
// ---------------------------------------------------------------------------

/// Resolve the configuration file path from explicit inputs.
///
/// An explicit path must exist; otherwise the first existing candidate wins.
pub fn discover_at(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    cwd: &Path,
    config_dir: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::NotFound {
            searched: vec![path.to_path_buf()],
        });
    }

    let mut candidates = Vec::new();
    candidates.extend(env_path);
    candidates.push(cwd.join(CONFIG_FILE_NAME));
    if let Some(dir) = config_dir {
        candidates.push(dir.join("exocomp").join("config.yaml"));
    }

    match candidates.iter().find(|p| p.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(ConfigError::NotFound {
            searched: candidates,
        }),
    }
}

/// `discover_at` using `$EXOCOMP_CONFIG`, the working directory and `dirs::config_dir()`.
pub fn discover(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::Io {
        path: PathBuf::from("."),
        source: e,
    })?;
    let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    discover_at(explicit, env_path, &cwd, dirs::config_dir().as_deref())
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

impl Config {
    /// Parse the YAML file at `path`. An empty file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Discover, parse, apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let path = discover(explicit)?;
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides_with(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((config, path))
    }

    /// Override fields from `EXOCOMP_*` variables resolved through `lookup`.
    ///
    /// Empty values are ignored so an unset `.env` entry cannot blank a field.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("EXOCOMP_WIKIBASE_URL") {
            self.wikibase.url = v;
        }
        if let Some(v) = get("EXOCOMP_API_PATH") {
            self.wikibase.api_path = v;
        }
        if let Some(v) = get("EXOCOMP_BOT_USERNAME") {
            self.bot.username = v;
        }
        if let Some(v) = get("EXOCOMP_BOT_PASSWORD") {
            self.bot.password = v;
        }
        if let Some(v) = get("EXOCOMP_LOG_PATH") {
            self.logging.path = PathBuf::from(v);
        }
        if let Some(v) = get("EXOCOMP_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    /// Check every field the bot relies on before anything connects.
    ///
    /// Credentials are checked separately by the caller since a dry config
    /// inspection does not need them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.wikibase.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "wikibase.url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "wikibase.url",
                reason: format!("'{url}' is not an http(s) URL"),
            });
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid {
                field: "logging.level",
                reason: format!(
                    "unknown level '{}'; expected one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        for (name, module) in &self.modules {
            if !module.property.is_well_formed() {
                return Err(ConfigError::Invalid {
                    field: "modules.*.property",
                    reason: format!("module '{name}': '{}' is not a property key", module.property),
                });
            }
            if module.sitelink.as_str().trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "modules.*.sitelink",
                    reason: format!("module '{name}': site key must not be empty"),
                });
            }
            if module.limit == 0 {
                return Err(ConfigError::Invalid {
                    field: "modules.*.limit",
                    reason: format!("module '{name}': limit must be at least 1"),
                });
            }
        }
        Ok(())
    }

    /// Full action API endpoint, e.g. `https://data.wikitrek.org/w/api.php`.
    pub fn api_endpoint(&self) -> String {
        let base = self.wikibase.url.trim().trim_end_matches('/');
        let path = self.wikibase.api_path.trim();
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Settings for module `name`, if configured.
    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.get(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
