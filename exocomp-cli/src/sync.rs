//! One bot run: configure, connect, log in, reconcile, report.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Args;
use exocomp_core::{Config, SITELINK_PROPERTY_SYNC};
use exocomp_sync::{Bot, LogObserver, SitelinkPropertySync};
use exocomp_wikibase::{ClientOptions, WikibaseClient};

use crate::{logging, report};

const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Log intended changes without writing anything to the wiki.
    #[arg(long)]
    pub dry_run: bool,

    /// Lower the log threshold to debug.
    #[arg(short, long)]
    pub verbose: bool,

    /// Trace every request sent to the Wikibase API.
    #[arg(long)]
    pub debug: bool,

    /// Configuration file. Defaults to $EXOCOMP_CONFIG, ./exocomp.yaml, then
    /// exocomp/config.yaml under the user configuration directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Process at most this many items, overriding the module limit.
    #[arg(long, value_name = "N")]
    pub limit: Option<NonZeroUsize>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let started = Instant::now();

        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err).context("could not read .env");
            }
        }

        let (config, config_path) =
            Config::load(self.config.as_deref()).context("could not load configuration")?;
        let directives = logging::filter_directives(
            &config.logging.filter_directive(),
            self.verbose,
            self.debug,
        );
        let _guard = logging::init(&config.logging.path, &directives)?;

        if let Err(err) = self.execute(&config, &config_path, started) {
            tracing::error!("Fatal error: {err:#}");
            tracing::error!("Stack trace: {err:?}");
            return Err(err);
        }
        Ok(())
    }

    fn execute(&self, config: &Config, config_path: &Path, started: Instant) -> Result<()> {
        tracing::info!("{}", report::rule());
        tracing::info!("Exocomp Bot - Sitelink Property Sync Module");
        tracing::info!("{}", report::rule());
        tracing::info!("Start time: {}", Local::now().format(CLOCK_FORMAT));
        tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
        tracing::info!("Configuration file: {}", config_path.display());
        if self.dry_run {
            tracing::warn!("DRY-RUN MODE: Changes will NOT be written to the wiki");
        }
        if self.debug {
            tracing::debug!("DEBUG MODE: tracing Wikibase API requests");
        }

        let mut module_config = config
            .module(SITELINK_PROPERTY_SYNC)
            .filter(|module| module.enabled)
            .cloned()
            .with_context(|| {
                format!("module '{SITELINK_PROPERTY_SYNC}' is not enabled in the configuration")
            })?;
        if let Some(limit) = self.limit {
            module_config.limit = limit.get();
        }

        if !config.bot.is_complete() {
            bail!("bot credentials not configured; set bot.username and EXOCOMP_BOT_PASSWORD");
        }

        let endpoint = config.api_endpoint();
        tracing::info!("Connecting to Wikibase instance...");
        let mut client = WikibaseClient::new(
            endpoint.clone(),
            ClientOptions {
                user_agent: config.wikibase.user_agent.clone(),
                namespace: module_config.namespace,
                summary: module_config.summary.clone(),
                value_kind: module_config.value_kind,
                ..ClientOptions::default()
            },
        );
        let site_name = client
            .site_name()
            .with_context(|| format!("could not reach {endpoint}"))?;
        tracing::info!("Connected to: {} ({site_name})", config.wikibase.url);

        tracing::info!("Authenticating bot account...");
        client
            .login(&config.bot.username, &config.bot.password)
            .with_context(|| format!("could not log in as {}", config.bot.username))?;
        tracing::info!("Bot authenticated as: {}", config.bot.username);

        tracing::info!("Initializing SitelinkPropertySync module...");
        let module = SitelinkPropertySync::from_config(&client, LogObserver, &module_config, self.dry_run);
        let mut bot = Bot::new();
        bot.register(SITELINK_PROPERTY_SYNC, Box::new(module));
        tracing::info!("Module initialized successfully");
        tracing::info!(
            "Configuration: {}",
            serde_json::to_string_pretty(&module_config)?
        );

        tracing::info!("Starting synchronization process...");
        let stats = bot
            .run_module(SITELINK_PROPERTY_SYNC)
            .context("module execution failed")?;

        tracing::info!("");
        report::log(&stats, started.elapsed());
        tracing::info!("Bot completed successfully");
        tracing::info!("End time: {}", Local::now().format(CLOCK_FORMAT));
        Ok(())
    }
}
