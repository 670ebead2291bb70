//! Command execution context
//!
//! Bundles the loaded configuration, the constructed API client, and the
//! output format so handlers don't repeat the same setup.

use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::client::GuardClient;
use crate::config::Config;
use crate::error::Result;

/// Context for command execution containing config, client, and options.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// API client built from the config snapshot
    pub client: Arc<GuardClient>,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Load config, apply the endpoint override, and build the client.
    ///
    /// Fails when the config is missing/invalid or no API token is set.
    pub fn new(
        format: OutputFormat,
        api_host: Option<&str>,
        config_path: Option<&str>,
    ) -> Result<Self> {
        let mut config = Config::load_at(config_path)?;

        if let Some(host) = api_host {
            config.api_host = host.to_string();
        }

        let token = config.require_token()?.to_string();
        let client = Arc::new(GuardClient::new(
            config.api_host.clone(),
            config.home_region.clone(),
            token,
        )?);

        Ok(Self {
            config,
            client,
            format,
        })
    }
}
