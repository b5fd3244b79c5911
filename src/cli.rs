//! Command-line interface.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::{error::Result as ApiResult, EnvToken, KeyringToken, StaticToken, TokenProvider};
use crate::config::{Config, ConfigError};

/// incubadmin - terminal administration for the startup incubator platform
#[derive(Parser, Debug)]
#[command(name = "incubadmin")]
#[command(version)]
#[command(about = "Browse and edit incubator records from the terminal", long_about = None)]
pub struct Cli {
    /// Configuration file (default: <config dir>/incubadmin/config.toml)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API base URL, overriding the configuration file
    #[arg(short = 'u', long = "base-url")]
    pub base_url: Option<String>,

    /// Table to open first
    #[arg(short = 'e', long = "entity")]
    pub entity: Option<String>,

    /// Bearer token for the API
    #[arg(long = "token", conflicts_with = "keyring")]
    pub token: Option<String>,

    /// Read the bearer token from the OS keyring under this account
    #[arg(long = "keyring", value_name = "ACCOUNT")]
    pub keyring: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// The configuration file to use.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::default_path(),
        }
    }

    /// Apply command-line overrides and re-validate.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<(), ConfigError> {
        if let Some(url) = &self.base_url {
            config.settings.base_url = url.clone();
        }
        if let Some(entity) = &self.entity {
            if config.entity(entity).is_none() {
                return Err(ConfigError::EntityNotFound(entity.clone()));
            }
            config.settings.default_entity = Some(entity.clone());
        }
        config.validate()
    }

    /// The token source selected by the flags.
    ///
    /// `--token` wins, then `--keyring`, then the `INCUBADMIN_TOKEN`
    /// environment variable.
    pub fn token_provider(&self) -> ApiResult<Arc<dyn TokenProvider>> {
        if let Some(token) = &self.token {
            return Ok(Arc::new(StaticToken::new(token.clone())));
        }
        if let Some(account) = &self.keyring {
            return Ok(Arc::new(KeyringToken::load(account)?));
        }
        Ok(Arc::new(EnvToken))
    }
}
