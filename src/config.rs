use std::env;

use crate::constants::GENESIS_BLOCK;
use crate::core::types::BlockNum;
use crate::Error;

pub const ENV_POSTGRES_URI: &str = "PGCONTENT_POSTGRES_URI";
pub const ENV_START_BLOCK: &str = "PGCONTENT_START_BLOCK";

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Postgresql connection URI postgresql://[userspec@][hostspec][/dbname][?paramspec]
    pub connection_uri: String,
}

impl PostgresConfig {
    pub fn new(uri: &str) -> Self {
        Self {
            connection_uri: uri.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Indexing is disabled when no connection target is configured.
    pub postgres: Option<PostgresConfig>,
    /// Blocks below this number are not projected.
    pub start_block: BlockNum,
}

impl Config {
    /// Read configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from a variable lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let postgres = lookup(ENV_POSTGRES_URI)
            .filter(|uri| !uri.trim().is_empty())
            .map(|uri| PostgresConfig::new(uri.trim()));
        match &postgres {
            Some(_) => tracing::debug!("found {ENV_POSTGRES_URI} environment variable"),
            None => tracing::debug!("no {ENV_POSTGRES_URI} environment variable"),
        }

        let start_block = match lookup(ENV_START_BLOCK) {
            Some(s) => s.trim().parse::<BlockNum>().map_err(|e| {
                Error::Config(format!("{ENV_START_BLOCK} must be a block number ({e})"))
            })?,
            None => GENESIS_BLOCK,
        };

        Ok(Self {
            postgres,
            start_block,
        })
    }
}
