use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub use self::account::Account;
use crate::environment;

pub mod account;

#[derive(Debug, Clone)]
pub struct Config {
    /// How long to wait for an identity service to confirm a login.
    pub identify_timeout: Duration,
    /// How long to wait for NickServ to confirm a ghost was killed.
    pub ghost_timeout: Duration,
    /// Window within which a repeated auto-response is dropped.
    pub auto_response_interval: Duration,
    pub accounts: BTreeMap<String, Arc<Account>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identify_timeout: default_identify_timeout(),
            ghost_timeout: default_ghost_timeout(),
            auto_response_interval: default_auto_response_interval(),
            accounts: BTreeMap::default(),
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        environment::config_dir()
    }

    pub fn path() -> PathBuf {
        Self::config_dir().join(environment::CONFIG_FILE_NAME)
    }

    pub fn load() -> Result<Self, Error> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Read(format!("{}: {e}", path.display())))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, Error> {
        #[derive(Deserialize)]
        pub struct Configuration {
            #[serde(
                default = "default_identify_timeout",
                deserialize_with = "deserialize_duration_from_millis"
            )]
            pub identify_timeout: Duration,
            #[serde(
                default = "default_ghost_timeout",
                deserialize_with = "deserialize_duration_from_millis"
            )]
            pub ghost_timeout: Duration,
            #[serde(
                default = "default_auto_response_interval",
                deserialize_with = "deserialize_duration_from_secs"
            )]
            pub auto_response_interval: Duration,
            #[serde(default)]
            pub accounts: BTreeMap<String, Account>,
        }

        let Configuration {
            identify_timeout,
            ghost_timeout,
            auto_response_interval,
            accounts,
        } = toml::from_str(content).map_err(|e| Error::Parse(e.to_string()))?;

        let accounts = accounts
            .into_iter()
            .map(|(login, account)| {
                let account = Account {
                    login: login.clone(),
                    ..account
                };

                (login, Arc::new(account))
            })
            .collect();

        Ok(Config {
            identify_timeout,
            ghost_timeout,
            auto_response_interval,
            accounts,
        })
    }

    /// Looks up an account by login, falling back to one with no options.
    pub fn account(&self, login: &str) -> Arc<Account> {
        self.accounts
            .get(login)
            .cloned()
            .unwrap_or_else(|| Arc::new(Account::new(login)))
    }
}

fn deserialize_duration_from_millis<'de, D>(
    deserializer: D,
) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millis: u64 = Deserialize::deserialize(deserializer)?;
    Ok(Duration::from_millis(millis.clamp(100, 60_000)))
}

fn deserialize_duration_from_secs<'de, D>(
    deserializer: D,
) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds: u64 = Deserialize::deserialize(deserializer)?;
    Ok(Duration::from_secs(seconds.clamp(1, 86_400)))
}

fn default_identify_timeout() -> Duration {
    Duration::from_millis(4000)
}

fn default_ghost_timeout() -> Duration {
    Duration::from_millis(4000)
}

fn default_auto_response_interval() -> Duration {
    Duration::from_secs(600)
}

#[derive(Debug, Error, Clone)]
pub enum Error {
    #[error("config could not be read: {0}")]
    Read(String),
    #[error("{0}")]
    Parse(String),
}
