use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use data::environment;
use data::marker;
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Saved chats per account, with the strings the helper remembers on them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    accounts: BTreeMap<String, BTreeMap<String, Entry>>,
}

pub type Entry = BTreeMap<String, String>;

impl Roster {
    pub async fn load() -> Result<Roster, Error> {
        let path = path()?;

        match fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Ok(Roster::default())
            }
            Err(error) => Err(error.into()),
        }
    }

    pub async fn save(&self) -> Result<(), Error> {
        let path = path()?;

        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, &bytes).await?;

        Ok(())
    }

    /// Adds `chat` to the account's saved chats, keeping what it already
    /// remembers.
    pub fn add(&mut self, account: &str, chat: &str) {
        self.accounts
            .entry(account.to_string())
            .or_default()
            .entry(chat.to_lowercase())
            .or_default();
    }

    pub fn get(&self, account: &str, chat: &str, key: marker::Key) -> Option<&str> {
        self.accounts
            .get(account)?
            .get(&chat.to_lowercase())?
            .get(key.as_ref())
            .map(String::as_str)
    }

    pub fn set(
        &mut self,
        account: &str,
        chat: &str,
        key: marker::Key,
        value: &str,
    ) -> bool {
        let Some(entry) = self
            .accounts
            .get_mut(account)
            .and_then(|chats| chats.get_mut(&chat.to_lowercase()))
        else {
            return false;
        };

        entry.insert(key.to_string(), value.to_string());

        true
    }
}

fn path() -> Result<PathBuf, Error> {
    let parent = environment::data_dir();

    if !parent.exists() {
        std::fs::create_dir_all(&parent)?;
    }

    Ok(parent.join(environment::ROSTER_FILE_NAME))
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_saved_chats_remember() {
        let mut roster = Roster::default();
        let account = "foo@irc.libera.chat";

        assert!(!roster.set(account, "#rust", marker::Key::Topic, "hello"));

        roster.add(account, "#Rust");
        assert!(roster.set(account, "#rust", marker::Key::Topic, "hello"));
        assert_eq!(roster.get(account, "#RUST", marker::Key::Topic), Some("hello"));
        assert_eq!(roster.get(account, "#rust", marker::Key::JoinMessage), None);

        // Adding again keeps the markers.
        roster.add(account, "#rust");
        assert_eq!(roster.get(account, "#rust", marker::Key::Topic), Some("hello"));
    }

    #[test]
    fn serialized_by_key_name() {
        let mut roster = Roster::default();
        roster.add("foo@irc.libera.chat", "#rust");
        roster.set(
            "foo@irc.libera.chat",
            "#rust",
            marker::Key::JoinMessage,
            "Be nice.",
        );

        let json = serde_json::to_string(&roster).expect("serialize");
        assert_eq!(
            json,
            r##"{"accounts":{"foo@irc.libera.chat":{"#rust":{"chanserv_join_msg":"Be nice."}}}}"##
        );
    }
}
