use std::collections::{HashMap, HashSet};

use data::command::Command;
use data::{ConnectionId, Host, marker};
use parking_lot::Mutex;

use crate::roster::Roster;

/// A host that prints what it is asked to do and keeps its roster in a
/// JSON file.
#[derive(Debug, Default)]
pub struct Console {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<ConnectionId, String>,
    display_names: HashMap<ConnectionId, String>,
    chats: HashSet<(ConnectionId, String)>,
    topics: HashMap<(ConnectionId, String), String>,
    roster: Roster,
}

impl Console {
    pub fn new(roster: Roster) -> Self {
        Self {
            state: Mutex::new(State {
                roster,
                ..State::default()
            }),
        }
    }

    pub fn sign_on(&self, connection: ConnectionId, account: &str, nickname: &str) {
        let mut state = self.state.lock();

        state.accounts.insert(connection, account.to_string());
        state.display_names.insert(connection, nickname.to_string());
    }

    pub fn sign_off(&self, connection: ConnectionId) {
        let mut state = self.state.lock();

        state.accounts.remove(&connection);
        state.display_names.remove(&connection);
        state.chats.retain(|(id, _)| *id != connection);
        state.topics.retain(|(id, _), _| *id != connection);
    }

    pub fn rename(&self, connection: ConnectionId, nickname: &str) {
        self.state
            .lock()
            .display_names
            .insert(connection, nickname.to_string());
    }

    /// Opens a chat window, saving the chat to the account's roster like
    /// joining from the buddy list would.
    pub fn open_chat(&self, connection: ConnectionId, chat: &str) {
        let mut state = self.state.lock();

        if let Some(account) = state.accounts.get(&connection).cloned() {
            state.roster.add(&account, chat);
        }
        state.chats.insert((connection, chat.to_lowercase()));
    }

    pub fn close_chat(&self, connection: ConnectionId, chat: &str) {
        let mut state = self.state.lock();
        let key = (connection, chat.to_lowercase());

        state.chats.remove(&key);
        state.topics.remove(&key);
    }

    pub fn set_topic(&self, connection: ConnectionId, chat: &str, topic: &str) {
        self.state
            .lock()
            .topics
            .insert((connection, chat.to_lowercase()), topic.to_string());
    }

    pub fn topic(&self, connection: ConnectionId, chat: &str) -> Option<String> {
        self.state
            .lock()
            .topics
            .get(&(connection, chat.to_lowercase()))
            .cloned()
    }

    pub fn roster(&self) -> Roster {
        self.state.lock().roster.clone()
    }
}

impl Host for Console {
    fn send_line(&self, connection: ConnectionId, target: &str, text: &str) {
        println!("{connection} >> {target}: {text}");
    }

    fn run_command(
        &self,
        connection: ConnectionId,
        command: &Command,
    ) -> Result<(), String> {
        let mut state = self.state.lock();

        if !state.accounts.contains_key(&connection) {
            return Err(format!("{connection} is not connected"));
        }

        println!("{connection} /{}", command.redacted());

        if let Command::Nick(nickname) = command {
            state.display_names.insert(connection, nickname.clone());
        }

        Ok(())
    }

    fn display_name(&self, connection: ConnectionId) -> Option<String> {
        self.state.lock().display_names.get(&connection).cloned()
    }

    fn has_chat(&self, connection: ConnectionId, channel: &str) -> bool {
        self.state
            .lock()
            .chats
            .contains(&(connection, channel.to_lowercase()))
    }

    fn roster_string(
        &self,
        account: &str,
        chat: &str,
        key: marker::Key,
    ) -> Option<String> {
        self.state
            .lock()
            .roster
            .get(account, chat, key)
            .map(str::to_string)
    }

    fn set_roster_string(
        &self,
        account: &str,
        chat: &str,
        key: marker::Key,
        value: &str,
    ) -> bool {
        self.state.lock().roster.set(account, chat, key, value)
    }

    fn notify_error(&self, title: &str, primary: &str, secondary: &str) {
        println!("!! {title}: {primary}. {secondary}");
    }
}
