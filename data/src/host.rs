use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::marker;

/// Opaque identity of one connection, assigned by the host.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ConnectionId(u64);

impl From<u64> for ConnectionId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The IRC client embedding the helper.
///
/// Every method is fire-and-forget from the helper's point of view and is
/// never called while the helper holds one of its locks, so implementations
/// are free to call back into the helper.
pub trait Host: Send + Sync + 'static {
    /// Sends `text` as a private message to `target`.
    fn send_line(&self, connection: ConnectionId, target: &str, text: &str);

    /// Runs a client command as if it was typed in the server window.
    fn run_command(
        &self,
        connection: ConnectionId,
        command: &Command,
    ) -> Result<(), String>;

    /// The nickname currently in use on the connection.
    fn display_name(&self, connection: ConnectionId) -> Option<String>;

    /// Whether a chat window for `channel` is open on the connection.
    fn has_chat(&self, connection: ConnectionId, channel: &str) -> bool;

    /// Reads a string stored on the roster entry of `chat`.
    fn roster_string(
        &self,
        account: &str,
        chat: &str,
        key: marker::Key,
    ) -> Option<String>;

    /// Stores a string on the roster entry of `chat`. Returns `false` when
    /// the roster has no entry for it.
    fn set_roster_string(
        &self,
        account: &str,
        chat: &str,
        key: marker::Key,
        value: &str,
    ) -> bool;

    fn notify_error(&self, title: &str, primary: &str, secondary: &str);
}
