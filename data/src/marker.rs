//! Per-chat markers remembered on the host's roster so repeated
//! announcements can be dropped across reconnects.

use crate::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Key {
    /// The last topic announced when joining the chat.
    Topic,
    /// The last join notice the channel service sent for the chat.
    #[strum(serialize = "chanserv_join_msg")]
    JoinMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seen {
    /// Identical to the value remembered last time.
    Repeated,
    /// Different from the remembered value, or nothing was remembered.
    New,
}

/// Compares `value` against the marker for `chat` and remembers it if it
/// changed.
pub fn remember(
    host: &dyn Host,
    account: &str,
    chat: &str,
    key: Key,
    value: &str,
) -> Seen {
    if host
        .roster_string(account, chat, key)
        .is_some_and(|last| last == value)
    {
        return Seen::Repeated;
    }

    if !host.set_roster_string(account, chat, key, value) {
        log::trace!("no roster entry for {chat}, {key} not remembered");
    }

    Seen::New
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::Recorder;

    #[test]
    fn key_names() {
        assert_eq!(Key::Topic.as_ref(), "topic");
        assert_eq!(Key::JoinMessage.as_ref(), "chanserv_join_msg");
    }

    #[test]
    fn remembers_per_chat() {
        let host = Recorder::default();
        host.add_roster_entry("foo@irc.libera.chat", "#rust");

        let seen = |chat, value| {
            remember(&host, "foo@irc.libera.chat", chat, Key::Topic, value)
        };

        assert_eq!(seen("#rust", "hello"), Seen::New);
        assert_eq!(seen("#rust", "hello"), Seen::Repeated);
        assert_eq!(seen("#rust", "changed"), Seen::New);
        assert_eq!(seen("#rust", "changed"), Seen::Repeated);

        // Without a roster entry nothing is remembered.
        assert_eq!(seen("#other", "hello"), Seen::New);
        assert_eq!(seen("#other", "hello"), Seen::New);
    }
}
