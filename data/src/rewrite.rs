//! Cancels system lines about to be written into a chat window when the user
//! has already seen them.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::message::{Outgoing, Rewrite};
use crate::{ConnectionId, Helper, filter, marker};

/// How long after a chat window opens our own voice or op from the channel
/// service is considered part of joining.
pub const JOIN_GRACE: Duration = Duration::from_secs(10);

const MODE_PREFIX: &str = "mode (+";
const MODE_SUFFIX: &str = " ) by ";

/// When each chat window of a connection was opened.
#[derive(Debug, Default)]
pub struct Openings(Mutex<HashMap<(ConnectionId, String), Instant>>);

impl Openings {
    pub fn insert(&self, connection: ConnectionId, chat: &str) {
        self.0
            .lock()
            .insert((connection, chat.to_lowercase()), Instant::now());
    }

    pub fn get(&self, connection: ConnectionId, chat: &str) -> Option<Instant> {
        self.0
            .lock()
            .get(&(connection, chat.to_lowercase()))
            .copied()
    }

    pub fn remove(&self, connection: ConnectionId, chat: &str) {
        self.0.lock().remove(&(connection, chat.to_lowercase()));
    }

    pub fn remove_connection(&self, connection: ConnectionId) {
        self.0.lock().retain(|(id, _), _| *id != connection);
    }
}

/// Whether `body` is the channel service giving `name` voice or op.
fn is_own_mode(body: &str, name: &str) -> bool {
    let Some(rest) = body.strip_prefix(MODE_PREFIX) else {
        return false;
    };

    rest.strip_prefix("v ")
        .or_else(|| rest.strip_prefix("o "))
        .and_then(|rest| rest.strip_prefix(name))
        .and_then(|rest| rest.strip_prefix(MODE_SUFFIX))
        .is_some_and(|by| by.starts_with(filter::CHANSERV))
}

impl Helper {
    /// Starts the join grace window for a chat.
    pub fn on_chat_opened(&self, connection: ConnectionId, chat: &str) {
        self.inner().openings.insert(connection, chat);
    }

    pub fn on_chat_closed(&self, connection: ConnectionId, chat: &str) {
        self.inner().openings.remove(connection, chat);
    }

    /// Decides whether a line about to be written into a chat window should
    /// be shown.
    pub fn on_outgoing_chat_write(
        &self,
        connection: ConnectionId,
        line: &Outgoing<'_>,
    ) -> Rewrite {
        if !line.system {
            return Rewrite::Keep;
        }

        if let Some(name) = self.display_name(connection)
            && is_own_mode(line.body, &name)
            && self
                .inner()
                .openings
                .get(connection, line.chat)
                .is_some_and(|opened| opened.elapsed() < JOIN_GRACE)
        {
            log::trace!("[{connection}] hiding join mode change in {}", line.chat);
            return Rewrite::Cancel;
        }

        let Some(topic) = line.topic.filter(|topic| !topic.is_empty()) else {
            return Rewrite::Keep;
        };

        if !(line.body.contains(line.chat) && line.body.contains(topic)) {
            return Rewrite::Keep;
        }

        let Some(account) = self.account(connection) else {
            return Rewrite::Keep;
        };

        match marker::remember(
            self.host(),
            &account.login,
            line.chat,
            marker::Key::Topic,
            topic,
        ) {
            marker::Seen::Repeated => {
                log::trace!("[{connection}] topic of {} unchanged", line.chat);
                Rewrite::Cancel
            }
            marker::Seen::New => Rewrite::Keep,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::time;

    use super::*;
    use crate::config::Account;
    use crate::test::{Recorder, helper};

    const LOGIN: &str = "foo@irc.libera.chat";

    fn system<'a>(chat: &'a str, body: &'a str) -> Outgoing<'a> {
        Outgoing {
            chat,
            body,
            topic: None,
            system: true,
        }
    }

    #[test]
    fn own_mode() {
        let tests = [
            ("mode (+v foo ) by ChanServ", true),
            ("mode (+o foo ) by ChanServ", true),
            ("mode (+h foo ) by ChanServ", false),
            ("mode (+v foobar ) by ChanServ", false),
            ("mode (+v foo ) by bob", false),
            ("mode (+v bob ) by ChanServ", false),
        ];

        for (body, expected) in tests {
            assert_eq!(is_own_mode(body, "foo"), expected, "{body}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn join_grace() {
        let host = Recorder::default();
        let helper = helper(&host);
        let connection = ConnectionId::from(1);
        host.set_display_name(connection, "foo");

        let voiced = system("#rust", "mode (+v foo ) by ChanServ");

        // Without an opening there is nothing to be graceful about.
        assert_eq!(
            helper.on_outgoing_chat_write(connection, &voiced),
            Rewrite::Keep
        );

        helper.on_chat_opened(connection, "#Rust");
        assert_eq!(
            helper.on_outgoing_chat_write(connection, &voiced),
            Rewrite::Cancel
        );

        // Said rather than announced
        assert_eq!(
            helper.on_outgoing_chat_write(
                connection,
                &Outgoing {
                    system: false,
                    ..voiced
                }
            ),
            Rewrite::Keep
        );

        time::sleep(JOIN_GRACE).await;
        assert_eq!(
            helper.on_outgoing_chat_write(connection, &voiced),
            Rewrite::Keep
        );
    }

    #[tokio::test(start_paused = true)]
    async fn grace_ends_with_window() {
        let host = Recorder::default();
        let helper = helper(&host);
        let connection = ConnectionId::from(1);
        host.set_display_name(connection, "foo");

        let opped = system("#rust", "mode (+o foo ) by ChanServ");

        helper.on_chat_opened(connection, "#rust");
        helper.on_chat_closed(connection, "#rust");
        assert_eq!(
            helper.on_outgoing_chat_write(connection, &opped),
            Rewrite::Keep
        );

        helper.on_chat_opened(connection, "#rust");
        helper.on_signed_off(connection);
        assert_eq!(
            helper.on_outgoing_chat_write(connection, &opped),
            Rewrite::Keep
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_topic() {
        let host = Recorder::default();
        let helper = helper(&host);
        let connection = ConnectionId::from(1);
        helper.on_signed_on(connection, Arc::new(Account::new(LOGIN)));
        host.add_roster_entry(LOGIN, "#rust");

        let announced = Outgoing {
            topic: Some("Rust 2024 is out"),
            ..system("#rust", "The topic for #rust is: Rust 2024 is out")
        };

        assert_eq!(
            helper.on_outgoing_chat_write(connection, &announced),
            Rewrite::Keep
        );
        assert_eq!(
            host.roster(LOGIN, "#rust", marker::Key::Topic),
            Some("Rust 2024 is out".to_string())
        );
        assert_eq!(
            helper.on_outgoing_chat_write(connection, &announced),
            Rewrite::Cancel
        );

        // Other system lines are left alone.
        let joined = Outgoing {
            topic: Some("Rust 2024 is out"),
            ..system("#rust", "bob entered the room.")
        };
        assert_eq!(
            helper.on_outgoing_chat_write(connection, &joined),
            Rewrite::Keep
        );

        let changed = Outgoing {
            topic: Some("Rust 2027 is out"),
            ..system("#rust", "The topic for #rust is: Rust 2027 is out")
        };
        assert_eq!(
            helper.on_outgoing_chat_write(connection, &changed),
            Rewrite::Keep
        );
        assert_eq!(
            helper.on_outgoing_chat_write(connection, &changed),
            Rewrite::Cancel
        );
    }

    #[tokio::test(start_paused = true)]
    async fn topic_without_roster_entry() {
        let host = Recorder::default();
        let helper = helper(&host);
        let connection = ConnectionId::from(1);
        helper.on_signed_on(connection, Arc::new(Account::new(LOGIN)));

        let announced = Outgoing {
            topic: Some("hello"),
            ..system("#rust", "The topic for #rust is: hello")
        };

        for _ in 0..2 {
            assert_eq!(
                helper.on_outgoing_chat_write(connection, &announced),
                Rewrite::Keep
            );
        }
    }
}
