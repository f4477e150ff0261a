//! Decides what happens to every private message and notice that reaches a
//! connection before the host shows it.

use crate::message::{Decision, Inbound, Kind};
use crate::state::Phase;
use crate::{ConnectionId, Helper, Network, formatting, marker};

mod rules;

pub const CHANSERV: &str = "ChanServ";
/// QuakeNet's lightweight channel service.
pub const QUAKENET_L: &str = "L";

const INVITED: &str = " invited ";

const ACCESS_ADDED: &str = "You have been added to the access list for ";
const ACCESS_LEVEL: &str = "with level [";
const ACCESS_DELETED: &str = "You have been deleted from the access list for [";

/// A change to our entry on a channel's access list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<'a> {
    Added {
        channel: &'a str,
        level: Option<&'a str>,
    },
    Removed {
        channel: &'a str,
    },
}

impl<'a> Access<'a> {
    pub fn parse(text: &'a str) -> Option<Self> {
        if let Some(rest) = text.strip_prefix(ACCESS_ADDED) {
            let (channel, level) = match rest.split_once(' ') {
                Some((channel, tail)) => (
                    channel,
                    tail.strip_prefix(ACCESS_LEVEL).map(|level| {
                        level.split_once(']').map_or(level, |(level, _)| level)
                    }),
                ),
                None => (rest, None),
            };

            Some(Access::Added { channel, level })
        } else if let Some(rest) = text.strip_prefix(ACCESS_DELETED) {
            let channel = rest.split_once(']').map_or(rest, |(channel, _)| channel);

            Some(Access::Removed { channel })
        } else {
            None
        }
    }

    pub fn channel(&self) -> &'a str {
        match self {
            Access::Added { channel, .. } | Access::Removed { channel } => *channel,
        }
    }

    /// What to tell the user in the channel's window.
    pub fn describe(&self) -> String {
        match self {
            Access::Added { level: None, .. } => {
                "You have been added to the access list.".to_string()
            }
            Access::Added {
                level: Some(level), ..
            } => format!(
                "You have been added to the access list with an access level of {level}."
            ),
            Access::Removed { .. } => {
                "You have been removed from the access list.".to_string()
            }
        }
    }
}

/// Splits a `[#channel] text` join notice. `None` if there's no text.
pub fn join_notice(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix('[').filter(|rest| rest.starts_with('#'))?;
    let (channel, after) = rest.split_once(']')?;

    // Skip the separating space
    let mut chars = after.chars();
    chars.next()?;
    let message = chars.as_str();

    (!message.is_empty()).then_some((channel, message))
}

impl Helper {
    /// Decides what to do with an inbound private message or notice.
    pub fn on_inbound(
        &self,
        connection: ConnectionId,
        message: &Inbound<'_>,
    ) -> Decision {
        if message.kind == Kind::AutoResponse {
            return if self.inner().auto_responses.is_repeat(
                connection,
                message.sender,
                message.body,
            ) {
                log::trace!(
                    "[{connection}] repeated auto-response from {}",
                    message.sender
                );
                Decision::Suppress
            } else {
                Decision::Pass
            };
        }

        let state = self.inner().connections.get(connection);
        let network = state.as_ref().map_or(Network::Unknown, |state| state.network);
        let text = formatting::strip(message.body);

        if let Some(rule) = rules::find(network, message, &text) {
            log::trace!(
                "[{connection}] suppressed {} from {}",
                rule.name,
                message.sender
            );
            return Decision::Suppress;
        }

        if message.notice_text().is_none() {
            return state
                .and_then(|state| self.track_identify(connection, &state, message))
                .unwrap_or(Decision::Pass);
        }
        let text: &str = &text;

        if self.is_own_invite(connection, text) {
            return Decision::Suppress;
        }

        if message.sender == CHANSERV
            && let Some(access) = Access::parse(text)
        {
            let channel = access.channel();

            return if self.host().has_chat(connection, channel) {
                Decision::Replace {
                    channel: channel.to_string(),
                    body: access.describe(),
                }
            } else {
                Decision::Pass
            };
        }

        if matches!(message.sender, CHANSERV | QUAKENET_L) && text.starts_with("[#") {
            let Some((channel, notice)) = join_notice(text) else {
                return Decision::Pass;
            };

            if let Some(state) = &state
                && marker::remember(
                    self.host(),
                    &state.account.login,
                    channel,
                    marker::Key::JoinMessage,
                    notice,
                ) == marker::Seen::Repeated
            {
                log::trace!("[{connection}] repeated join notice for {channel}");
                return Decision::Suppress;
            }

            return if self.host().has_chat(connection, channel) {
                Decision::Replace {
                    channel: channel.to_string(),
                    body: notice.to_string(),
                }
            } else {
                Decision::Pass
            };
        }

        state
            .and_then(|state| self.track_identify(connection, &state, message))
            .unwrap_or(Decision::Pass)
    }

    fn is_own_invite(&self, connection: ConnectionId, text: &str) -> bool {
        self.display_name(connection).is_some_and(|name| {
            text.strip_prefix(name.as_str())
                .is_some_and(|rest| rest.starts_with(INVITED))
        })
    }

    /// Whether the helper is still waiting on an identity service.
    pub fn is_identifying(&self, connection: ConnectionId) -> bool {
        matches!(
            self.phase(connection),
            Some(Phase::Identifying | Phase::KillingGhost)
        )
    }
}
