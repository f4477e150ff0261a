//! Line-oriented replay scripts standing in for a live IRC client.

use std::str::FromStr;
use std::time::Duration;

use data::ConnectionId;
use data::message::Kind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SignOn {
        connection: ConnectionId,
        login: String,
        nickname: Option<String>,
    },
    SignOff(ConnectionId),
    Nick {
        connection: ConnectionId,
        nickname: String,
    },
    Open {
        connection: ConnectionId,
        chat: String,
    },
    Close {
        connection: ConnectionId,
        chat: String,
    },
    Inbound {
        connection: ConnectionId,
        kind: Kind,
        sender: String,
        body: String,
    },
    Topic {
        connection: ConnectionId,
        chat: String,
        topic: String,
    },
    System {
        connection: ConnectionId,
        chat: String,
        body: String,
    },
    Sleep(Duration),
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse(line: &str) -> Result<Option<Event>, Error> {
    let line = line.trim();

    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    line.parse().map(Some)
}

impl FromStr for Event {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let mut args = Args(rest.trim_start());

        let event = match verb {
            "signon" => {
                let connection = args.connection()?;
                let login = args.word("login")?.to_string();
                let nickname = match args.next() {
                    None => None,
                    Some("as") => Some(args.word("nickname")?.to_string()),
                    Some(other) => return Err(Error::Unexpected(other.to_string())),
                };

                Event::SignOn {
                    connection,
                    login,
                    nickname,
                }
            }
            "signoff" => Event::SignOff(args.connection()?),
            "nick" => Event::Nick {
                connection: args.connection()?,
                nickname: args.word("nickname")?.to_string(),
            },
            "open" => Event::Open {
                connection: args.connection()?,
                chat: args.word("chat")?.to_string(),
            },
            "close" => Event::Close {
                connection: args.connection()?,
                chat: args.word("chat")?.to_string(),
            },
            "notice" | "msg" | "auto" => Event::Inbound {
                connection: args.connection()?,
                kind: match verb {
                    "notice" => Kind::Notice,
                    "msg" => Kind::Privmsg,
                    _ => Kind::AutoResponse,
                },
                sender: args.word("sender")?.to_string(),
                body: args.rest("body")?.to_string(),
            },
            "topic" => Event::Topic {
                connection: args.connection()?,
                chat: args.word("chat")?.to_string(),
                topic: args.rest("topic")?.to_string(),
            },
            "system" => Event::System {
                connection: args.connection()?,
                chat: args.word("chat")?.to_string(),
                body: args.rest("body")?.to_string(),
            },
            "sleep" => {
                let millis = args.word("milliseconds")?;

                Event::Sleep(Duration::from_millis(
                    millis
                        .parse()
                        .map_err(|_| Error::Invalid("milliseconds", millis.to_string()))?,
                ))
            }
            _ => return Err(Error::UnknownEvent(verb.to_string())),
        };

        if let Some(extra) = args.next() {
            return Err(Error::Unexpected(extra.to_string()));
        }

        Ok(event)
    }
}

struct Args<'a>(&'a str);

impl<'a> Args<'a> {
    fn next(&mut self) -> Option<&'a str> {
        if self.0.is_empty() {
            return None;
        }

        let (word, rest) = self.0.split_once(' ').unwrap_or((self.0, ""));
        self.0 = rest.trim_start();

        Some(word)
    }

    fn word(&mut self, name: &'static str) -> Result<&'a str, Error> {
        self.next().ok_or(Error::Missing(name))
    }

    /// Everything left on the line, spaces included.
    fn rest(&mut self, name: &'static str) -> Result<&'a str, Error> {
        let rest = std::mem::take(&mut self.0);

        if rest.is_empty() {
            Err(Error::Missing(name))
        } else {
            Ok(rest)
        }
    }

    fn connection(&mut self) -> Result<ConnectionId, Error> {
        let word = self.word("connection")?;

        word.parse::<u64>()
            .map(ConnectionId::from)
            .map_err(|_| Error::Invalid("connection", word.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {0} `{1}`")]
    Invalid(&'static str, String),
    #[error("unexpected `{0}`")]
    Unexpected(String),
}
