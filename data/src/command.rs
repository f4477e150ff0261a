use std::fmt;

use itertools::Itertools;

pub const NICKSERV: &str = "NickServ";
pub const JEUX_Z: &str = "Z";

const REDACTED: &str = "********";

/// A client command run through the host as if the user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Nick(String),
    Identify { password: String },
    Ghost { nickname: String, password: String },
    Oper { name: String, password: String },
    JeuxLogin { username: String, password: String },
}

impl Command {
    /// The command with every password masked, suitable for logging.
    pub fn redacted(&self) -> String {
        let (name, args) = self.parts();

        std::iter::once(name)
            .chain(args.into_iter().map(|arg| match arg {
                Arg::Plain(arg) => arg,
                Arg::Secret(_) => REDACTED,
            }))
            .join(" ")
    }

    fn parts(&self) -> (&'static str, Vec<Arg<'_>>) {
        match self {
            Command::Nick(nickname) => ("nick", vec![Arg::Plain(nickname)]),
            Command::Identify { password } => (
                "quote",
                vec![
                    Arg::Plain(NICKSERV),
                    Arg::Plain("IDENTIFY"),
                    Arg::Secret(password),
                ],
            ),
            Command::Ghost { nickname, password } => (
                "quote",
                vec![
                    Arg::Plain(NICKSERV),
                    Arg::Plain("GHOST"),
                    Arg::Plain(nickname),
                    Arg::Secret(password),
                ],
            ),
            Command::Oper { name, password } => (
                "quote",
                vec![Arg::Plain("OPER"), Arg::Plain(name), Arg::Secret(password)],
            ),
            Command::JeuxLogin { username, password } => (
                "quote",
                vec![
                    Arg::Plain(JEUX_Z),
                    Arg::Plain("login"),
                    Arg::Plain(username),
                    Arg::Secret(password),
                ],
            ),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, args) = self.parts();

        write!(
            f,
            "{name} {}",
            args.into_iter()
                .map(|arg| match arg {
                    Arg::Plain(arg) | Arg::Secret(arg) => arg,
                })
                .join(" ")
        )
    }
}

enum Arg<'a> {
    Plain(&'a str),
    Secret(&'a str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let tests = [
            (Command::Nick("foo".into()), "nick foo", "nick foo"),
            (
                Command::Identify {
                    password: "pw".into(),
                },
                "quote NickServ IDENTIFY pw",
                "quote NickServ IDENTIFY ********",
            ),
            (
                Command::Ghost {
                    nickname: "foo".into(),
                    password: "pw".into(),
                },
                "quote NickServ GHOST foo pw",
                "quote NickServ GHOST foo ********",
            ),
            (
                Command::Oper {
                    name: "foo_".into(),
                    password: "op".into(),
                },
                "quote OPER foo_ op",
                "quote OPER foo_ ********",
            ),
            (
                Command::JeuxLogin {
                    username: "foo".into(),
                    password: "pw".into(),
                },
                "quote Z login foo pw",
                "quote Z login foo ********",
            ),
        ];

        for (command, text, redacted) in tests {
            assert_eq!(command.to_string(), text);
            assert_eq!(command.redacted(), redacted);
        }
    }
}
