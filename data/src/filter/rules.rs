use std::sync::LazyLock;

use fancy_regex::Regex;

use crate::Network;
use crate::message::Inbound;

/// Sign-on statistics QuakeNet and UnderNet servers send as a notice.
static SIGN_ON_CRUFT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^on \d+ ca \d+\(\d+\) ft \d+\(\d+\)")
        .expect("valid sign-on cruft regex")
});

/// A kind of message that is always hidden.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    network: Option<Network>,
    sender: Sender,
    body: Body,
}

#[derive(Debug)]
enum Sender {
    Any,
    Is(&'static str),
    EndsWith(&'static str),
}

#[derive(Debug)]
enum Body {
    /// Any message, notice or not.
    Any,
    Is(&'static str),
    StartsWith(&'static str),
    Surrounds(&'static str, &'static str),
    Matches(&'static LazyLock<Regex>),
}

impl Rule {
    pub fn matches(
        &self,
        network: Network,
        message: &Inbound<'_>,
        text: &str,
    ) -> bool {
        if self.network.is_some_and(|only| only != network) {
            return false;
        }

        let sender = match self.sender {
            Sender::Any => true,
            Sender::Is(nickname) => message.sender == nickname,
            Sender::EndsWith(suffix) => message.sender.ends_with(suffix),
        };

        if !sender {
            return false;
        }

        match self.body {
            Body::Any => true,
            _ if message.notice_text().is_none() => false,
            Body::Is(body) => text == body,
            Body::StartsWith(prefix) => text.starts_with(prefix),
            Body::Surrounds(prefix, suffix) => {
                text.starts_with(prefix) && text.ends_with(suffix)
            }
            Body::Matches(regex) => regex.is_match(text).unwrap_or(false),
        }
    }
}

/// Finds the first rule hiding `message`. `text` is its body with
/// formatting stripped.
pub fn find(
    network: Network,
    message: &Inbound<'_>,
    text: &str,
) -> Option<&'static Rule> {
    RULES
        .iter()
        .find(|rule| rule.matches(network, message, text))
}

static RULES: &[Rule] = &[
    Rule {
        name: "stats bot",
        network: None,
        sender: Sender::Is("freenode-connect"),
        body: Body::Any,
    },
    Rule {
        name: "no operator access",
        network: None,
        sender: Sender::Is("ChanServ"),
        body: Body::StartsWith("You do not have channel operator access to"),
    },
    Rule {
        name: "message of the day",
        network: Some(Network::GameSurge),
        sender: Sender::Is("Global"),
        body: Body::Any,
    },
    Rule {
        name: "welcome",
        network: None,
        sender: Sender::Is("[Welcome]"),
        body: Body::Any,
    },
    Rule {
        name: "no new memos",
        network: None,
        sender: Sender::Is("MemoServ"),
        body: Body::Is("You have no new memos"),
    },
    Rule {
        name: "password warning",
        network: None,
        sender: Sender::Is("Q"),
        body: Body::Is(
            "Remember: NO-ONE from QuakeNet will ever ask for your password.  \
             NEVER send your password to ANYONE except Q@CServe.quakenet.org.",
        ),
    },
    Rule {
        name: "registration advertisement",
        network: None,
        sender: Sender::Is("Z"),
        body: Body::Surrounds("Avertissement : Le pseudo ", "<votre pass>"),
    },
    Rule {
        name: "login",
        network: None,
        sender: Sender::Is("Z"),
        body: Body::StartsWith("Login réussi"),
    },
    Rule {
        name: "message du jour",
        network: None,
        sender: Sender::Is("Z"),
        body: Body::StartsWith("Message du Jour :"),
    },
    Rule {
        name: "connection count",
        network: None,
        sender: Sender::Any,
        body: Body::StartsWith("Highest connection count"),
    },
    Rule {
        name: "maximum de connexion",
        network: None,
        sender: Sender::Any,
        body: Body::StartsWith("Maximum de connexion"),
    },
    Rule {
        name: "hostname found",
        network: None,
        sender: Sender::Any,
        body: Body::StartsWith("*** Found your hostname"),
    },
    Rule {
        name: "hostname lookup",
        network: None,
        sender: Sender::Any,
        body: Body::Is("*** Looking up your hostname..."),
    },
    Rule {
        name: "ident lookup",
        network: None,
        sender: Sender::Any,
        body: Body::Is("*** Checking ident..."),
    },
    Rule {
        name: "no ident response",
        network: None,
        sender: Sender::Any,
        body: Body::Is("*** No ident response; username prefixed with ~"),
    },
    Rule {
        name: "pong hint",
        network: None,
        sender: Sender::Any,
        body: Body::StartsWith(
            "*** If you are having problems connecting due to ping timeouts, \
             please type /quote pong",
        ),
    },
    Rule {
        name: "hostname cloak",
        network: None,
        sender: Sender::EndsWith(".freenode.net"),
        body: Body::StartsWith("NickServ set your hostname to"),
    },
    Rule {
        name: "sign-on statistics",
        network: None,
        sender: Sender::Any,
        body: Body::Matches(&SIGN_ON_CRUFT),
    },
];
