/// How an inbound private message reached us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    Privmsg,
    Notice,
    /// An automated reply such as an away message.
    AutoResponse,
}

/// A private message or notice already parsed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inbound<'a> {
    pub sender: &'a str,
    pub body: &'a str,
    pub kind: Kind,
}

impl<'a> Inbound<'a> {
    pub fn new(sender: &'a str, body: &'a str, kind: Kind) -> Self {
        Self { sender, body, kind }
    }

    pub fn notice(sender: &'a str, body: &'a str) -> Self {
        Self::new(sender, body, Kind::Notice)
    }

    pub fn privmsg(sender: &'a str, body: &'a str) -> Self {
        Self::new(sender, body, Kind::Privmsg)
    }

    pub fn auto_response(sender: &'a str, body: &'a str) -> Self {
        Self::new(sender, body, Kind::AutoResponse)
    }

    /// The body, if this is a notice.
    pub fn notice_text(&self) -> Option<&'a str> {
        (self.kind == Kind::Notice).then_some(self.body)
    }
}

/// What the host should do with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Deliver the message as usual.
    Pass,
    /// Drop the message.
    Suppress,
    /// Drop the message and show `body` from the same sender as a system
    /// line in the chat window for `channel`, which is known to be open.
    Replace { channel: String, body: String },
}

impl Decision {
    pub fn is_suppressed(&self) -> bool {
        !matches!(self, Decision::Pass)
    }
}

/// A line about to be written into a chat window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outgoing<'a> {
    pub chat: &'a str,
    pub body: &'a str,
    /// The chat's current topic, if it has one.
    pub topic: Option<&'a str>,
    /// Whether the line is a system message rather than something said.
    pub system: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    Keep,
    Cancel,
}
