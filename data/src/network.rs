use serde::{Deserialize, Serialize};

const DOMAIN_SUFFIXES: &[(&str, Network)] = &[
    (".gamesurge.net", Network::GameSurge),
    (".quakenet.org", Network::QuakeNet),
    (".jeux.fr", Network::Jeux),
    (".undernet.org", Network::UnderNet),
];

/// The services dialect spoken by the network an account connects to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    #[default]
    Unknown,
    GameSurge,
    NickServ,
    QuakeNet,
    Jeux,
    UnderNet,
}

impl Network {
    /// Classifies an account login (`nick@server`) by its domain suffix.
    ///
    /// A generic network stays [`Network::Unknown`]; it only becomes
    /// [`Network::NickServ`] once a nick password is known to be configured.
    pub fn classify(login: &str) -> Self {
        let login = login.to_lowercase();

        DOMAIN_SUFFIXES
            .iter()
            .find(|(suffix, _)| login.ends_with(suffix))
            .map_or(Network::Unknown, |(_, network)| *network)
    }

    pub fn name(self) -> &'static str {
        match self {
            Network::Unknown => "Unknown",
            Network::GameSurge => "GameSurge",
            Network::NickServ => "NickServ",
            Network::QuakeNet => "QuakeNet",
            Network::Jeux => "Jeux.fr",
            Network::UnderNet => "UnderNet",
        }
    }
}
