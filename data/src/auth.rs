use std::sync::Arc;

use crate::command::{self, Command};
use crate::config::Account;
use crate::helper::Error;
use crate::message::{Decision, Inbound};
use crate::state::{Phase, Snapshot};
use crate::timer::Deadline;
use crate::{ConnectionId, Helper, Network};

/// Substring of NickServ's notice once a ghost has been disconnected.
pub(crate) const GHOST_KILLED: &str = " has been killed";

/// An identity service whose replies are tracked while identifying.
struct Service {
    network: Network,
    nickname: &'static str,
    identified: Reply,
    failed: Reply,
    title: &'static str,
    primary: &'static str,
}

enum Reply {
    Is(&'static str),
    StartsWith(&'static str),
}

impl Reply {
    fn matches(&self, text: &str) -> bool {
        match self {
            Reply::Is(reply) => text == *reply,
            Reply::StartsWith(prefix) => text.starts_with(prefix),
        }
    }
}

const SERVICES: &[Service] = &[
    Service {
        network: Network::NickServ,
        nickname: command::NICKSERV,
        identified: Reply::Is("Password accepted - you are now recognized"),
        failed: Reply::Is("Password Incorrect"),
        title: "NickServ Authentication Error",
        primary: "Error authenticating with NickServ",
    },
    Service {
        network: Network::GameSurge,
        nickname: "AuthServ",
        identified: Reply::Is("I recognize you."),
        failed: Reply::Is("Incorrect password; please try again."),
        title: "GameSurge Authentication Error",
        primary: "Error authenticating with AuthServ",
    },
    Service {
        network: Network::QuakeNet,
        nickname: "Q",
        identified: Reply::Is("AUTH'd successfully."),
        failed: Reply::Is(
            "Lastly, When you do recover your password, please choose a NEW PASSWORD, \
             not your old one! See the above URL for details.",
        ),
        title: "QuakeNet Authentication Error",
        primary: "Error authenticating with Q",
    },
    Service {
        network: Network::UnderNet,
        nickname: "X",
        identified: Reply::StartsWith("AUTHENTICATION SUCCESSFUL as "),
        failed: Reply::StartsWith("AUTHENTICATION FAILED as "),
        title: "UnderNet Authentication Error",
        primary: "Error authenticating with X",
    },
];

/// Where AuthServ-style logins are sent as a private message.
fn login_target(network: Network) -> Option<(&'static str, &'static str)> {
    match network {
        Network::GameSurge => Some(("AuthServ@Services.GameSurge.net", "AUTH")),
        Network::QuakeNet => Some(("Q@CServe.quakenet.org", "AUTH")),
        Network::UnderNet => Some(("x@channels.undernet.org", "login")),
        Network::Unknown | Network::NickServ | Network::Jeux => None,
    }
}

fn service_name(network: Network) -> &'static str {
    SERVICES
        .iter()
        .find(|service| service.network == network)
        .map_or("Z", |service| service.nickname)
}

impl Helper {
    /// Starts authenticating a connection that just finished registering.
    pub fn on_signed_on(&self, connection: ConnectionId, account: Arc<Account>) {
        let network = match Network::classify(&account.login) {
            Network::Unknown if account.nick_password().is_some() => {
                Network::NickServ
            }
            network => network,
        };

        self.inner()
            .connections
            .insert(connection, account.clone(), network);

        let display_name = self.display_name(connection);

        log::info!(
            "[{connection}] connected with {}: {}",
            network.name(),
            display_name.as_deref().unwrap_or(account.nickname())
        );

        match network {
            Network::GameSurge | Network::QuakeNet | Network::UnderNet => {
                self.authserv_identify(connection, &account, network);
            }
            Network::Jeux => self.jeux_identify(connection, &account),
            Network::NickServ => {
                if self.nickserv_sign_on(
                    connection,
                    &account,
                    display_name.as_deref(),
                ) {
                    // Ghost recovery resumes the sequence once the nickname
                    // is free.
                    return;
                }
            }
            Network::Unknown => {
                log::debug!("[{connection}] {}", Error::ConfigIncomplete("nick password"));
            }
        }

        self.oper_identify(connection, &account);
    }

    fn authserv_identify(
        &self,
        connection: ConnectionId,
        account: &Account,
        network: Network,
    ) {
        let Some((target, verb)) = login_target(network) else {
            return;
        };
        let (Some(name), Some(password)) =
            (account.auth_name(), account.nick_password())
        else {
            log::debug!("[{connection}] {}", Error::ConfigIncomplete("auth name or nick password"));
            return;
        };

        log::debug!("[{connection}] sending authentication to {target}: {verb} {name} ********");

        self.begin_identify(connection);
        self.host()
            .send_line(connection, target, &format!("{verb} {name} {password}"));
    }

    fn jeux_identify(&self, connection: ConnectionId, account: &Account) {
        let username = account.nickname();
        let Some(password) =
            account.nick_password().filter(|_| !username.is_empty())
        else {
            log::debug!("[{connection}] {}", Error::ConfigIncomplete("nick password"));
            return;
        };

        self.begin_identify(connection);
        self.run(
            connection,
            &Command::JeuxLogin {
                username: username.to_string(),
                password: password.to_string(),
            },
        );
    }

    /// Returns `true` if ghost recovery took over the rest of the sign-on.
    fn nickserv_sign_on(
        &self,
        connection: ConnectionId,
        account: &Account,
        display_name: Option<&str>,
    ) -> bool {
        let Some(password) = account.nick_password() else {
            return false;
        };

        let nickname_taken =
            display_name.is_some_and(|name| name != account.nickname());

        if account.disconnect_ghosts && nickname_taken {
            self.kill_ghost(connection, account, password);
            return true;
        }

        self.nickserv_identify(connection, password);

        false
    }

    pub(crate) fn nickserv_identify(&self, connection: ConnectionId, password: &str) {
        self.begin_identify(connection);
        self.run(
            connection,
            &Command::Identify {
                password: password.to_string(),
            },
        );
    }

    pub(crate) fn oper_identify(&self, connection: ConnectionId, account: &Account) {
        let Some(password) = account.oper_password() else {
            return;
        };

        let name = self
            .display_name(connection)
            .unwrap_or_else(|| account.nickname().to_string());

        self.run(
            connection,
            &Command::Oper {
                name,
                password: password.to_string(),
            },
        );
    }

    fn begin_identify(&self, connection: ConnectionId) {
        let helper = self.downgrade();
        let timeout = self.inner().identify_timeout;

        self.inner().connections.identifying(connection, || {
            Deadline::after(timeout, move || {
                if let Some(helper) = helper.upgrade() {
                    helper.identify_timed_out(connection);
                }
            })
        });
    }

    fn identify_timed_out(&self, connection: ConnectionId) {
        if let Some(state) = self.inner().connections.transition(
            connection,
            &[Phase::Identifying],
            Phase::Failed,
        ) {
            log::info!(
                "[{connection}] {}",
                Error::IdentifyTimeout {
                    service: service_name(state.network),
                    timeout: self.inner().identify_timeout,
                }
            );
        }
    }

    /// Follows the identity service's replies while credentials are
    /// outstanding. Returns `None` if the message is not from the service
    /// being waited on.
    pub(crate) fn track_identify(
        &self,
        connection: ConnectionId,
        state: &Snapshot,
        message: &Inbound<'_>,
    ) -> Option<Decision> {
        let service = SERVICES
            .iter()
            .find(|service| service.network == state.network)?;

        let waiting = match state.phase {
            Phase::Identifying => true,
            Phase::KillingGhost => state.network == Network::NickServ,
            Phase::Idle | Phase::Identified | Phase::Failed => false,
        };

        if !waiting || message.sender != service.nickname {
            return None;
        }

        let Some(text) = message.notice_text() else {
            return Some(Decision::Suppress);
        };

        if service.identified.matches(text) {
            if self
                .inner()
                .connections
                .transition(
                    connection,
                    &[Phase::Identifying, Phase::KillingGhost],
                    Phase::Identified,
                )
                .is_some()
            {
                log::info!("[{connection}] identified with {}", service.nickname);
            }
        } else if state.phase == Phase::KillingGhost && text.contains(GHOST_KILLED)
        {
            self.ghost_killed(connection);
        } else if service.failed.matches(text)
            && self
                .inner()
                .connections
                .transition(
                    connection,
                    &[Phase::Identifying, Phase::KillingGhost],
                    Phase::Failed,
                )
                .is_some()
        {
            log::warn!(
                "[{connection}] {}",
                Error::IdentifyRejected(service.nickname)
            );
            self.host().notify_error(
                service.title,
                service.primary,
                "Check your password.",
            );
        }

        Some(Decision::Suppress)
    }
}
