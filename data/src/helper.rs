use std::sync::{Arc, Weak};
use std::time::Duration;

use thiserror::Error;

use crate::command::Command;
use crate::config::{Account, Config};
use crate::state::{self, Phase};
use crate::{ConnectionId, Host, Network, rewrite, suppress};

/// Handle to the helper shared by every connection of a host.
///
/// Cloning is cheap. Must be created and driven from within a Tokio runtime,
/// since identify and ghost timeouts are spawned as tasks.
#[derive(Clone)]
pub struct Helper {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) host: Arc<dyn Host>,
    pub(crate) identify_timeout: Duration,
    pub(crate) ghost_timeout: Duration,
    pub(crate) connections: state::Registry,
    pub(crate) auto_responses: suppress::Cache,
    pub(crate) openings: rewrite::Openings,
}

impl Helper {
    pub fn new(host: Arc<dyn Host>, config: &Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                host,
                identify_timeout: config.identify_timeout,
                ghost_timeout: config.ghost_timeout,
                connections: state::Registry::default(),
                auto_responses: suppress::Cache::new(
                    config.auto_response_interval,
                ),
                openings: rewrite::Openings::default(),
            }),
        }
    }

    pub(crate) fn inner(&self) -> &Inner {
        &self.inner
    }

    pub(crate) fn host(&self) -> &dyn Host {
        self.inner.host.as_ref()
    }

    pub(crate) fn downgrade(&self) -> WeakHelper {
        WeakHelper(Arc::downgrade(&self.inner))
    }

    /// Tears down everything kept for a connection. Pending timeouts are
    /// cancelled.
    pub fn on_signed_off(&self, connection: ConnectionId) {
        if let Some(state) = self.inner.connections.remove(connection) {
            log::debug!(
                "[{connection}] signed off from {} in phase {}",
                state.account.login,
                state.phase()
            );
        }

        self.inner.auto_responses.remove_connection(connection);
        self.inner.openings.remove_connection(connection);
    }

    pub fn phase(&self, connection: ConnectionId) -> Option<Phase> {
        self.inner.connections.phase(connection)
    }

    pub fn network(&self, connection: ConnectionId) -> Option<Network> {
        self.inner
            .connections
            .get(connection)
            .map(|state| state.network)
    }

    pub fn account(&self, connection: ConnectionId) -> Option<Arc<Account>> {
        self.inner
            .connections
            .get(connection)
            .map(|state| state.account)
    }

    pub(crate) fn display_name(
        &self,
        connection: ConnectionId,
    ) -> Option<String> {
        self.host().display_name(connection)
    }

    /// Runs a client command. A failure is logged and otherwise ignored so
    /// the connection keeps working without the helper.
    pub(crate) fn run(&self, connection: ConnectionId, command: &Command) {
        log::debug!("[{connection}] running: {}", command.redacted());

        if let Err(reason) = self.host().run_command(connection, command) {
            log::warn!(
                "[{connection}] {}",
                Error::CommandDispatch {
                    command: command.redacted(),
                    reason,
                }
            );
        }
    }
}

#[derive(Clone)]
pub(crate) struct WeakHelper(Weak<Inner>);

impl WeakHelper {
    pub(crate) fn upgrade(&self) -> Option<Helper> {
        self.0.upgrade().map(|inner| Helper { inner })
    }
}

/// Ways authentication can fall short. None of these are fatal to the
/// connection; they are logged and, for rejected passwords, shown to the
/// user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0} is not configured, skipping")]
    ConfigIncomplete(&'static str),
    #[error("{service} did not confirm identification within {timeout:?}")]
    IdentifyTimeout {
        service: &'static str,
        timeout: Duration,
    },
    #[error("{0} rejected the password")]
    IdentifyRejected(&'static str),
    #[error("ghost of {0} not confirmed killed, reclaiming anyway")]
    GhostRecoveryTimeout(String),
    #[error("command `{command}` failed: {reason}")]
    CommandDispatch { command: String, reason: String },
}
