use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Account;
use crate::timer::Deadline;
use crate::{ConnectionId, Network};

/// Where a connection is in its authentication with the network's services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    #[default]
    Idle,
    /// Waiting for NickServ to kill a ghost holding our nickname.
    KillingGhost,
    /// Credentials were sent, waiting for the service to confirm.
    Identifying,
    Identified,
    /// Rejected or timed out. Terminal until the next sign-on.
    Failed,
}

#[derive(Debug)]
pub struct Connection {
    pub account: Arc<Account>,
    pub network: Network,
    phase: Phase,
    identify: Option<Deadline>,
    ghost: Option<Deadline>,
}

impl Connection {
    fn new(account: Arc<Account>, network: Network) -> Self {
        Self {
            account,
            network,
            phase: Phase::Idle,
            identify: None,
            ghost: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Drops whichever deadline no longer guards the new phase.
    fn set_phase(&mut self, phase: Phase) {
        if phase != Phase::Identifying {
            self.identify = None;
        }
        if phase != Phase::KillingGhost {
            self.ghost = None;
        }

        self.phase = phase;
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            account: self.account.clone(),
            network: self.network,
            phase: self.phase,
        }
    }
}

/// A copy of a connection's state taken under the registry lock.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub account: Arc<Account>,
    pub network: Network,
    pub phase: Phase,
}

/// Every signed-on connection, keyed by the host's connection identity.
#[derive(Debug, Default)]
pub struct Registry(Mutex<HashMap<ConnectionId, Connection>>);

impl Registry {
    /// Registers a freshly signed-on connection, replacing (and cancelling
    /// the deadlines of) any stale entry with the same identity.
    pub fn insert(
        &self,
        connection: ConnectionId,
        account: Arc<Account>,
        network: Network,
    ) {
        self.0
            .lock()
            .insert(connection, Connection::new(account, network));
    }

    pub fn remove(&self, connection: ConnectionId) -> Option<Connection> {
        self.0.lock().remove(&connection)
    }

    pub fn get(&self, connection: ConnectionId) -> Option<Snapshot> {
        self.0.lock().get(&connection).map(Connection::snapshot)
    }

    pub fn phase(&self, connection: ConnectionId) -> Option<Phase> {
        self.0.lock().get(&connection).map(Connection::phase)
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves the connection to `to` if it is currently in one of `from`.
    ///
    /// Returns the state after the move, or `None` if the connection is
    /// gone or was in another phase, in which case nothing changed.
    pub fn transition(
        &self,
        connection: ConnectionId,
        from: &[Phase],
        to: Phase,
    ) -> Option<Snapshot> {
        let mut connections = self.0.lock();
        let state = connections.get_mut(&connection)?;

        if !from.contains(&state.phase) {
            return None;
        }

        state.set_phase(to);

        Some(state.snapshot())
    }

    /// Enters [`Phase::Identifying`] guarded by `deadline`, superseding any
    /// earlier identify deadline.
    pub(crate) fn identifying(
        &self,
        connection: ConnectionId,
        deadline: impl FnOnce() -> Deadline,
    ) -> bool {
        let mut connections = self.0.lock();
        let Some(state) = connections.get_mut(&connection) else {
            return false;
        };

        state.set_phase(Phase::Identifying);
        state.identify = Some(deadline());

        true
    }

    /// Enters [`Phase::KillingGhost`] guarded by `deadline`.
    pub(crate) fn killing_ghost(
        &self,
        connection: ConnectionId,
        deadline: impl FnOnce() -> Deadline,
    ) -> bool {
        let mut connections = self.0.lock();
        let Some(state) = connections.get_mut(&connection) else {
            return false;
        };

        state.set_phase(Phase::KillingGhost);
        state.ghost = Some(deadline());

        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use tokio::time;

    use super::*;

    fn registry(connection: ConnectionId) -> Registry {
        let registry = Registry::default();
        registry.insert(
            connection,
            Arc::new(Account::new("foo@irc.libera.chat")),
            Network::NickServ,
        );
        registry
    }

    #[test]
    fn transition_requires_expected_phase() {
        let connection = ConnectionId::from(1);
        let registry = registry(connection);

        assert_eq!(registry.phase(connection), Some(Phase::Idle));
        assert!(
            registry
                .transition(connection, &[Phase::Identifying], Phase::Failed)
                .is_none()
        );
        assert_eq!(registry.phase(connection), Some(Phase::Idle));

        let state = registry
            .transition(connection, &[Phase::Idle], Phase::Identified)
            .unwrap();
        assert_eq!(state.phase, Phase::Identified);
        assert_eq!(state.network, Network::NickServ);
    }

    #[test]
    fn unknown_connection() {
        let registry = Registry::default();
        let connection = ConnectionId::from(7);

        assert!(registry.get(connection).is_none());
        assert!(
            registry
                .transition(connection, &[Phase::Idle], Phase::Failed)
                .is_none()
        );
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_phase_cancels_its_deadline() {
        let connection = ConnectionId::from(1);
        let registry = registry(connection);
        let fired = Arc::new(AtomicBool::new(false));

        let flag = fired.clone();
        registry.identifying(connection, || {
            Deadline::after(Duration::from_secs(4), move || {
                flag.store(true, Ordering::SeqCst);
            })
        });
        registry.transition(connection, &[Phase::Identifying], Phase::Identified);

        time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn removing_cancels_deadlines() {
        let connection = ConnectionId::from(1);
        let registry = registry(connection);
        let fired = Arc::new(AtomicBool::new(false));

        let flag = fired.clone();
        registry.killing_ghost(connection, || {
            Deadline::after(Duration::from_secs(4), move || {
                flag.store(true, Ordering::SeqCst);
            })
        });
        assert!(registry.remove(connection).is_some());

        time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
