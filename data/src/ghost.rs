//! Reclaiming a nickname held by a stale connection of ours.
//!
//! NickServ is asked to kill the ghost, then the nickname is taken back and
//! identified once NickServ confirms the kill or the ghost timeout expires,
//! whichever happens first. Servers may ignore GHOST entirely, so the
//! timeout bounds how long sign-on waits.

use crate::command::Command;
use crate::config::Account;
use crate::helper::Error;
use crate::state::Phase;
use crate::timer::Deadline;
use crate::{ConnectionId, Helper};

impl Helper {
    pub(crate) fn kill_ghost(
        &self,
        connection: ConnectionId,
        account: &Account,
        password: &str,
    ) {
        let helper = self.downgrade();
        let timeout = self.inner().ghost_timeout;

        self.inner().connections.killing_ghost(connection, || {
            Deadline::after(timeout, move || {
                if let Some(helper) = helper.upgrade() {
                    helper.ghost_timed_out(connection);
                }
            })
        });

        self.run(
            connection,
            &Command::Ghost {
                nickname: account.nickname().to_string(),
                password: password.to_string(),
            },
        );
    }

    fn ghost_timed_out(&self, connection: ConnectionId) {
        if self.inner().connections.phase(connection) == Some(Phase::KillingGhost)
            && let Some(account) = self.account(connection)
        {
            log::info!(
                "[{connection}] {}",
                Error::GhostRecoveryTimeout(account.nickname().to_string())
            );
        }

        self.ghost_killed(connection);
    }

    /// Resumes sign-on once the ghost is gone. Only the first call after
    /// [`Helper::kill_ghost`] does anything; later ones find the phase
    /// already moved on.
    pub(crate) fn ghost_killed(&self, connection: ConnectionId) {
        let Some(state) = self.inner().connections.transition(
            connection,
            &[Phase::KillingGhost],
            Phase::Identifying,
        ) else {
            return;
        };

        let account = state.account;

        self.run(connection, &Command::Nick(account.nickname().to_string()));

        if let Some(password) = account.nick_password() {
            self.nickserv_identify(connection, password);
        }

        self.oper_identify(connection, &account);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time;

    use super::*;
    use crate::message::{Decision, Inbound};
    use crate::test::{Recorder, helper};

    const KILLED: &str = "foo has been killed";

    fn sign_on(host: &Recorder, helper: &Helper, connection: ConnectionId) {
        host.set_display_name(connection, "foo_");

        let account = Account {
            nick_password: Some("pw".into()),
            oper_password: Some("op".into()),
            disconnect_ghosts: true,
            ..Account::new("foo@irc.libera.chat")
        };
        helper.on_signed_on(connection, Arc::new(account));
    }

    fn resumed() -> Vec<String> {
        vec![
            "quote NickServ GHOST foo pw".to_string(),
            "nick foo".to_string(),
            "quote NickServ IDENTIFY pw".to_string(),
            "quote OPER foo op".to_string(),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_before_timeout() {
        let host = Recorder::default();
        let helper = helper(&host);
        let connection = ConnectionId::from(1);

        sign_on(&host, &helper, connection);

        // Operator escalation waits for the ghost too.
        assert_eq!(
            host.commands(),
            vec!["quote NickServ GHOST foo pw".to_string()]
        );
        assert_eq!(helper.phase(connection), Some(Phase::KillingGhost));

        // The host renames us as soon as the nick command runs.
        host.rename_on_nick(connection);

        let decision =
            helper.on_inbound(connection, &Inbound::notice("NickServ", KILLED));
        assert_eq!(decision, Decision::Suppress);
        assert_eq!(host.commands(), resumed());
        assert_eq!(helper.phase(connection), Some(Phase::Identifying));

        // The ghost timeout was cancelled and does nothing.
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(host.commands(), resumed());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_before_confirmation() {
        let host = Recorder::default();
        let helper = helper(&host);
        let connection = ConnectionId::from(1);

        sign_on(&host, &helper, connection);
        host.rename_on_nick(connection);

        time::sleep(Duration::from_millis(4001)).await;
        assert_eq!(host.commands(), resumed());
        assert_eq!(helper.phase(connection), Some(Phase::Identifying));

        // A late kill confirmation is still NickServ noise while identifying,
        // but doesn't resume sign-on a second time.
        let decision =
            helper.on_inbound(connection, &Inbound::notice("NickServ", KILLED));
        assert_eq!(decision, Decision::Suppress);
        assert_eq!(host.commands(), resumed());
    }

    #[tokio::test(start_paused = true)]
    async fn simultaneous_arrival() {
        let host = Recorder::default();
        let helper = helper(&host);
        let connection = ConnectionId::from(1);

        sign_on(&host, &helper, connection);
        host.rename_on_nick(connection);

        // Expire the ghost timeout without letting its task run yet, then
        // deliver the confirmation in the same instant.
        time::advance(Duration::from_millis(4000)).await;
        helper.on_inbound(connection, &Inbound::notice("NickServ", KILLED));
        time::sleep(Duration::from_millis(1)).await;

        assert_eq!(host.commands(), resumed());
    }

    #[tokio::test(start_paused = true)]
    async fn identified_while_killing_ghost() {
        let host = Recorder::default();
        let helper = helper(&host);
        let connection = ConnectionId::from(1);

        sign_on(&host, &helper, connection);

        helper.on_inbound(
            connection,
            &Inbound::notice("NickServ", "Password accepted - you are now recognized"),
        );
        assert_eq!(helper.phase(connection), Some(Phase::Identified));

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(
            host.commands(),
            vec!["quote NickServ GHOST foo pw".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn signed_off_while_killing_ghost() {
        let host = Recorder::default();
        let helper = helper(&host);
        let connection = ConnectionId::from(1);

        sign_on(&host, &helper, connection);
        helper.on_signed_off(connection);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(
            host.commands(),
            vec!["quote NickServ GHOST foo pw".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn not_enabled() {
        let host = Recorder::default();
        let helper = helper(&host);
        let connection = ConnectionId::from(1);
        host.set_display_name(connection, "foo_");

        let account = Account {
            nick_password: Some("pw".into()),
            ..Account::new("foo@irc.libera.chat")
        };
        helper.on_signed_on(connection, Arc::new(account));

        assert_eq!(
            host.commands(),
            vec!["quote NickServ IDENTIFY pw".to_string()]
        );
    }
}
