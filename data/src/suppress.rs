//! Short-lived memory of auto-responses, so an away message repeated on
//! every line we send is only shown once.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::ConnectionId;
use crate::timer::Deadline;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub received: Option<Instant>,
    pub message: String,
}

impl Record {
    fn is_recent(&self, now: Instant, interval: Duration) -> bool {
        self.received
            .is_some_and(|received| now.duration_since(received) <= interval)
    }
}

#[derive(Debug, Default)]
struct State {
    records: HashMap<(ConnectionId, String), Record>,
    sweep: Option<Deadline>,
}

#[derive(Debug)]
pub struct Cache {
    interval: Duration,
    state: Arc<Mutex<State>>,
}

impl Cache {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: Arc::default(),
        }
    }

    /// Records an auto-response from `sender`. Returns `true` if the same
    /// message was already received from them within the interval, in which
    /// case only the timestamp is refreshed.
    pub fn is_repeat(
        &self,
        connection: ConnectionId,
        sender: &str,
        message: &str,
    ) -> bool {
        let now = Instant::now();
        let interval = self.interval;

        self.with_record(connection, sender, |record| {
            let repeat =
                record.is_recent(now, interval) && record.message == message;

            record.received = Some(now);
            if !repeat {
                record.message = message.to_string();
            }

            repeat
        })
    }

    /// Runs `f` on the record for `sender`, creating an empty one if there
    /// is none, and schedules a sweep unless one is already pending.
    pub fn with_record<T>(
        &self,
        connection: ConnectionId,
        sender: &str,
        f: impl FnOnce(&mut Record) -> T,
    ) -> T {
        let mut state = self.state.lock();

        if state.sweep.is_none() {
            state.sweep = Some(self.schedule_sweep());
        }

        let record = state
            .records
            .entry((connection, sender.to_string()))
            .or_default();

        f(record)
    }

    fn schedule_sweep(&self) -> Deadline {
        let state = Arc::downgrade(&self.state);
        let interval = self.interval;

        Deadline::after(interval + Duration::from_secs(1), move || {
            sweep(&state, interval);
        })
    }

    pub fn remove_connection(&self, connection: ConnectionId) {
        self.state
            .lock()
            .records
            .retain(|(id, _), _| *id != connection);
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sweep(state: &Weak<Mutex<State>>, interval: Duration) {
    let Some(state) = state.upgrade() else {
        return;
    };

    let now = Instant::now();
    let mut state = state.lock();

    let before = state.records.len();
    state
        .records
        .retain(|_, record| record.is_recent(now, interval));
    state.sweep = None;

    log::trace!(
        "expired {} auto-response record(s)",
        before - state.records.len()
    );
}
