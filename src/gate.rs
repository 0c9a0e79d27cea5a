#![cfg(feature = "std")]

//! Per-seat input gate.
//!
//! The gate turns lines arriving asynchronously from a connection handler
//! into a blocking "read the next answer" call for the session loop. A line
//! is accepted only while the gate is armed, and accepting it consumes the
//! arm, so at most one answer is ever pending.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{timeout_at, Instant};

/// Item waiting in the gate's single slot.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Line(String),
    Disconnected,
}

/// What a `read` resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRead {
    Line(String),
    /// Nothing arrived before the deadline.
    Timeout,
    /// The session was torn down by a disconnect; not retryable.
    Disconnected,
}

/// Result of offering a line to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Accepted,
    /// Gate was not armed; the line is dropped and the sender should be told.
    Rejected,
}

#[derive(Debug, Default)]
pub struct InputGate {
    armed: AtomicBool,
    slot: Mutex<Option<Pending>>,
    notify: Notify,
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Pending>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start accepting one line.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    /// Stop accepting lines and drop an answer nobody is going to read.
    pub fn disarm(&self) {
        let mut slot = self.slot();
        self.armed.store(false, Ordering::Release);
        if matches!(*slot, Some(Pending::Line(_))) {
            *slot = None;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Offer a line from the connection handler.
    pub fn deliver(&self, line: impl Into<String>) -> Delivery {
        let mut slot = self.slot();
        if slot.is_some()
            || self
                .armed
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return Delivery::Rejected;
        }
        *slot = Some(Pending::Line(line.into()));
        drop(slot);
        self.notify.notify_one();
        Delivery::Accepted
    }

    /// Wait for the next delivered line, at most `timeout`.
    pub async fn read(&self, timeout: Duration) -> GateRead {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(item) = self.take() {
                return item;
            }
            if timeout_at(deadline, self.notify.notified()).await.is_err() {
                return self.take().unwrap_or(GateRead::Timeout);
            }
        }
    }

    fn take(&self) -> Option<GateRead> {
        self.slot().take().map(|item| match item {
            Pending::Line(line) => GateRead::Line(line),
            Pending::Disconnected => GateRead::Disconnected,
        })
    }

    /// Drain any pending input and hand the reader the disconnect sentinel,
    /// waking a `read` that is currently blocked.
    pub fn force_disconnect(&self) {
        let mut slot = self.slot();
        self.armed.store(false, Ordering::Release);
        *slot = Some(Pending::Disconnected);
        drop(slot);
        self.notify.notify_one();
    }

    /// Reset to disarmed and empty, discarding a stale sentinel from an earlier session.
    pub fn clear(&self) {
        let mut slot = self.slot();
        self.armed.store(false, Ordering::Release);
        *slot = None;
    }
}
