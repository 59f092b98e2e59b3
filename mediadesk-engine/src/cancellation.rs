// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A cooperative pause/stop signal threaded into the scheduler (C8) and the
//! directory watcher (C10). Observed only at suspension points, never
//! polled busily.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// A cloneable handle carrying pause/stop intent. Unlike a single shared
/// boolean, pause and stop are independent: a paused run can still be
/// resumed, a stopped one cannot.
#[derive(Clone)]
pub struct CancellationSignal {
    paused: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self {
            paused: Arc::new(AtomicBool::new(false)),
            stopped: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Clears the pause flag, e.g. on a fresh resume.
    pub fn clear_pause(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Whether a suspension point should yield back to the caller.
    pub fn should_suspend(&self) -> bool {
        self.is_paused() || self.is_stopped()
    }

    /// Waits until either flag becomes set, without polling.
    pub async fn suspended(&self) {
        if self.should_suspend() {
            return;
        }
        self.notify.notified().await;
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_neither_paused_nor_stopped() {
        let signal = CancellationSignal::new();
        assert!(!signal.should_suspend());
    }

    #[test]
    fn pause_and_stop_are_independent() {
        let signal = CancellationSignal::new();
        signal.pause();
        assert!(signal.is_paused());
        assert!(!signal.is_stopped());
        signal.clear_pause();
        assert!(!signal.is_paused());
    }

    #[tokio::test]
    async fn suspended_returns_immediately_once_stopped() {
        let signal = CancellationSignal::new();
        signal.stop();
        tokio::time::timeout(std::time::Duration::from_millis(50), signal.suspended())
            .await
            .expect("should not block once stopped");
    }
}
