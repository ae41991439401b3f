//! Graceful shutdown: the shared signal and the in-flight trackers.
//!
//! One [`ShutdownSignal`] is shared by the server accept loop and the
//! shutdown gate filter. Once triggered, the server stops accepting, the
//! gate rejects new requests, and shutdown waits on the [`RequestTracker`]s
//! until in-flight work drains.
//!
//! # Example
//!
//! ```rust
//! use kiln_server::{RequestTracker, ShutdownSignal};
//!
//! let shutdown = ShutdownSignal::new();
//! let tracker = RequestTracker::new();
//!
//! let guard = tracker.acquire();
//! shutdown.trigger();
//! assert!(shutdown.is_shutdown());
//! assert_eq!(tracker.in_flight(), 1);
//!
//! drop(guard);
//! assert_eq!(tracker.in_flight(), 0);
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::{broadcast, Notify};

/// A signal that triggers and awaits graceful shutdown.
///
/// Clones share state; triggering any clone triggers all of them.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Triggers the signal. Idempotent.
    pub fn trigger(&self) {
        if self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // no receivers is fine
            let _ = self.sender.send(());
        }
    }

    /// Returns `true` once the signal was triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Returns a future that completes when the signal triggers.
    ///
    /// Completes immediately if it already has.
    pub fn recv(&self) -> ShutdownReceiver {
        ShutdownReceiver {
            triggered: Arc::clone(&self.triggered),
            receiver: self.sender.subscribe(),
        }
    }

    /// Triggers this signal on SIGTERM or SIGINT (Ctrl+C).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn listen_for_os_signals(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            wait_for_os_signal().await;
            signal.trigger();
        });
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A future that completes when the shutdown signal is triggered.
///
/// Created by [`ShutdownSignal::recv()`].
pub struct ShutdownReceiver {
    triggered: Arc<AtomicBool>,
    receiver: broadcast::Receiver<()>,
}

impl Future for ShutdownReceiver {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.triggered.load(Ordering::SeqCst) {
            return Poll::Ready(());
        }

        match Pin::new(&mut self.receiver).poll_recv(cx) {
            Poll::Ready(_) => Poll::Ready(()),
            Poll::Pending => Poll::Pending,
        }
    }
}

async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
                    _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown"),
                }
                return;
            }
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(error = %err, "signal handlers unavailable, falling back to Ctrl+C");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(err) => {
            tracing::error!(error = %err, "cannot listen for Ctrl+C, shutdown only on request");
            std::future::pending::<()>().await;
        }
    }
}

/// Counts in-flight work (requests or connections).
///
/// Every [`RequestGuard`] handed out by [`acquire`](Self::acquire) counts
/// once until it is dropped, so the count stays paired even when a handler
/// fails or panics.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
    gauge: Option<&'static str>,
}

impl RequestTracker {
    /// Creates a tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker that mirrors its count into a `metrics` gauge.
    #[must_use]
    pub fn with_gauge(name: &'static str) -> Self {
        Self {
            gauge: Some(name),
            ..Self::default()
        }
    }

    /// Counts one unit of work until the guard is dropped.
    #[must_use]
    pub fn acquire(&self) -> RequestGuard {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.report(now);
        RequestGuard {
            tracker: self.clone(),
        }
    }

    /// Returns the number of outstanding guards.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Waits until no guard is outstanding.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn release(&self) {
        let previous = self.active.fetch_sub(1, Ordering::SeqCst);
        self.report(previous - 1);
        if previous == 1 {
            self.notify.notify_waiters();
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn report(&self, value: usize) {
        if let Some(name) = self.gauge {
            metrics::gauge!(name).set(value as f64);
        }
    }
}

/// Keeps one unit of work counted in its [`RequestTracker`].
#[derive(Debug)]
pub struct RequestGuard {
    tracker: RequestTracker,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.tracker.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_shutdown_signal_trigger_idempotent() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
        signal.trigger();
        signal.trigger();
        assert!(signal.is_shutdown());
    }

    #[test]
    fn test_shutdown_signal_clone_shares_state() {
        let signal = ShutdownSignal::new();
        let other = signal.clone();
        other.trigger();
        assert!(signal.is_shutdown());
    }

    #[tokio::test]
    async fn test_recv_completes_when_triggered() {
        let signal = ShutdownSignal::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        });

        tokio::time::timeout(Duration::from_secs(1), signal.recv())
            .await
            .expect("recv should complete");
    }

    #[tokio::test]
    async fn test_recv_immediate_when_already_triggered() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        tokio::time::timeout(Duration::from_millis(10), signal.recv())
            .await
            .expect("recv should complete immediately");
    }

    #[test]
    fn test_recv_pending_until_triggered() {
        let signal = ShutdownSignal::new();
        let mut waiting = tokio_test::task::spawn(signal.recv());
        tokio_test::assert_pending!(waiting.poll());

        signal.trigger();
        assert!(waiting.is_woken());
        tokio_test::assert_ready!(waiting.poll());
    }

    #[test]
    fn test_idle_tracker_ready_immediately() {
        let tracker = RequestTracker::new();
        tokio_test::block_on(tracker.wait_idle());
    }

    #[test]
    fn test_guards_pair_up() {
        let tracker = RequestTracker::with_gauge("kiln_test_in_flight");
        let first = tracker.acquire();
        let second = tracker.acquire();
        assert_eq!(tracker.in_flight(), 2);
        drop(first);
        assert_eq!(tracker.in_flight(), 1);
        drop(second);
        assert_eq!(tracker.in_flight(), 0);
    }

    #[test]
    fn test_guard_released_on_panic() {
        let tracker = RequestTracker::new();
        let inner = tracker.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = inner.acquire();
            panic!("handler failed");
        }));
        assert!(result.is_err());
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_wait_idle() {
        let tracker = RequestTracker::new();
        tokio::time::timeout(Duration::from_millis(10), tracker.wait_idle())
            .await
            .expect("idle tracker should not block");

        let guard = tracker.acquire();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(guard);
        });
        tokio::time::timeout(Duration::from_secs(1), tracker.wait_idle())
            .await
            .expect("wait_idle should complete");
    }
}
