//! Suspense gate: an explicit settle-point for the asynchronous boundary.
//!
//! Work registers a guard; the gate reports settled once every guard has
//! finished. The first recorded failure wins and rejects the mount. There is
//! no timeout path; work that never finishes keeps `settled` pending.
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{Result, TestkitError};

pub struct SuspenseGate {
    pending: AtomicUsize,
    notify: Notify,
    error: Mutex<Option<TestkitError>>,
}

impl SuspenseGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: AtomicUsize::new(0),
            notify: Notify::new(),
            error: Mutex::new(None),
        })
    }

    /// Register one unit of pending async work.
    pub fn register(self: &Arc<Self>) -> WorkGuard {
        self.pending.fetch_add(1, Ordering::AcqRel);
        WorkGuard {
            gate: Some(Arc::clone(self)),
        }
    }

    /// Spawn a tracked background task; a failure rejects the mount as a
    /// setup error.
    pub fn spawn_tracked<F>(self: &Arc<Self>, work: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let guard = self.register();
        tokio::spawn(async move {
            match work.await {
                Ok(()) => guard.complete(),
                Err(e) => guard.fail(TestkitError::Setup(e)),
            }
        });
    }

    /// Wait until every registered unit of work has finished, then surface the
    /// first recorded failure, if any.
    pub async fn settled(&self) -> Result<()> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // register interest before the check so a finish between the load
            // and the await cannot be missed
            notified.as_mut().enable();
            if self.pending.load(Ordering::Acquire) == 0 {
                break;
            }
            notified.await;
        }
        match self.error.lock().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn record_error(&self, error: TestkitError) {
        let mut slot = self.error.lock();
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    fn finish_one(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.notify.notify_waiters();
        }
    }
}

/// RAII handle for one unit of tracked work. Dropping without an explicit
/// `complete`/`fail` still releases the gate, keeping it cancel-safe.
pub struct WorkGuard {
    gate: Option<Arc<SuspenseGate>>,
}

impl WorkGuard {
    pub fn complete(mut self) {
        self.release(None);
    }

    pub fn fail(mut self, error: TestkitError) {
        self.release(Some(error));
    }

    fn release(&mut self, error: Option<TestkitError>) {
        if let Some(gate) = self.gate.take() {
            if let Some(e) = error {
                gate.record_error(e);
            }
            gate.finish_one();
        }
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.release(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    #[tokio::test]
    async fn settles_immediately_with_no_work() {
        let gate = SuspenseGate::new();
        gate.settled().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn waits_for_tracked_work() {
        let gate = SuspenseGate::new();
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        gate.spawn_tracked(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        gate.settled().await.unwrap();
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_error_wins() {
        let gate = SuspenseGate::new();
        gate.spawn_tracked(async { Err(anyhow::anyhow!("boom")) });
        gate.spawn_tracked(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Err(anyhow::anyhow!("later"))
        });
        let err = gate.settled().await.unwrap_err();
        assert!(matches!(err, TestkitError::Setup(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn dropped_guard_releases_the_gate() {
        let gate = SuspenseGate::new();
        let guard = gate.register();
        drop(guard);
        gate.settled().await.unwrap();
    }
}
