//! Cancellable background generation handles.
//!
//! Cancellation is cooperative: loops poll their flag before each step, so a
//! superseded run stops without further decodes but an in-flight decode may
//! still land. Eviction against the recorded center corrects any stale append.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// One run of a background generation loop.
struct GenerationTask {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl GenerationTask {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Cloneable view of a task's cancel flag, polled by generation loops.
#[derive(Clone)]
pub(crate) struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Slot holding at most one live task per cache kind. Starting a new run swaps
/// and cancels the previous one under the slot lock, so two generations of the
/// same kind never run uncancelled at the same time.
pub(crate) struct TaskSlot {
    current: Mutex<Option<GenerationTask>>,
}

impl TaskSlot {
    pub(crate) fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// Cancel the live task (if any) and install the one `spawn` produces.
    /// `spawn` receives the cancel flag the new loop must poll.
    pub(crate) fn restart<F>(&self, spawn: F)
    where
        F: FnOnce(CancelFlag) -> JoinHandle<()>,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = CancelFlag(Arc::clone(&cancelled));
        let mut guard = self.current.lock();
        if let Some(prev) = guard.take() {
            prev.cancel();
        }
        let handle = spawn(flag);
        *guard = Some(GenerationTask { cancelled, handle });
    }

    /// Cancel and drop the live task without starting a new one.
    pub(crate) fn cancel(&self) {
        let mut guard = self.current.lock();
        if let Some(task) = guard.take() {
            task.cancel();
        }
    }

    /// True while the installed task is still executing.
    pub(crate) fn is_running(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::TaskSlot;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn restart_cancels_the_previous_run() {
        let slot = TaskSlot::new();
        let (first_tx, first_rx) = tokio::sync::oneshot::channel::<bool>();

        slot.restart(move |cancel| {
            tokio::spawn(async move {
                for _ in 0..200 {
                    if cancel.is_cancelled() {
                        let _ = first_tx.send(true);
                        return;
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                let _ = first_tx.send(false);
            })
        });

        slot.restart(|_cancel| tokio::spawn(async {}));
        let saw_cancel = first_rx.await.expect("first task should report");
        assert!(saw_cancel, "superseded task should observe its cancel flag");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn is_running_reflects_task_lifetime() {
        let slot = TaskSlot::new();
        assert!(!slot.is_running());

        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        slot.restart(move |_cancel| {
            tokio::spawn(async move {
                let _ = release_rx.await;
            })
        });
        assert!(slot.is_running());

        let _ = release_tx.send(());
        for _ in 0..100 {
            if !slot.is_running() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task should finish after release");
    }
}
