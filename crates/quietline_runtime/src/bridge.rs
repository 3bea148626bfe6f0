use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use quietline_core::{PopupOutcome, PopupRequest};
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{error, info};

use crate::driver::{new_popup_id, DriverConfig, PopupDriver};

/// One in-flight popup. Clones share the same single-delivery slot.
#[derive(Clone, Debug)]
pub struct PopupHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    id: String,
    resolver: Mutex<Option<oneshot::Sender<PopupOutcome>>>,
    worker_task: Mutex<Option<AbortHandle>>,
}

impl PopupHandle {
    pub fn new() -> (Self, oneshot::Receiver<PopupOutcome>) {
        let (tx, rx) = oneshot::channel();
        let handle = Self {
            inner: Arc::new(HandleInner {
                id: new_popup_id(),
                resolver: Mutex::new(Some(tx)),
                worker_task: Mutex::new(None),
            }),
        };
        (handle, rx)
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Deliver `outcome` unless another outcome already won.
    /// Returns whether this call was the one that resolved the handle.
    pub fn resolve(&self, outcome: PopupOutcome) -> bool {
        let Some(tx) = lock_unpoisoned(&self.inner.resolver).take() else {
            return false;
        };
        // A dropped receiver still counts as resolved: nobody else may deliver.
        let _ = tx.send(outcome);
        true
    }

    pub fn is_resolved(&self) -> bool {
        lock_unpoisoned(&self.inner.resolver).is_none()
    }

    fn attach_task(&self, task: AbortHandle) {
        lock_unpoisoned(&self.inner.worker_task).replace(task);
        // Preempted between spawn and attach: the preempter found no task.
        if self.is_resolved() {
            self.abort_task();
        }
    }

    /// Abort the driver task, which drops and thereby kills its worker.
    fn abort_task(&self) {
        if let Some(task) = lock_unpoisoned(&self.inner.worker_task).take() {
            task.abort();
        }
    }
}

/// Process-wide record of the popup that is currently on screen.
#[derive(Debug, Default)]
pub struct PopupRegistry {
    current: Mutex<Option<PopupHandle>>,
}

impl PopupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `handle` current and return the handle it displaced, if any.
    /// The lock covers only the swap.
    pub fn try_register_and_preempt(&self, handle: PopupHandle) -> Option<PopupHandle> {
        let previous = lock_unpoisoned(&self.current).replace(handle.clone());
        previous.filter(|previous| previous.id() != handle.id())
    }

    /// Forget `id` if it is still current. Returns whether it was.
    pub fn clear_if_current(&self, id: &str) -> bool {
        let mut current = lock_unpoisoned(&self.current);
        if current.as_ref().is_some_and(|handle| handle.id() == id) {
            current.take();
            return true;
        }
        false
    }

    pub fn current_id(&self) -> Option<String> {
        lock_unpoisoned(&self.current)
            .as_ref()
            .map(|handle| handle.id().to_owned())
    }
}

/// Async entry point: runs the driver off the caller's task and keeps at
/// most one popup current.
#[derive(Clone, Debug)]
pub struct PopupBridge {
    driver: PopupDriver,
    registry: Arc<PopupRegistry>,
}

static GLOBAL_BRIDGE: OnceLock<PopupBridge> = OnceLock::new();

impl PopupBridge {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            driver: PopupDriver::new(config),
            registry: Arc::new(PopupRegistry::new()),
        }
    }

    /// The process-wide bridge, built from `DriverConfig::default()` on first
    /// use.
    pub fn global() -> &'static PopupBridge {
        GLOBAL_BRIDGE.get_or_init(|| Self::new(DriverConfig::default()))
    }

    pub fn driver(&self) -> &PopupDriver {
        &self.driver
    }

    pub fn registry(&self) -> &PopupRegistry {
        &self.registry
    }

    /// Show one popup and await its outcome. A popup that is still current
    /// when this is called resolves to `Cancelled` before the new worker is
    /// spawned.
    pub async fn show(&self, request: PopupRequest) -> PopupOutcome {
        let (handle, outcome_rx) = PopupHandle::new();

        if let Some(previous) = self.registry.try_register_and_preempt(handle.clone()) {
            info!(
                popup_id = previous.id(),
                superseded_by = handle.id(),
                "preempting active popup"
            );
            previous.resolve(PopupOutcome::Cancelled);
            previous.abort_task();
        }

        let driver = self.driver.clone();
        let registry = Arc::clone(&self.registry);
        let task_handle = handle.clone();
        let task = tokio::spawn(async move {
            let guard = DriverTaskGuard {
                handle: task_handle,
                registry,
            };
            let outcome = driver.run_tagged(request, guard.handle.id()).await;
            guard.handle.resolve(outcome);
        });
        handle.attach_task(task.abort_handle());

        let mut pending = PendingPopup {
            handle: &handle,
            registry: &self.registry,
            armed: true,
        };
        let outcome = match outcome_rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(popup_id = handle.id(), "popup task ended without an outcome");
                PopupOutcome::Dismissed
            }
        };
        pending.armed = false;
        outcome
    }
}

/// Owned by the driver task. Resolves `Dismissed` if the task unwinds or is
/// dropped before delivering, and always releases the registry slot.
struct DriverTaskGuard {
    handle: PopupHandle,
    registry: Arc<PopupRegistry>,
}

impl Drop for DriverTaskGuard {
    fn drop(&mut self) {
        if self.handle.resolve(PopupOutcome::Dismissed) {
            error!(popup_id = self.handle.id(), "popup task ended without an outcome");
        }
        self.registry.clear_if_current(self.handle.id());
    }
}

/// Tears the popup down if the awaiting caller goes away first.
struct PendingPopup<'a> {
    handle: &'a PopupHandle,
    registry: &'a PopupRegistry,
    armed: bool,
}

impl Drop for PendingPopup<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.handle.resolve(PopupOutcome::Cancelled);
        self.handle.abort_task();
        self.registry.clear_if_current(self.handle.id());
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
