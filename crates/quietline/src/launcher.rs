use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use quietline_core::{PopupOutcome, PopupRequest};
use quietline_runtime::PopupBridge;

pub type LaunchFuture<'a> = Pin<Box<dyn Future<Output = PopupOutcome> + Send + 'a>>;

/// Shows popups on behalf of the notifier. Launchers never fail: every
/// failure is already folded into an outcome.
pub trait PopupLauncher: Send + Sync + 'static {
    fn launch<'a>(&'a self, request: PopupRequest) -> LaunchFuture<'a>;

    /// Bound applied to popups without an explicit timeout.
    fn timeout_ceiling(&self) -> Duration;
}

impl PopupLauncher for PopupBridge {
    fn launch<'a>(&'a self, request: PopupRequest) -> LaunchFuture<'a> {
        Box::pin(self.show(request))
    }

    fn timeout_ceiling(&self) -> Duration {
        self.driver().config().deadline_ceiling
    }
}
