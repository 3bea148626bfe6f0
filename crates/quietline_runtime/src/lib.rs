//! Runs quietline popups in isolated worker processes.
//! `PopupBridge` is the entry point for async callers; `PopupDriver` is the
//! single-shot process driver underneath it.

pub mod bridge;
pub mod driver;
pub mod errors;
pub mod theme_probe;
pub mod worker;

pub use bridge::{PopupBridge, PopupHandle, PopupRegistry};
pub use driver::{
    DarkModeSource, DriverConfig, PopupDriver, DEFAULT_DEADLINE_CEILING, DEFAULT_DEADLINE_GRACE,
};
pub use errors::PopupError;
pub use quietline_core::{
    HistoryEntry, PopupConfig, PopupOutcome, PopupRequest, Role, Theme, ThemeColors,
};
pub use theme_probe::detect_dark_mode;
pub use worker::{WorkerSpec, DEFAULT_WORKER_BIN, WORKER_BIN_ENV};
