//! Chat-style popup tool for assistants.
//! Default path: build a [`Notifier`] (or [`NotifyTool`]) and call `notify`.
//! Use `quietline::runtime` to drive popups directly.

mod args;
mod chime;
mod display;
mod errors;
mod launcher;
mod notifier;
mod prompt;
mod store;
mod tool;

pub use args::NotifyArgs;
pub use chime::{Chime, ChimeCommand, ChimeFuture, ChimePlayer, CommandChime};
pub use display::{headless_from_env, DisplayProbe, EnvDisplayProbe, Platform};
pub use errors::{ChimeError, NotifyError, StoreError};
pub use launcher::{LaunchFuture, PopupLauncher};
pub use notifier::{format_outcome, Notifier, NotifierConfig};
pub use prompt::{NOTIFY_PROMPT, NOTIFY_PROMPT_DESCRIPTION, NOTIFY_PROMPT_NAME};
pub use quietline_core::{
    HistoryEntry, PopupConfig, PopupOutcome, PopupRequest, Role, Theme, ThemeColors,
};
pub use quietline_runtime::{DarkModeSource, DriverConfig, PopupBridge, WorkerSpec};
pub use store::{
    ConversationStore, JsonlConversationLog, NoConversationStore, NotifyExchange, StoreFuture,
};
pub use tool::{NotifyTool, NOTIFY_TOOL_DESCRIPTION, NOTIFY_TOOL_NAME};

pub use quietline_runtime as runtime;
