use std::sync::Arc;

use quietline_core::{PopupConfig, PopupOutcome, PopupRequest, DEFAULT_HISTORY_LIMIT};
use quietline_runtime::PopupBridge;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::args::NotifyArgs;
use crate::chime::{Chime, ChimePlayer, CommandChime};
use crate::display::{DisplayProbe, EnvDisplayProbe};
use crate::errors::NotifyError;
use crate::launcher::PopupLauncher;
use crate::store::{ConversationStore, NoConversationStore, NotifyExchange};

const MESSAGE_PREVIEW_CHARS: usize = 50;

/// Defaults applied to every popup the notifier opens.
#[derive(Clone, Debug, PartialEq)]
pub struct NotifierConfig {
    /// Base window config; tool arguments override title, timeout, theme,
    /// history and chime settings on top of it.
    pub popup: PopupConfig,
    /// How many history entries to fetch from the conversation store.
    pub history_fetch_limit: usize,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            popup: PopupConfig::default(),
            history_fetch_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl NotifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_popup_defaults(mut self, popup: PopupConfig) -> Self {
        self.popup = popup;
        self
    }

    pub fn with_history_fetch_limit(mut self, limit: usize) -> Self {
        self.history_fetch_limit = limit;
        self
    }
}

/// The `notify` tool: validates a request, gathers history, shows the popup
/// and turns the outcome into the string handed back to the assistant.
#[derive(Clone)]
pub struct Notifier {
    config: NotifierConfig,
    launcher: Arc<dyn PopupLauncher>,
    display: Arc<dyn DisplayProbe>,
    store: Arc<dyn ConversationStore>,
    chime: Arc<dyn ChimePlayer>,
}

impl Notifier {
    /// Notifier over `launcher` with environment headless detection, system
    /// chimes and no conversation store.
    pub fn new(launcher: Arc<dyn PopupLauncher>) -> Self {
        Self {
            config: NotifierConfig::default(),
            launcher,
            display: Arc::new(EnvDisplayProbe),
            store: Arc::new(NoConversationStore),
            chime: Arc::new(CommandChime::system()),
        }
    }

    /// Notifier over the process-wide popup bridge.
    pub fn system() -> Self {
        Self::new(Arc::new(PopupBridge::global().clone()))
    }

    pub fn with_config(mut self, config: NotifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_display_probe(mut self, display: Arc<dyn DisplayProbe>) -> Self {
        self.display = display;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_chime_player(mut self, chime: Arc<dyn ChimePlayer>) -> Self {
        self.chime = chime;
        self
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Run one notify call. Rejections come back as `Error: ...` strings;
    /// this never fails otherwise.
    pub async fn notify(&self, args: NotifyArgs) -> String {
        match self.try_notify(&args).await {
            Ok(output) => output,
            Err(err) => {
                info!(error = %err, "notify request rejected");
                err.to_tool_output()
            }
        }
    }

    /// `notify` over raw JSON tool arguments.
    pub async fn notify_value(&self, args: Value) -> String {
        match serde_json::from_value::<NotifyArgs>(args) {
            Ok(args) => self.notify(args).await,
            Err(err) => NotifyError::InvalidArguments(err.to_string()).to_tool_output(),
        }
    }

    async fn try_notify(&self, args: &NotifyArgs) -> Result<String, NotifyError> {
        info!(message = %preview(&args.message), "notify tool called");
        args.validate()?;
        if self.display.is_headless() {
            return Err(NotifyError::Headless);
        }

        let history = if args.show_history {
            match self
                .store
                .recent_exchanges(self.config.history_fetch_limit)
                .await
            {
                Ok(history) => history,
                Err(err) => {
                    warn!(error = %err, "failed to get conversation history");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        if args.chime_enabled {
            self.play_chime(Chime::Start).await;
        }

        let config = args.popup_config(&self.config.popup);
        let request = PopupRequest::new(args.message.clone(), config)
            .with_history(history)
            .with_wait_for_response(args.wait_for_response);
        let outcome = self.launcher.launch(request).await;
        info!(kind = outcome.kind(), "popup outcome received");

        let exchange = NotifyExchange::new(&args.message, outcome.response(), outcome.kind());
        if let Err(err) = self.store.log_notify_exchange(&exchange).await {
            warn!(error = %err, "failed to log notify exchange");
        }

        if args.chime_enabled && outcome.response().is_some_and(|text| !text.is_empty()) {
            self.play_chime(Chime::End).await;
        }

        Ok(format_outcome(
            &outcome,
            args.wait_for_response,
            &self.timeout_label(args),
        ))
    }

    async fn play_chime(&self, chime: Chime) {
        if let Err(err) = self.chime.play(chime).await {
            debug!(?chime, error = %err, "failed to play chime");
        }
    }

    /// Seconds quoted in the timeout message: the requested timeout, or the
    /// launcher's ceiling when none was requested.
    fn timeout_label(&self, args: &NotifyArgs) -> String {
        match args.timeout {
            Some(timeout) => format_secs(timeout),
            None => format_secs(self.launcher.timeout_ceiling().as_secs_f64()),
        }
    }
}

/// The tool output for one outcome.
pub fn format_outcome(
    outcome: &PopupOutcome,
    wait_for_response: bool,
    timeout_label: &str,
) -> String {
    match outcome {
        PopupOutcome::Success { response } if wait_for_response => {
            format!("User response: {response}")
        }
        PopupOutcome::Success { .. } => "✓ Message displayed successfully".to_owned(),
        PopupOutcome::Cancelled => "User cancelled the popup".to_owned(),
        PopupOutcome::Dismissed => "User dismissed the popup".to_owned(),
        PopupOutcome::Timeout => format!("No response within {timeout_label}s timeout"),
        PopupOutcome::Empty => "User submitted empty response".to_owned(),
    }
}

/// `30.0` prints as `30`, `7.5` as `7.5`.
fn format_secs(secs: f64) -> String {
    format!("{secs}")
}

fn preview(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(MESSAGE_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
