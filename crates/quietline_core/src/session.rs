use crate::outcome::PopupOutcome;

/// User or timer event fed into a [`PopupSession`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gesture {
    /// Primary send action or Enter without modifiers, carrying the raw input.
    Submit(String),
    /// Modifier+Enter: a line break inside the input, never terminal.
    NewLine,
    /// Escape key.
    Cancel,
    /// Window close control or the Dismiss button.
    Close,
    TimerFired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed(PopupOutcome),
}

/// Worker-side state machine for one popup. The first terminal gesture wins;
/// everything after it is ignored.
#[derive(Clone, Debug)]
pub struct PopupSession {
    wait_for_response: bool,
    state: SessionState,
}

impl PopupSession {
    pub fn new(wait_for_response: bool) -> Self {
        Self {
            wait_for_response,
            state: SessionState::Open,
        }
    }

    pub fn wait_for_response(&self) -> bool {
        self.wait_for_response
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open)
    }

    pub fn outcome(&self) -> Option<&PopupOutcome> {
        match &self.state {
            SessionState::Open => None,
            SessionState::Closed(outcome) => Some(outcome),
        }
    }

    /// Apply one gesture. Returns the outcome only for the transition that
    /// closed the session.
    pub fn handle(&mut self, gesture: Gesture) -> Option<PopupOutcome> {
        if !self.is_open() {
            return None;
        }

        let outcome = match gesture {
            Gesture::NewLine => return None,
            Gesture::Submit(text) if self.wait_for_response => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    PopupOutcome::Empty
                } else {
                    PopupOutcome::success(trimmed)
                }
            }
            Gesture::Cancel if self.wait_for_response => PopupOutcome::Cancelled,
            // Notification-only popups have no input; Escape dismisses them.
            Gesture::Cancel => PopupOutcome::Dismissed,
            Gesture::Submit(_) => return None,
            Gesture::Close => PopupOutcome::Dismissed,
            Gesture::TimerFired => PopupOutcome::Timeout,
        };

        self.state = SessionState::Closed(outcome.clone());
        Some(outcome)
    }

    /// Consume the session, yielding its outcome. A session that never closed
    /// (the event loop ended underneath it) counts as dismissed.
    pub fn into_outcome(self) -> PopupOutcome {
        match self.state {
            SessionState::Open => PopupOutcome::Dismissed,
            SessionState::Closed(outcome) => outcome,
        }
    }
}
