use quietline_core::{DEFAULT_POPUP_TITLE, MAX_MESSAGE_CHARS, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};
use serde_json::{json, Value};

use crate::notifier::Notifier;

pub const NOTIFY_TOOL_NAME: &str = "notify";

pub const NOTIFY_TOOL_DESCRIPTION: &str = "\
Display a message in a popup window and optionally wait for the user's text response.

Use this for silent, text-based conversation instead of voice.

RESPONSE FORMATS:
- Success with response: \"User response: <text>\"
- Success without response (wait_for_response=false): \"✓ Message displayed successfully\"
- User cancelled: \"User cancelled the popup\"
- User dismissed: \"User dismissed the popup\"
- Timeout: \"No response within <timeout>s timeout\"
- Empty input: \"User submitted empty response\"
- Headless error: \"Error: Cannot display popup - no display available\"

USAGE:
- Silent conversation in meetings or quiet environments
- Accessibility alternative to voice interaction
- Quick status notifications with wait_for_response=false";

/// Host-facing description of the `notify` tool: metadata plus a JSON entry
/// point over a [`Notifier`].
pub struct NotifyTool {
    notifier: Notifier,
}

impl NotifyTool {
    pub fn new(notifier: Notifier) -> Self {
        Self { notifier }
    }

    pub fn name(&self) -> &str {
        NOTIFY_TOOL_NAME
    }

    pub fn description(&self) -> &str {
        NOTIFY_TOOL_DESCRIPTION
    }

    /// JSON Schema for the tool's arguments.
    pub fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message to display in the popup",
                    "minLength": 1,
                    "maxLength": MAX_MESSAGE_CHARS,
                },
                "wait_for_response": {
                    "type": "boolean",
                    "description": "Whether to wait for user input",
                    "default": true,
                },
                "timeout": {
                    "type": "number",
                    "description": "Seconds to wait for a response",
                    "minimum": MIN_TIMEOUT_SECS,
                    "maximum": MAX_TIMEOUT_SECS,
                },
                "title": {
                    "type": "string",
                    "description": "Window title for the popup",
                    "default": DEFAULT_POPUP_TITLE,
                },
                "show_history": {
                    "type": "boolean",
                    "description": "Whether to show recent conversation history",
                    "default": true,
                },
                "chime_enabled": {
                    "type": "boolean",
                    "description": "Whether to play sound feedback",
                    "default": false,
                },
                "theme": {
                    "type": "string",
                    "enum": ["auto", "light", "dark"],
                    "description": "Color theme for the popup",
                    "default": "auto",
                },
            },
            "required": ["message"],
        })
    }

    /// Run the tool from raw host arguments.
    pub async fn call(&self, args: Value) -> String {
        self.notifier.notify_value(args).await
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
