use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal result of one popup interaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PopupOutcome {
    /// User submitted non-empty text; `response` is already trimmed.
    Success { response: String },
    Empty,
    Cancelled,
    Dismissed,
    Timeout,
}

impl PopupOutcome {
    pub fn success(response: impl Into<String>) -> Self {
        Self::Success {
            response: response.into(),
        }
    }

    /// Stable lowercase name used on the wire and in conversation logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Empty => "empty",
            Self::Cancelled => "cancelled",
            Self::Dismissed => "dismissed",
            Self::Timeout => "timeout",
        }
    }

    pub fn response(&self) -> Option<&str> {
        match self {
            Self::Success { response } => Some(response.as_str()),
            _ => None,
        }
    }

    pub fn to_document(&self) -> OutcomeDocument {
        OutcomeDocument {
            kind: self.kind().to_owned(),
            response: self.response().map(str::to_owned),
        }
    }

    /// Normalize a loosely-typed document into the closed outcome set.
    /// Unknown kinds become `Dismissed`; `success` without text becomes `Empty`.
    pub fn from_document(document: OutcomeDocument) -> Self {
        match document.kind.as_str() {
            "success" => match document.response {
                Some(response) if !response.trim().is_empty() => Self::Success {
                    response: response.trim().to_owned(),
                },
                _ => Self::Empty,
            },
            "empty" => Self::Empty,
            "cancelled" => Self::Cancelled,
            "dismissed" => Self::Dismissed,
            "timeout" => Self::Timeout,
            _ => Self::Dismissed,
        }
    }
}

/// The single JSON document a worker writes to stdout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeDocument {
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OutcomeParseError {
    #[error("worker produced no output")]
    Empty,
    #[error("malformed outcome document: {0}")]
    Malformed(String),
}

/// Parse worker stdout. The whole trimmed output is tried first, then the
/// last non-empty line, so stray library output before the document is
/// tolerated.
/// Allocation: one document. Complexity: O(n), n = output bytes.
pub fn parse_outcome_document(raw: &str) -> Result<PopupOutcome, OutcomeParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(OutcomeParseError::Empty);
    }

    let whole_err = match serde_json::from_str::<OutcomeDocument>(trimmed) {
        Ok(document) => return Ok(PopupOutcome::from_document(document)),
        Err(err) => err,
    };

    let last_line = trimmed
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty());
    match last_line {
        Some(line) if line.len() != trimmed.len() => serde_json::from_str::<OutcomeDocument>(line)
            .map(PopupOutcome::from_document)
            .map_err(|err| OutcomeParseError::Malformed(err.to_string())),
        _ => Err(OutcomeParseError::Malformed(whole_err.to_string())),
    }
}
