//! `quietline-worker`: renders one popup and reports how it ended.
//!
//! Reads a `WorkerRequest` JSON document from stdin, runs the window until
//! the user (or the timer) closes it, then prints exactly one outcome
//! document on stdout. Diagnostics go to stderr so stdout stays clean.

mod app;
mod errors;
mod markdown;
mod palette;

use std::io::{Read, Write};
use std::process::ExitCode;

use quietline_core::{PopupOutcome, WorkerRequest};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::errors::WorkerError;

/// Filter directive for worker logs, e.g. `QUIETLINE_LOG=debug`.
const LOG_ENV: &str = "QUIETLINE_LOG";
const EXIT_GUI_FAILURE: u8 = 1;
const EXIT_BAD_REQUEST: u8 = 2;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let request = match read_request(std::io::stdin().lock()) {
        Ok(request) => request,
        Err(err) => {
            error!(error = %err, "rejecting popup request");
            return ExitCode::from(EXIT_BAD_REQUEST);
        }
    };

    let outcome = match app::run(request) {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "popup window failed");
            return ExitCode::from(EXIT_GUI_FAILURE);
        }
    };
    info!(kind = outcome.kind(), "popup finished");

    match write_outcome(std::io::stdout().lock(), &outcome) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "could not report popup outcome");
            ExitCode::from(EXIT_GUI_FAILURE)
        }
    }
}

fn read_request(mut reader: impl Read) -> Result<WorkerRequest, WorkerError> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(WorkerError::ReadRequest)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_outcome(mut writer: impl Write, outcome: &PopupOutcome) -> Result<(), WorkerError> {
    serde_json::to_writer(&mut writer, &outcome.to_document())
        .map_err(|err| WorkerError::WriteOutcome(err.into()))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(WorkerError::WriteOutcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quietline_core::{resolve_palette, HistoryEntry, PopupConfig, PopupRequest, Theme};

    #[test]
    fn reads_a_full_request() {
        let request = WorkerRequest {
            request: PopupRequest::new("Ready?", PopupConfig::new().with_timeout_secs(30.0))
                .with_history(vec![HistoryEntry::user("hi")]),
            colors: resolve_palette(Theme::Dark, false),
        };
        let raw = serde_json::to_vec(&request).expect("encode");

        let decoded = read_request(raw.as_slice()).expect("decode");
        assert_eq!(decoded, request);
    }

    #[test]
    fn rejects_garbage_and_empty_input() {
        assert!(matches!(
            read_request(&b"not json"[..]),
            Err(WorkerError::DecodeRequest(_))
        ));
        assert!(matches!(
            read_request(&b""[..]),
            Err(WorkerError::DecodeRequest(_))
        ));
    }

    #[test]
    fn writes_one_document_per_outcome() {
        let mut out = Vec::new();
        write_outcome(&mut out, &PopupOutcome::success("on my way")).expect("write");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "{\"kind\":\"success\",\"response\":\"on my way\"}\n"
        );

        let mut out = Vec::new();
        write_outcome(&mut out, &PopupOutcome::Timeout).expect("write");
        assert_eq!(String::from_utf8(out).expect("utf8"), "{\"kind\":\"timeout\"}\n");
    }
}
