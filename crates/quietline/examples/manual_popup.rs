//! Opens real popups for a manual check of the worker window.
//!
//! Build the worker first so it sits next to this example or on `PATH`, or
//! point `QUIETLINE_WORKER_BIN` at it:
//!
//! ```text
//! cargo build -p quietline_worker
//! QUIETLINE_WORKER_BIN=target/debug/quietline-worker \
//!     cargo run -p quietline --example manual_popup
//! ```

use std::sync::Arc;

use quietline::{JsonlConversationLog, Notifier, NotifyArgs, Theme};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("QUIETLINE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let log_path = std::env::temp_dir().join("quietline-manual-popup.jsonl");
    let mut notifier = Notifier::system();
    match JsonlConversationLog::open(&log_path).await {
        Ok(log) => notifier = notifier.with_store(Arc::new(log)),
        Err(err) => eprintln!("history disabled: {err}"),
    }

    let steps = [
        NotifyArgs::new(
            "Hi! **Reply** with anything, or try Shift+Enter for a new line.\n\n```sh\necho done\n```",
        )
        .with_chime(true),
        NotifyArgs::new("Status update: the build finished. Dismiss when ready.")
            .with_wait_for_response(false)
            .with_theme(Theme::Dark),
        NotifyArgs::new("This one closes by itself in 5 seconds.")
            .with_timeout(5.0)
            .with_theme(Theme::Light),
    ];

    for args in steps {
        println!("{}", notifier.notify(args).await);
    }
    println!("history: {}", log_path.display());
}
