use std::process::ExitStatus;
use std::sync::Arc;

use quietline_core::{
    parse_outcome_document, resolve_palette, OutcomeParseError, PopupConfig, PopupOutcome,
    PopupRequest, Theme, WorkerRequest,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin};
use tokio::time::{timeout, Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::PopupError;
use crate::theme_probe::detect_dark_mode;
use crate::worker::WorkerSpec;

/// Slack added to an explicit popup timeout before the driver kills the
/// worker. Covers process spawn and first render.
pub const DEFAULT_DEADLINE_GRACE: Duration = Duration::from_secs(10);
/// Hard bound for popups without an explicit timeout.
pub const DEFAULT_DEADLINE_CEILING: Duration = Duration::from_secs(600);

/// How long output pipes may stay open after the worker itself exited.
const STREAM_DRAIN_GRACE: Duration = Duration::from_millis(500);

const STDOUT_LOG_PREVIEW_CHARS: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DarkModeSource {
    /// Ask the platform each time an `auto` popup is shown.
    System,
    Fixed(bool),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    pub worker: WorkerSpec,
    pub deadline_grace: Duration,
    pub deadline_ceiling: Duration,
    pub dark_mode: DarkModeSource,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            worker: WorkerSpec::discover(),
            deadline_grace: DEFAULT_DEADLINE_GRACE,
            deadline_ceiling: DEFAULT_DEADLINE_CEILING,
            dark_mode: DarkModeSource::System,
        }
    }
}

impl DriverConfig {
    pub fn new(worker: WorkerSpec) -> Self {
        Self {
            worker,
            ..Self::default()
        }
    }

    pub fn with_worker(mut self, worker: WorkerSpec) -> Self {
        self.worker = worker;
        self
    }

    pub fn with_deadline_grace(mut self, grace: Duration) -> Self {
        self.deadline_grace = grace;
        self
    }

    pub fn with_deadline_ceiling(mut self, ceiling: Duration) -> Self {
        self.deadline_ceiling = ceiling;
        self
    }

    pub fn with_dark_mode(mut self, dark_mode: DarkModeSource) -> Self {
        self.dark_mode = dark_mode;
        self
    }

    /// Wall-clock bound for one worker: timeout + grace, or the ceiling.
    /// Allocation: none. Complexity: O(1).
    pub fn deadline_for(&self, config: &PopupConfig) -> Duration {
        match config.timeout_duration() {
            Some(popup_timeout) => popup_timeout.saturating_add(self.deadline_grace),
            None => self.deadline_ceiling,
        }
    }
}

/// Runs one popup per call in a fresh worker process.
#[derive(Clone, Debug)]
pub struct PopupDriver {
    config: Arc<DriverConfig>,
}

struct WorkerExit {
    status: ExitStatus,
    stdout: String,
}

impl PopupDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Show one popup and wait for its outcome. Every failure degrades to
    /// `Timeout` (deadline) or `Dismissed` (anything else); this never
    /// errors and never retries.
    pub async fn run(&self, request: PopupRequest) -> PopupOutcome {
        self.run_tagged(request, &new_popup_id()).await
    }

    pub(crate) async fn run_tagged(&self, request: PopupRequest, popup_id: &str) -> PopupOutcome {
        let started = Instant::now();
        match self.execute(request, popup_id).await {
            Ok(outcome) => {
                info!(
                    popup_id,
                    kind = outcome.kind(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "popup finished"
                );
                outcome
            }
            Err(err @ PopupError::DeadlineExceeded(_)) => {
                warn!(popup_id, error = %err, "popup worker killed at deadline");
                PopupOutcome::Timeout
            }
            Err(err) => {
                error!(popup_id, error = %err, "popup worker failed");
                PopupOutcome::Dismissed
            }
        }
    }

    async fn execute(
        &self,
        request: PopupRequest,
        popup_id: &str,
    ) -> Result<PopupOutcome, PopupError> {
        let deadline = self.config.deadline_for(&request.config);
        let colors = resolve_palette(
            request.config.theme,
            self.prefers_dark(request.config.theme).await,
        );
        let payload = encode_request(WorkerRequest { request, colors })?;

        let program = self.config.worker.program.to_string_lossy().to_string();
        debug!(popup_id, program = %program, ?deadline, "spawning popup worker");
        let mut child = self
            .config
            .worker
            .command()
            .spawn()
            .map_err(|err| PopupError::Spawn {
                program,
                message: err.to_string(),
            })?;

        let waited = timeout(deadline, exchange(&mut child, &payload, popup_id)).await;
        match waited {
            Ok(exit) => {
                let exit = exit?;
                if !exit.status.success() {
                    return Err(PopupError::WorkerExit(exit.status.to_string()));
                }
                parse_outcome_document(&exit.stdout).map_err(|err| match err {
                    OutcomeParseError::Empty => PopupError::EmptyOutput,
                    OutcomeParseError::Malformed(message) => PopupError::MalformedOutput(message),
                })
            }
            Err(_) => {
                terminate(&mut child, popup_id).await;
                Err(PopupError::DeadlineExceeded(deadline))
            }
        }
    }

    async fn prefers_dark(&self, theme: Theme) -> bool {
        match (theme, self.config.dark_mode) {
            (_, DarkModeSource::Fixed(prefers_dark)) => prefers_dark,
            (Theme::Auto, DarkModeSource::System) => detect_dark_mode().await,
            // Explicit themes ignore the probe result.
            (Theme::Light | Theme::Dark, DarkModeSource::System) => true,
        }
    }
}

pub(crate) fn new_popup_id() -> String {
    format!("popup_{}", Uuid::new_v4())
}

fn encode_request(request: WorkerRequest) -> Result<Vec<u8>, PopupError> {
    let mut payload =
        serde_json::to_vec(&request).map_err(|err| PopupError::Encode(err.to_string()))?;
    payload.push(b'\n');
    Ok(payload)
}

/// Feed the request, drain both output streams, and wait for exit, all
/// concurrently so a chatty worker can never stall on a full pipe. Once the
/// worker exits, the streams get `STREAM_DRAIN_GRACE` to reach EOF; a
/// descendant still holding a pipe does not extend the call.
async fn exchange(
    child: &mut Child,
    payload: &[u8],
    popup_id: &str,
) -> Result<WorkerExit, PopupError> {
    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| PopupError::Io("failed to acquire worker stdin pipe".to_owned()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| PopupError::Io("failed to acquire worker stdout pipe".to_owned()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| PopupError::Io("failed to acquire worker stderr pipe".to_owned()))?;

    let mut stdout_bytes = Vec::with_capacity(256);
    let mut stderr_bytes = Vec::new();
    let (written, status, drained) = {
        let process = async { tokio::join!(write_request(stdin, payload), child.wait()) };
        let streams = async {
            tokio::join!(
                read_stream(stdout, &mut stdout_bytes),
                read_stream(stderr, &mut stderr_bytes),
            )
        };
        tokio::pin!(process);
        tokio::pin!(streams);

        let first = tokio::select! {
            exited = &mut process => Finished::Exited(exited),
            drained = &mut streams => Finished::Drained(drained),
        };
        match first {
            Finished::Exited((written, status)) => {
                let drained = timeout(STREAM_DRAIN_GRACE, streams).await.ok();
                (written, status, drained)
            }
            Finished::Drained(drained) => {
                let (written, status) = process.await;
                (written, status, Some(drained))
            }
        }
    };

    if let Err(err) = written {
        debug!(popup_id, error = %err, "writing popup request failed");
    }
    let stdout_read = match drained {
        Some((stdout_read, stderr_read)) => {
            if let Err(err) = stderr_read {
                debug!(popup_id, error = %err, "reading worker stderr failed");
            }
            stdout_read
        }
        None => {
            debug!(popup_id, "worker output still open after exit");
            Ok(())
        }
    };
    let stderr = String::from_utf8_lossy(&stderr_bytes);
    if !stderr.trim().is_empty() {
        debug!(popup_id, stderr = %stderr.trim_end(), "worker stderr");
    }

    let status = status.map_err(|err| PopupError::Io(format!("worker wait failed: {err}")))?;
    stdout_read.map_err(|err| PopupError::Io(format!("reading worker stdout failed: {err}")))?;
    let stdout = String::from_utf8_lossy(&stdout_bytes).into_owned();
    debug!(
        popup_id,
        exit = %status,
        stdout = %preview(&stdout),
        "worker exited"
    );
    Ok(WorkerExit { status, stdout })
}

enum Finished<E, D> {
    Exited(E),
    Drained(D),
}

async fn write_request(mut stdin: ChildStdin, payload: &[u8]) -> std::io::Result<()> {
    if let Err(err) = stdin.write_all(payload).await {
        if err.kind() == std::io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err);
    }

    if let Err(err) = stdin.flush().await {
        if err.kind() == std::io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err);
    }

    // Dropping stdin closes the pipe so the worker sees EOF.
    Ok(())
}

/// Append everything `stream` yields to `bytes`. Reads chunk by chunk so a
/// cancelled call keeps what already arrived.
async fn read_stream<R: AsyncRead + Unpin>(
    mut stream: R,
    bytes: &mut Vec<u8>,
) -> std::io::Result<()> {
    let mut chunk = [0_u8; 4096];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        bytes.extend_from_slice(&chunk[..read]);
    }
}

/// Force-kill and reap a worker that outlived its deadline.
async fn terminate(child: &mut Child, popup_id: &str) {
    if let Err(err) = child.kill().await {
        warn!(popup_id, error = %err, "failed to kill popup worker");
    }
}

fn preview(stdout: &str) -> String {
    stdout.chars().take(STDOUT_LOG_PREVIEW_CHARS).collect()
}
