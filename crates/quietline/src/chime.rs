use std::future::Future;
use std::io::ErrorKind;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::debug;

use crate::errors::ChimeError;

pub type ChimeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ChimeError>> + Send + 'a>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chime {
    /// Played before a popup opens.
    Start,
    /// Played after the user replied.
    End,
}

pub trait ChimePlayer: Send + Sync + 'static {
    fn play<'a>(&'a self, chime: Chime) -> ChimeFuture<'a>;
}

/// One external command that plays a sound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChimeCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ChimeCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

const DEFAULT_CHIME_TIMEOUT: Duration = Duration::from_secs(3);
const FREEDESKTOP_SOUNDS: &str = "/usr/share/sounds/freedesktop/stereo";

/// Plays chimes by running the first sound player that can be started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandChime {
    start: Vec<ChimeCommand>,
    end: Vec<ChimeCommand>,
    timeout: Duration,
}

impl CommandChime {
    pub fn new(start: Vec<ChimeCommand>, end: Vec<ChimeCommand>) -> Self {
        Self {
            start,
            end,
            timeout: DEFAULT_CHIME_TIMEOUT,
        }
    }

    /// Platform sound players: `afplay` on macOS, `paplay` then `pw-play` on
    /// Linux. Other platforms get no candidates.
    pub fn system() -> Self {
        if cfg!(target_os = "macos") {
            Self::new(
                vec![ChimeCommand::new("afplay").with_arg("/System/Library/Sounds/Tink.aiff")],
                vec![ChimeCommand::new("afplay").with_arg("/System/Library/Sounds/Pop.aiff")],
            )
        } else if cfg!(target_os = "linux") {
            Self::new(
                freedesktop_players("message.oga"),
                freedesktop_players("complete.oga"),
            )
        } else {
            Self::new(Vec::new(), Vec::new())
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn candidates(&self, chime: Chime) -> &[ChimeCommand] {
        match chime {
            Chime::Start => &self.start,
            Chime::End => &self.end,
        }
    }

    async fn wait(&self, command: &ChimeCommand, mut child: Child) -> Result<(), ChimeError> {
        let status = tokio::time::timeout(self.timeout, child.wait())
            .await
            .map_err(|_| ChimeError::TimedOut {
                program: command.program.clone(),
            })?
            .map_err(|err| spawn_error(command, &err))?;
        if status.success() {
            Ok(())
        } else {
            Err(ChimeError::Failed {
                program: command.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

impl Default for CommandChime {
    fn default() -> Self {
        Self::system()
    }
}

impl ChimePlayer for CommandChime {
    /// Programs that are not installed fall through to the next candidate;
    /// any other failure is returned as is.
    fn play<'a>(&'a self, chime: Chime) -> ChimeFuture<'a> {
        Box::pin(async move {
            let mut last_error = ChimeError::Unavailable;
            for command in self.candidates(chime) {
                let child = match spawn(command) {
                    Ok(child) => child,
                    Err(err) if err.kind() == ErrorKind::NotFound => {
                        last_error = spawn_error(command, &err);
                        continue;
                    }
                    Err(err) => return Err(spawn_error(command, &err)),
                };
                self.wait(command, child).await?;
                debug!(program = %command.program, ?chime, "chime played");
                return Ok(());
            }
            Err(last_error)
        })
    }
}

fn spawn(command: &ChimeCommand) -> std::io::Result<Child> {
    Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
}

fn spawn_error(command: &ChimeCommand, err: &std::io::Error) -> ChimeError {
    ChimeError::Spawn {
        program: command.program.clone(),
        message: err.to_string(),
    }
}

fn freedesktop_players(sound: &str) -> Vec<ChimeCommand> {
    let path = format!("{FREEDESKTOP_SOUNDS}/{sound}");
    vec![
        ChimeCommand::new("paplay").with_arg(path.clone()),
        ChimeCommand::new("pw-play").with_arg(path),
    ]
}
