use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

pub const DEFAULT_WORKER_BIN: &str = "quietline-worker";
pub const WORKER_BIN_ENV: &str = "QUIETLINE_WORKER_BIN";

/// How to launch the GUI worker process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub cwd: Option<PathBuf>,
}

impl WorkerSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
        }
    }

    /// Resolve the worker binary from env, then next to the running
    /// executable (or one level up from cargo's `deps`/`examples`), then
    /// `PATH`.
    /// Side effects: reads process env and current executable path.
    pub fn discover() -> Self {
        let env_value = std::env::var(WORKER_BIN_ENV).ok();
        if let Some(candidate) = env_value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            return Self::new(candidate);
        }

        let sibling = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .and_then(|dir| sibling_worker(&dir).or_else(|| cargo_target_worker(&dir)));
        match sibling {
            Some(path) => Self::new(path),
            None => Self::new(DEFAULT_WORKER_BIN),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Command with all three standard streams piped. The child is killed if
    /// its handle is dropped before it exits.
    pub(crate) fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        for (key, value) in &self.env {
            command.env(key, value);
        }
        command
    }
}

pub(crate) fn sibling_worker(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(format!("{DEFAULT_WORKER_BIN}{}", std::env::consts::EXE_SUFFIX));
    candidate.is_file().then_some(candidate)
}

fn cargo_target_worker(dir: &Path) -> Option<PathBuf> {
    let name = dir.file_name()?.to_str()?;
    if name != "deps" && name != "examples" {
        return None;
    }
    sibling_worker(dir.parent()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_args_env_and_cwd() {
        let spec = WorkerSpec::new("sh")
            .with_arg("-c")
            .with_arg("cat")
            .with_env("QUIETLINE_LOG", "debug")
            .with_cwd("/tmp");
        assert_eq!(spec.program, PathBuf::from("sh"));
        assert_eq!(spec.args, vec!["-c".to_owned(), "cat".to_owned()]);
        assert_eq!(spec.env.get("QUIETLINE_LOG").map(String::as_str), Some("debug"));
        assert_eq!(spec.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn sibling_worker_requires_existing_file() {
        let dir = std::env::temp_dir().join(format!("quietline_worker_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create dir");
        assert_eq!(sibling_worker(&dir), None);

        let path = dir.join(format!("{DEFAULT_WORKER_BIN}{}", std::env::consts::EXE_SUFFIX));
        std::fs::write(&path, b"").expect("write worker stub");
        assert_eq!(sibling_worker(&dir), Some(path));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn cargo_subdirectories_look_one_level_up() {
        let root = std::env::temp_dir().join(format!("quietline_target_{}", uuid::Uuid::new_v4()));
        let examples = root.join("examples");
        std::fs::create_dir_all(&examples).expect("create dir");
        let path = root.join(format!("{DEFAULT_WORKER_BIN}{}", std::env::consts::EXE_SUFFIX));
        std::fs::write(&path, b"").expect("write worker stub");

        assert_eq!(cargo_target_worker(&examples), Some(path));
        assert_eq!(cargo_target_worker(&root), None);

        let _ = std::fs::remove_dir_all(root);
    }
}
