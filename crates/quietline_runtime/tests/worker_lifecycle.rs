use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use pretty_assertions::assert_eq;
use quietline_runtime::{
    DarkModeSource, DriverConfig, PopupBridge, PopupConfig, PopupDriver, PopupOutcome,
    PopupRequest, WorkerSpec,
};
use tokio::time::{timeout, Instant};

fn pid_file() -> PathBuf {
    std::env::temp_dir().join(format!("quietline_worker_{}.pid", unique_suffix()))
}

fn unique_suffix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("{}_{nanos}", std::process::id())
}

fn hanging_worker(pid_path: &PathBuf) -> WorkerSpec {
    WorkerSpec::new("sh")
        .with_arg("-c")
        .with_arg(r#"echo $$ > "$QUIETLINE_TEST_PID_FILE"; exec sleep 60"#)
        .with_env("QUIETLINE_TEST_PID_FILE", pid_path.to_string_lossy())
}

fn read_pid(path: &PathBuf) -> String {
    std::fs::read_to_string(path)
        .expect("worker wrote pid file")
        .trim()
        .to_owned()
}

fn process_alive(pid: &str) -> bool {
    Command::new("kill")
        .args(["-0", pid])
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[tokio::test(flavor = "current_thread")]
async fn hung_worker_is_killed_at_deadline() {
    let pid_path = pid_file();
    let driver = PopupDriver::new(
        DriverConfig::new(hanging_worker(&pid_path))
            .with_dark_mode(DarkModeSource::Fixed(true))
            .with_deadline_ceiling(Duration::from_millis(500)),
    );

    let started = Instant::now();
    let outcome = driver
        .run(PopupRequest::new("Hi", PopupConfig::new()))
        .await;
    assert_eq!(outcome, PopupOutcome::Timeout);
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert!(started.elapsed() < Duration::from_secs(10));

    let pid = read_pid(&pid_path);
    assert!(!process_alive(&pid), "worker {pid} must not outlive its deadline");
    let _ = std::fs::remove_file(pid_path);
}

#[tokio::test(flavor = "current_thread")]
async fn explicit_timeout_deadline_uses_grace() {
    let pid_path = pid_file();
    let driver = PopupDriver::new(
        DriverConfig::new(hanging_worker(&pid_path))
            .with_dark_mode(DarkModeSource::Fixed(true))
            .with_deadline_grace(Duration::from_millis(300))
            .with_deadline_ceiling(Duration::from_secs(60)),
    );

    let started = Instant::now();
    let outcome = driver
        .run(PopupRequest::new("Hi", PopupConfig::new().with_timeout_secs(0.2)))
        .await;
    assert_eq!(outcome, PopupOutcome::Timeout);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!process_alive(&read_pid(&pid_path)));
    let _ = std::fs::remove_file(pid_path);
}

#[tokio::test(flavor = "current_thread")]
async fn preempted_worker_process_is_killed() {
    let pid_path = pid_file();
    let bridge = PopupBridge::new(
        DriverConfig::new(
            WorkerSpec::new("sh")
                .with_arg("-c")
                .with_arg(
                    r#"input=$(cat); case "$input" in *first*) echo $$ > "$QUIETLINE_TEST_PID_FILE"; exec sleep 60 ;; *) printf '{"kind":"dismissed"}' ;; esac"#,
                )
                .with_env("QUIETLINE_TEST_PID_FILE", pid_path.to_string_lossy()),
        )
        .with_dark_mode(DarkModeSource::Fixed(true)),
    );

    let first_bridge = bridge.clone();
    let first = tokio::spawn(async move {
        first_bridge
            .show(PopupRequest::new("first", PopupConfig::new()))
            .await
    });

    timeout(Duration::from_secs(5), async {
        while !pid_path.exists() || read_pid_opt(&pid_path).is_none() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("first worker started");
    let pid = read_pid(&pid_path);

    let second = bridge
        .show(PopupRequest::new("second", PopupConfig::new()).with_wait_for_response(false))
        .await;
    assert_eq!(second, PopupOutcome::Dismissed);
    assert_eq!(first.await.expect("join first"), PopupOutcome::Cancelled);

    // kill_on_drop signals immediately; give the kernel a moment to reap.
    timeout(Duration::from_secs(5), async {
        while process_alive(&pid) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("preempted worker terminated");
    let _ = std::fs::remove_file(pid_path);
}

#[tokio::test(flavor = "current_thread")]
async fn abandoned_popup_kills_its_worker() {
    let pid_path = pid_file();
    let bridge = PopupBridge::new(
        DriverConfig::new(hanging_worker(&pid_path)).with_dark_mode(DarkModeSource::Fixed(true)),
    );

    let mut shown = Box::pin(bridge.show(PopupRequest::new("Hi", PopupConfig::new())));
    let early = timeout(Duration::from_secs(5), async {
        tokio::select! {
            outcome = &mut shown => Some(outcome),
            () = wait_for_pid(&pid_path) => None,
        }
    })
    .await
    .expect("worker started");
    assert_eq!(early, None, "hanging worker never reports");

    // The caller gives up on the popup.
    drop(shown);
    assert_eq!(bridge.registry().current_id(), None);

    let pid = read_pid(&pid_path);
    timeout(Duration::from_secs(5), async {
        while process_alive(&pid) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("abandoned worker terminated");
    let _ = std::fs::remove_file(pid_path);
}

async fn wait_for_pid(path: &PathBuf) {
    while read_pid_opt(path).is_none() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

fn read_pid_opt(path: &PathBuf) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}
