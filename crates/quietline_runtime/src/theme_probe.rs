use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);
const PERSONALIZE_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize";

/// Best-effort platform dark-mode probe. Any probe failure reports dark.
pub async fn detect_dark_mode() -> bool {
    if cfg!(target_os = "macos") {
        return match probe_output("defaults", &["read", "-g", "AppleInterfaceStyle"]).await {
            Some(stdout) => stdout.trim().eq_ignore_ascii_case("dark"),
            None => true,
        };
    }

    if cfg!(target_os = "windows") {
        let args = ["query", PERSONALIZE_KEY, "/v", "AppsUseLightTheme"];
        return match probe_output("reg", &args).await {
            Some(stdout) => parse_apps_use_light_theme(&stdout).map_or(true, |light| !light),
            None => true,
        };
    }

    true
}

/// Stdout of a short-lived probe command, or `None` if it could not run in
/// time. A non-zero exit still yields its (usually empty) stdout.
async fn probe_output(program: &str, args: &[&str]) -> Option<String> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match timeout(PROBE_TIMEOUT, command.output()).await {
        Ok(Ok(output)) => Some(String::from_utf8_lossy(&output.stdout).into_owned()),
        Ok(Err(err)) => {
            tracing::debug!(program, error = %err, "dark mode probe failed to run");
            None
        }
        Err(_) => {
            tracing::debug!(program, "dark mode probe timed out");
            None
        }
    }
}

/// Parse `reg query ... /v AppsUseLightTheme` output into "apps use light".
fn parse_apps_use_light_theme(output: &str) -> Option<bool> {
    let line = output
        .lines()
        .find(|line| line.contains("AppsUseLightTheme"))?;
    let value = line.split_whitespace().last()?;
    let digits = value.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16).ok().map(|value| value != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_registry_light_theme_flag() {
        let dark = "\r\nHKEY_CURRENT_USER\\...\\Personalize\r\n    AppsUseLightTheme    REG_DWORD    0x0\r\n";
        let light = "    AppsUseLightTheme    REG_DWORD    0x1\n";
        assert_eq!(parse_apps_use_light_theme(dark), Some(false));
        assert_eq!(parse_apps_use_light_theme(light), Some(true));
        assert_eq!(parse_apps_use_light_theme("ERROR: not found"), None);
        assert_eq!(
            parse_apps_use_light_theme("AppsUseLightTheme REG_DWORD zz"),
            None
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_probe_binary_yields_none() {
        assert_eq!(probe_output("quietline-no-such-probe", &[]).await, None);
    }
}
