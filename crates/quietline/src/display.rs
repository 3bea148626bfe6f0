/// Decides whether a popup window could be shown at all.
pub trait DisplayProbe: Send + Sync + 'static {
    fn is_headless(&self) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }
}

/// Environment-variable heuristics:
/// - Linux is headless without `DISPLAY` and `WAYLAND_DISPLAY`.
/// - macOS is headless inside an SSH session without X forwarding.
/// - Windows and other platforms are assumed to have a desktop.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvDisplayProbe;

impl DisplayProbe for EnvDisplayProbe {
    fn is_headless(&self) -> bool {
        headless_from_env(Platform::current(), |key| std::env::var(key).ok())
    }
}

pub fn headless_from_env(platform: Platform, var: impl Fn(&str) -> Option<String>) -> bool {
    let present = |key: &str| var(key).is_some_and(|value| !value.is_empty());
    match platform {
        Platform::Linux => !present("DISPLAY") && !present("WAYLAND_DISPLAY"),
        Platform::MacOs => {
            let ssh_session = var("XPC_SERVICE_NAME")
                .is_some_and(|service| service.contains("com.openssh"));
            ssh_session && !present("DISPLAY")
        }
        Platform::Windows | Platform::Other => false,
    }
}
