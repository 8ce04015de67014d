use std::path::{Path, PathBuf};

use serde::Serialize;

use super::Status;
use crate::platform::{Platform, arch};
use crate::process::capture;

/// Host OS and its package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformCheck {
    pub status: Status,
    pub os: String,
    pub distro: Option<String>,
    pub version: Option<String>,
    pub package_manager: Option<String>,
    pub arch: String,
}

/// Checks the platform. Unsupported OSes are errors and a package manager
/// that is not on PATH is a warning.
pub fn check_platform(platform: &Platform) -> PlatformCheck {
    let package_manager = platform.package_manager();
    let status = match package_manager {
        None => Status::Error,
        Some(pm) if !pm.is_available() => Status::Warning,
        Some(_) => Status::Ok,
    };

    PlatformCheck {
        status,
        os: platform.os_name().to_string(),
        distro: platform.distro().map(str::to_string),
        version: platform.version().map(str::to_string),
        package_manager: package_manager.map(|pm| pm.to_string()),
        arch: arch().to_string(),
    }
}

/// The user's login shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellCheck {
    pub status: Status,
    pub name: String,
    /// First line of `<shell> --version`.
    pub version: Option<String>,
    /// rc file the shell reads, whether or not it exists yet.
    pub config_file: Option<PathBuf>,
}

fn rc_candidates(shell: &str) -> &'static [&'static str] {
    match shell {
        "bash" => &[".bashrc", ".bash_profile", ".profile"],
        "zsh" => &[".zshrc", ".zprofile"],
        _ => &[],
    }
}

/// Picks the first existing rc file, falling back to the primary one.
pub(crate) fn shell_config_file(shell: &str, home: &Path) -> Option<PathBuf> {
    let candidates = rc_candidates(shell);
    candidates
        .iter()
        .map(|name| home.join(name))
        .find(|path| path.is_file())
        .or_else(|| candidates.first().map(|name| home.join(name)))
}

/// Checks the shell named by `shell_path` (usually `$SHELL`).
///
/// Only bash and zsh are configured by setup; anything else is a warning.
pub fn check_shell(shell_path: Option<&str>, home: Option<&Path>) -> ShellCheck {
    let shell_path = shell_path.filter(|s| !s.is_empty()).unwrap_or("/bin/bash");
    let name = shell_path
        .rsplit('/')
        .next()
        .unwrap_or(shell_path)
        .to_string();

    if rc_candidates(&name).is_empty() {
        return ShellCheck {
            status: Status::Warning,
            name,
            version: None,
            config_file: None,
        };
    }

    let version = capture(&name, &["--version"])
        .ok()
        .and_then(|out| out.stdout.lines().next().map(|line| line.trim().to_string()))
        .filter(|line| !line.is_empty());
    let config_file = home.and_then(|home| shell_config_file(&name, home));
    let status = if config_file.is_some() {
        Status::Ok
    } else {
        Status::Warning
    };

    ShellCheck {
        status,
        name,
        version,
        config_file,
    }
}
