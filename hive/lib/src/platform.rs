//! Host platform detection.
//!
//! The platform is detected once at startup and passed to whatever needs to
//! branch on it, so OS checks are not scattered through the steps.

use std::fmt;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::process::{capture, find_program};

/// OS-level package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Apk,
    Brew,
    Unknown,
}

impl PackageManager {
    /// Managers probed on PATH when the distro is not recognized, in order.
    const FALLBACK_ORDER: [PackageManager; 6] = [
        PackageManager::Apt,
        PackageManager::Dnf,
        PackageManager::Yum,
        PackageManager::Pacman,
        PackageManager::Zypper,
        PackageManager::Apk,
    ];

    pub fn command(self) -> &'static str {
        match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Apk => "apk",
            PackageManager::Brew => "brew",
            PackageManager::Unknown => "unknown",
        }
    }

    /// Maps an os-release `ID` to its native package manager.
    pub fn for_distro(id: &str) -> Option<Self> {
        match id {
            "ubuntu" | "debian" | "linuxmint" | "pop" => Some(PackageManager::Apt),
            "fedora" | "rhel" | "centos" => Some(PackageManager::Dnf),
            "arch" | "manjaro" | "endeavouros" => Some(PackageManager::Pacman),
            "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" => Some(PackageManager::Zypper),
            "alpine" => Some(PackageManager::Apk),
            _ => None,
        }
    }

    fn from_path() -> Self {
        Self::FALLBACK_ORDER
            .into_iter()
            .find(|pm| find_program(pm.command()).is_some())
            .unwrap_or(PackageManager::Unknown)
    }

    /// Whether the manager's executable is on PATH.
    pub fn is_available(self) -> bool {
        self != PackageManager::Unknown && find_program(self.command()).is_some()
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// The host operating system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "os", rename_all = "lowercase")]
pub enum Platform {
    Linux {
        distro: String,
        version: Option<String>,
        package_manager: PackageManager,
    },
    MacOs { version: Option<String> },
    Unsupported { name: String },
}

/// `ID` and `VERSION_ID` from an os-release file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OsRelease {
    pub id: String,
    pub version_id: Option<String>,
}

/// Parses the content of `/etc/os-release`.
///
/// Returns `None` when no `ID` is present.
pub fn parse_os_release_content(content: &str) -> Option<OsRelease> {
    let mut release = OsRelease::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim_matches('"').trim_matches('\'');
            match key {
                "ID" => release.id = value.to_lowercase(),
                "VERSION_ID" if !value.is_empty() => release.version_id = Some(value.to_string()),
                _ => {}
            }
        }
    }

    if release.id.is_empty() {
        None
    } else {
        Some(release)
    }
}

impl Platform {
    /// Detects the platform of the running host.
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "linux" => Self::detect_linux(),
            "macos" => Self::MacOs {
                version: macos_version(),
            },
            other => Self::Unsupported {
                name: other.to_string(),
            },
        }
    }

    fn detect_linux() -> Self {
        match fs::read_to_string("/etc/os-release")
            .ok()
            .as_deref()
            .and_then(parse_os_release_content)
        {
            Some(release) => Self::linux_from_release(release),
            None => Self::Linux {
                distro: "unknown".to_string(),
                version: None,
                package_manager: PackageManager::Unknown,
            },
        }
    }

    fn linux_from_release(release: OsRelease) -> Self {
        let package_manager =
            PackageManager::for_distro(&release.id).unwrap_or_else(PackageManager::from_path);
        Self::Linux {
            distro: release.id,
            version: release.version_id,
            package_manager,
        }
    }

    /// Short OS name (`linux`, `macos`, or the unsupported OS's name).
    pub fn os_name(&self) -> &str {
        match self {
            Platform::Linux { .. } => "linux",
            Platform::MacOs { .. } => "macos",
            Platform::Unsupported { name } => name,
        }
    }

    pub fn distro(&self) -> Option<&str> {
        match self {
            Platform::Linux { distro, .. } => Some(distro),
            Platform::MacOs { .. } => Some("macOS"),
            Platform::Unsupported { .. } => None,
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Platform::Linux { version, .. } | Platform::MacOs { version } => version.as_deref(),
            Platform::Unsupported { .. } => None,
        }
    }

    pub fn package_manager(&self) -> Option<PackageManager> {
        match self {
            Platform::Linux {
                package_manager, ..
            } => Some(*package_manager),
            Platform::MacOs { .. } => Some(PackageManager::Brew),
            Platform::Unsupported { .. } => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Platform::Unsupported { .. })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux {
                distro, version, ..
            } => match version {
                Some(v) => write!(f, "linux ({distro} {v})"),
                None => write!(f, "linux ({distro})"),
            },
            Platform::MacOs { version: Some(v) } => write!(f, "macOS {v}"),
            Platform::MacOs { version: None } => f.write_str("macOS"),
            Platform::Unsupported { name } => write!(f, "{name} (unsupported)"),
        }
    }
}

/// CPU architecture of the running binary.
pub fn arch() -> &'static str {
    std::env::consts::ARCH
}

fn macos_version() -> Option<String> {
    let output = capture("sw_vers", &["-productVersion"]).ok()?;
    let version = output.stdout.trim();
    (output.success && !version.is_empty()).then(|| version.to_string())
}
