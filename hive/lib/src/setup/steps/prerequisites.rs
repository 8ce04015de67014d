//! System prerequisite installation.
//!
//! The install strategy is chosen once from the detected [`Platform`] and
//! never re-derived while the step runs.

use crate::error::StepError;
use crate::platform::{PackageManager, Platform};
use crate::process::{all_programs_present, find_program, require_program, run_inherited};
use crate::setup::step::Step;

/// Binaries that must all be on PATH for the step to count as done.
pub const REQUIRED_PROGRAMS: [&str; 6] = ["git", "java", "clojure", "bb", "docker", "emacs"];

const BREW_PACKAGES: [&str; 6] = [
    "git",
    "openjdk@17",
    "clojure/tools/clojure",
    "borkdude/brew/babashka",
    "docker",
    "emacs-plus@29",
];

const APT_PACKAGES: [&str; 4] = ["git", "openjdk-17-jdk", "docker.io", "emacs"];

const CLOJURE_INSTALL_SCRIPT: &str = "curl -L -O https://github.com/clojure/brew-install/releases/latest/download/linux-install.sh \
&& chmod +x linux-install.sh && sudo ./linux-install.sh && rm linux-install.sh";

const BABASHKA_INSTALL_SCRIPT: &str = "curl -sLO https://raw.githubusercontent.com/babashka/babashka/master/install \
&& chmod +x install && sudo ./install && rm install";

/// Characters that are not allowed in package names.
const SHELL_METACHARACTERS: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']', '<', '>', '"', '\'', '\\', '*', '?',
    '!', '~', '^',
];

/// How prerequisites get installed on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installer {
    Homebrew,
    Apt,
    Unsupported(String),
}

impl Installer {
    pub fn for_platform(platform: &Platform) -> Self {
        match platform {
            Platform::MacOs { .. } => Installer::Homebrew,
            Platform::Linux {
                package_manager: PackageManager::Apt,
                ..
            } => Installer::Apt,
            Platform::Linux {
                distro,
                package_manager,
                ..
            } => Installer::Unsupported(format!("linux ({distro}, {package_manager})")),
            Platform::Unsupported { name } => Installer::Unsupported(name.clone()),
        }
    }

    fn install(&self, extra: &[String]) -> Result<(), StepError> {
        match self {
            Installer::Homebrew => install_homebrew(extra),
            Installer::Apt => install_apt(extra),
            Installer::Unsupported(os) => {
                Err(StepError::msg(format!("unsupported platform: {os}")))
            }
        }
    }
}

/// Rejects package names that could be interpreted by a shell.
pub fn validate_package_name(name: &str) -> Result<(), StepError> {
    if name.is_empty() || name.contains(SHELL_METACHARACTERS) || name.contains(char::is_whitespace)
    {
        return Err(StepError::msg(format!("invalid package name: {name:?}")));
    }
    Ok(())
}

fn install_homebrew(extra: &[String]) -> Result<(), StepError> {
    require_program("brew", "install Homebrew from https://brew.sh")?;

    let packages = BREW_PACKAGES
        .iter()
        .copied()
        .chain(extra.iter().map(String::as_str));
    for package in packages {
        // Packages may already be installed some other way.
        if let Err(err) = run_inherited("brew", &["install", package], None) {
            tracing::warn!(package, error = %err, "brew install failed, continuing");
        }
    }
    Ok(())
}

fn install_apt(extra: &[String]) -> Result<(), StepError> {
    require_program("apt", "this installer requires Debian/Ubuntu")?;

    let mut args = vec!["apt", "install", "-y"];
    args.extend(APT_PACKAGES);
    args.extend(extra.iter().map(String::as_str));
    run_inherited("sudo", &args, None)?;

    if find_program("clojure").is_none() {
        run_inherited("bash", &["-c", CLOJURE_INSTALL_SCRIPT], None)?;
    }
    if find_program("bb").is_none() {
        run_inherited("bash", &["-c", BABASHKA_INSTALL_SCRIPT], None)?;
    }
    Ok(())
}

/// Installs git, Java, Clojure, Babashka, Docker and Emacs.
#[derive(Debug, Clone)]
pub struct PrerequisitesStep {
    installer: Installer,
    extra_packages: Vec<String>,
}

impl PrerequisitesStep {
    pub fn new(installer: Installer) -> Self {
        Self {
            installer,
            extra_packages: Vec::new(),
        }
    }

    /// Adds packages to the OS package install.
    pub fn with_extra_packages(mut self, packages: Vec<String>) -> Self {
        self.extra_packages = packages;
        self
    }

    pub fn installer(&self) -> &Installer {
        &self.installer
    }
}

impl Step for PrerequisitesStep {
    fn name(&self) -> &str {
        "Install system prerequisites"
    }

    fn check(&self) -> Result<bool, StepError> {
        Ok(all_programs_present(&REQUIRED_PROGRAMS))
    }

    fn run(&self) -> Result<(), StepError> {
        for package in &self.extra_packages {
            validate_package_name(package)?;
        }
        self.installer.install(&self.extra_packages)
    }

    /// System packages are never uninstalled.
    fn rollback(&self) -> Result<(), StepError> {
        Ok(())
    }
}
