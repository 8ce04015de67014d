//! Layered configuration.
//!
//! Values come from built-in defaults, then a TOML file, then the
//! `HIVE_MCP_DIR` environment variable. The CLI applies `--dir` last.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HiveError;

/// Default upstream repository for hive-mcp.
pub const DEFAULT_REPO_URL: &str = "https://github.com/BuddhiLW/hive-mcp.git";

/// Environment variable that overrides [`HiveConfig::hive_mcp_dir`].
pub const DIR_ENV_VAR: &str = "HIVE_MCP_DIR";

/// Settings shared by setup, detection and doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveConfig {
    /// Checkout location of hive-mcp. `~` is expanded on load.
    pub hive_mcp_dir: PathBuf,
    pub repo_url: String,
    pub chroma_url: String,
    pub ollama_url: String,
    pub embedding_model: String,
    /// Name under which the MCP server is registered with `claude`.
    pub mcp_server_name: String,
    /// Optional file listing extra OS packages to install.
    pub extra_packages_file: Option<PathBuf>,
}

impl Default for HiveConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
        Self {
            hive_mcp_dir: home.join("hive-mcp"),
            repo_url: DEFAULT_REPO_URL.to_string(),
            chroma_url: "http://localhost:8000".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            mcp_server_name: "emacs".to_string(),
            extra_packages_file: None,
        }
    }
}

/// Location of the user config file, e.g. `~/.config/hive/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hive").join("config.toml"))
}

/// Expands a leading `~` against `home`. Other paths are returned unchanged.
pub fn expand_tilde(path: &Path, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

impl HiveConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, HiveError> {
        toml::from_str(content).map_err(|source| HiveError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the configuration and applies the environment override.
    ///
    /// With an explicit `path` the file must exist. Otherwise the default
    /// location is used when present and defaults when it is not.
    ///
    /// ## Errors
    ///
    /// Fails if a config file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, HiveError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.expand_paths(dirs::home_dir().as_deref());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, HiveError> {
        tracing::debug!(path = %path.display(), "Loading config");
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content, path)
    }

    /// Applies environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DIR_ENV_VAR).filter(|v| !v.is_empty()) {
            self.hive_mcp_dir = PathBuf::from(dir);
        }
    }

    /// Replaces the checkout directory, e.g. from a command-line flag.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.hive_mcp_dir = expand_tilde(&dir.into(), dirs::home_dir().as_deref());
        self
    }

    fn expand_paths(&mut self, home: Option<&Path>) {
        self.hive_mcp_dir = expand_tilde(&self.hive_mcp_dir, home);
        if let Some(file) = &self.extra_packages_file {
            self.extra_packages_file = Some(expand_tilde(file, home));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HiveConfig::default();
        assert_eq!(config.repo_url, DEFAULT_REPO_URL);
        assert_eq!(config.chroma_url, "http://localhost:8000");
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.embedding_model, "nomic-embed-text");
        assert_eq!(config.mcp_server_name, "emacs");
        assert!(config.hive_mcp_dir.ends_with("hive-mcp"));
        assert!(config.extra_packages_file.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = HiveConfig::from_toml(
            "embedding_model = \"mxbai-embed-large\"\n",
            Path::new("config.toml"),
        )
        .unwrap();
        assert_eq!(config.embedding_model, "mxbai-embed-large");
        assert_eq!(config.mcp_server_name, "emacs");
    }

    #[test]
    fn test_invalid_toml_names_file() {
        let err = HiveConfig::from_toml("hive_mcp_dir = [", Path::new("/tmp/bad.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("/tmp/bad.toml"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config =
            HiveConfig::from_toml("hive_mcp_dir = \"/from/file\"", Path::new("c.toml")).unwrap();
        config.apply_env(|key| (key == DIR_ENV_VAR).then(|| "/from/env".to_string()));
        assert_eq!(config.hive_mcp_dir, PathBuf::from("/from/env"));
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let mut config =
            HiveConfig::from_toml("hive_mcp_dir = \"/from/file\"", Path::new("c.toml")).unwrap();
        config.apply_env(|_| Some(String::new()));
        assert_eq!(config.hive_mcp_dir, PathBuf::from("/from/file"));
    }

    #[test]
    fn test_dir_flag_wins() {
        let mut config = HiveConfig::default();
        config.apply_env(|_| Some("/from/env".to_string()));
        let config = config.with_dir("/from/flag");
        assert_eq!(config.hive_mcp_dir, PathBuf::from("/from/flag"));
    }

    #[test]
    fn test_expand_tilde() {
        let home = Path::new("/home/dev");
        assert_eq!(
            expand_tilde(Path::new("~/hive-mcp"), Some(home)),
            PathBuf::from("/home/dev/hive-mcp")
        );
        assert_eq!(expand_tilde(Path::new("~"), Some(home)), PathBuf::from("/home/dev"));
        assert_eq!(
            expand_tilde(Path::new("/opt/hive"), Some(home)),
            PathBuf::from("/opt/hive")
        );
        assert_eq!(expand_tilde(Path::new("~/x"), None), PathBuf::from("~/x"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "mcp_server_name = \"hive\"\nextra_packages_file = \"/etc/hive/deps.txt\"\n",
        )
        .unwrap();
        let config = HiveConfig::load(Some(&path)).unwrap();
        assert_eq!(config.mcp_server_name, "hive");
        assert_eq!(
            config.extra_packages_file,
            Some(PathBuf::from("/etc/hive/deps.txt"))
        );
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HiveConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
