//! Concrete setup steps, one per environment component.

mod chroma;
mod clone;
mod doom;
mod emacs;
mod mcp;
mod ollama;
mod prerequisites;
mod shell;

pub use chroma::{ChromaStep, HEARTBEAT_PATH};
pub use clone::{CloneStep, DepsStep};
pub use doom::{DoomSyncStep, find_doom};
pub use emacs::{EmacsDaemonStep, daemon_pid};
pub use mcp::{McpStep, SERVER_MAIN, add_args, lists_server};
pub use ollama::{OllamaStep, TAGS_PATH, tags_list_model};
pub use prerequisites::{
    Installer, PrerequisitesStep, REQUIRED_PROGRAMS, validate_package_name,
};
pub use shell::{SHELL_MARKER, ShellStep, strip_managed_block};
