//! Idempotent installer and health checker for the hive-mcp environment.
//!
//! The core is [`setup::Runner`], which sequences [`setup::Step`]s with a
//! check/run/rollback protocol. [`detect`] and [`doctor`] report on the host
//! without changing it.

pub mod config;
pub mod depsfile;
pub mod detect;
pub mod doctor;
pub mod error;
pub mod platform;
pub mod probe;
pub mod process;
pub mod setup;
pub mod version;

pub use config::HiveConfig;
pub use error::{HiveError, Result, RunnerError, StepError};
pub use platform::Platform;
