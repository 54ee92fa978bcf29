//! Library interface for tapcheck
//!
//! Stages a Homebrew formula into tap directories and drives `brew` and `git`
//! to audit, install, and test it from CI.

pub mod brew;
pub mod colors;
pub mod config;
pub mod error;
pub mod fork;
pub mod formula;
pub mod orchestrator;
pub mod outputs;
pub mod runner;
pub mod state;
pub mod tempdir;

// Re-export commonly used types
pub use config::Config;
pub use error::{ActionError, Result};
pub use orchestrator::{Orchestrator, RunReport};
pub use runner::{CommandRunner, CommandSpec, ProcessResult, SystemRunner};
pub use state::{RunState, Stage};
