use std::path::PathBuf;
use thiserror::Error;

use crate::state::Stage;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Formula file {} does not exist", .0.display())]
    FormulaNotFound(PathBuf),

    #[error("Formula file {} is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("Formula file {} is not a .rb file", .0.display())]
    NotRubyFile(PathBuf),

    #[error("Formula file {file} was not copied to {}", .destination.display())]
    CopyVerificationFailed { file: String, destination: PathBuf },

    #[error("Could not find root temp directory")]
    NoRootTempDir,

    #[error("Could not find temp directory for {formula} in {}", .root.display())]
    NoMatchingTempDir { formula: String, root: PathBuf },

    #[error("Homebrew is not installed")]
    ToolchainMissing,

    #[error("Failed to create or checkout branch {branch}")]
    BranchUnavailable { branch: String },

    #[error("Homebrew update or upgrade failed")]
    UpgradeFailed,

    #[error("Homebrew debug failed")]
    DebugFailed,

    #[error(
        "Formula did not pass checks: [{}]. Please check the logs for more information.",
        Stage::join(.failures)
    )]
    ChecksFailed { failures: Vec<Stage> },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

impl ActionError {
    /// True for the staging validation failures, which point at a bad input
    /// rather than a broken environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ActionError::FormulaNotFound(_) | ActionError::NotAFile(_) | ActionError::NotRubyFile(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ActionError>;
