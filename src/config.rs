//! Resolved run configuration and the workspace layout derived from it

use std::path::{Path, PathBuf};

/// Directory under the workspace holding the checked-out repositories.
pub const ACTION_DIR: &str = "homebrew-release-action";

/// Clone of the tap repository the formula is released into.
pub const ORG_REPO_DIR: &str = "org_homebrew_repo";

/// Clone of the user's homebrew-core fork.
pub const FORK_REPO_DIR: &str = "homebrew_core_fork_repo";

pub const DEFAULT_UPSTREAM_REPO: &str = "Homebrew/homebrew-core";

#[derive(Debug, Clone)]
pub struct Config {
    pub formula_file: PathBuf,
    /// Run audit, install, and test after staging.
    pub validate: bool,
    /// Prepare a branch in the homebrew-core fork.
    pub contribute_upstream: bool,
    /// `owner/name` of the repository the fork tracks.
    pub upstream_repo: String,
    pub temp_dir_override: Option<PathBuf>,
    pub workspace: PathBuf,
    pub output_file: Option<PathBuf>,
}

impl Config {
    pub fn new(formula_file: impl Into<PathBuf>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            formula_file: formula_file.into(),
            validate: true,
            contribute_upstream: false,
            upstream_repo: DEFAULT_UPSTREAM_REPO.to_string(),
            temp_dir_override: None,
            workspace: workspace.into(),
            output_file: None,
        }
    }

    pub fn layout(&self) -> WorkspaceLayout {
        WorkspaceLayout::new(&self.workspace)
    }

    pub fn upstream_url(&self) -> String {
        format!("https://github.com/{}", self.upstream_repo)
    }
}

/// Where the repositories live inside the CI workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    pub org_repo: PathBuf,
    pub fork_repo: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(workspace: &Path) -> Self {
        let base = workspace.join(ACTION_DIR);
        Self {
            org_repo: base.join(ORG_REPO_DIR),
            fork_repo: base.join(FORK_REPO_DIR),
        }
    }
}

/// Treat an empty value (as the runner passes for unset inputs) as absent.
pub fn non_empty_path(value: Option<String>) -> Option<PathBuf> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}
