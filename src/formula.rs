//! Formula validation and staging into tap directories
//!
//! The input formula is checked, a scratch tap is created, and the file is
//! copied into every tap that needs it under `Formula/<first-letter>/`.

use anyhow::Context;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::brew;
use crate::config::{Config, WorkspaceLayout};
use crate::error::{ActionError, Result};
use crate::fork;
use crate::outputs::ActionOutputs;
use crate::runner::CommandRunner;
use crate::state::RunState;

/// Names derived from the formula file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaIdentity {
    /// `hello_world.rb`
    pub filename: String,
    /// `hello_world`
    pub name: String,
    /// `h`, the letter-bucket directory under `Formula/`
    pub first_letter: char,
}

impl FormulaIdentity {
    /// Validate `path` and derive the identity.
    ///
    /// Fails with a distinct error when the path is missing, is not a
    /// regular file, or does not end in `.rb`.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ActionError::FormulaNotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(ActionError::NotAFile(path.to_path_buf()));
        }
        if path.extension().and_then(|e| e.to_str()) != Some("rb") {
            return Err(ActionError::NotRubyFile(path.to_path_buf()));
        }

        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .ok_or_else(|| ActionError::NotAFile(path.to_path_buf()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| ActionError::NotRubyFile(path.to_path_buf()))?;
        let first_letter = filename
            .chars()
            .next()
            .and_then(|c| c.to_lowercase().next())
            .ok_or_else(|| ActionError::NotRubyFile(path.to_path_buf()))?;

        Ok(Self {
            filename,
            name,
            first_letter,
        })
    }

    /// `<tap_root>/Formula/<first-letter>`
    pub fn formula_dir(&self, tap_root: &Path) -> PathBuf {
        tap_root.join("Formula").join(self.first_letter.to_string())
    }
}

/// Every directory the formula must be copied into, in copy order.
///
/// The org tap and the fork always receive it; brew's own copy of the
/// scratch tap only when brew is present.
pub fn tap_targets(
    identity: &FormulaIdentity,
    layout: &WorkspaceLayout,
    brew_repository: Option<&Path>,
) -> Vec<PathBuf> {
    let mut targets = vec![
        identity.formula_dir(&layout.org_repo),
        identity.formula_dir(&layout.fork_repo),
    ];
    if let Some(repo) = brew_repository {
        targets.push(identity.formula_dir(&brew::temp_tap_path(repo)));
    }
    targets
}

/// Copy `source` into each target, creating it as needed, and check that the
/// copy landed.
pub fn copy_to_targets(
    source: &Path,
    identity: &FormulaIdentity,
    targets: &[PathBuf],
) -> Result<Vec<PathBuf>> {
    let source_real = fs::canonicalize(source)
        .with_context(|| format!("Failed to resolve {}", source.display()))?;

    let mut copied = Vec::with_capacity(targets.len());
    for dir in targets {
        println!("Copying {} to {}", identity.filename, dir.display());

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let destination = dir.join(&identity.filename);
        // copying a file onto itself truncates it
        let in_place = fs::canonicalize(&destination).is_ok_and(|real| real == source_real);
        if in_place {
            tracing::debug!("{} is already in place", destination.display());
        } else {
            fs::copy(source, &destination).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    source.display(),
                    destination.display()
                )
            })?;
        }

        if !destination.is_file() {
            return Err(ActionError::CopyVerificationFailed {
                file: identity.filename.clone(),
                destination: dir.clone(),
            });
        }

        println!(
            "  {} Copied {} to {}",
            "✓".green(),
            identity.filename,
            dir.display()
        );
        copied.push(destination);
    }
    Ok(copied)
}

/// Validate the configured formula and stage it into every tap.
///
/// Side effects run in order: developer mode, scratch tap, fork
/// preparation (when contributing upstream), then the copies.
pub async fn stage_formula<R: CommandRunner>(
    runner: &R,
    state: &mut RunState,
    config: &Config,
    outputs: &ActionOutputs,
) -> Result<FormulaIdentity> {
    let identity = FormulaIdentity::from_path(&config.formula_file)?;
    println!("formula_filename: {}", identity.filename);
    println!("first_letter: {}", identity.first_letter);

    brew::developer_on(runner, state).await;
    brew::tap_new(runner, state).await;

    let layout = config.layout();
    tracing::info!(org_repo = %layout.org_repo.display(), fork_repo = %layout.fork_repo.display(), "Workspace layout");

    if config.contribute_upstream {
        fork::prepare_fork(
            runner,
            state,
            outputs,
            &identity.name,
            &layout.fork_repo,
            &config.upstream_url(),
        )
        .await?;
    }

    let brew_repository = if brew::is_installed(runner, state).await {
        brew::repository(runner, state).await
    } else {
        None
    };

    let targets = tap_targets(&identity, &layout, brew_repository.as_deref());
    copy_to_targets(&config.formula_file, &identity, &targets)?;

    Ok(identity)
}
