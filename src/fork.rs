//! Preparing a homebrew-core fork for a formula contribution
//!
//! The fork clone is moved onto `homebrew-release-action/<formula>` and hard
//! reset to the upstream default branch, so a later commit starts from a
//! clean upstream head no matter what earlier runs left behind.

use colored::Colorize;
use std::path::Path;

use crate::error::{ActionError, Result};
use crate::outputs::{self, ActionOutputs};
use crate::runner::{CommandRunner, CommandSpec, execute};
use crate::state::RunState;

pub const GIT: &str = "git";

/// Namespace for branches created in the fork.
pub const BRANCH_PREFIX: &str = "homebrew-release-action";

pub const UPSTREAM_REMOTE: &str = "upstream";

/// Branch the fork is reset to after fetching.
pub const UPSTREAM_BRANCH: &str = "upstream/master";

pub fn branch_name(suffix: &str) -> String {
    format!("{}/{}", BRANCH_PREFIX, suffix)
}

fn git(path: &Path) -> CommandSpec {
    CommandSpec::new(GIT).current_dir(path)
}

/// Put the fork clone at `path` on the formula branch, tracking `upstream_url`.
///
/// Failing to create or check out the branch is fatal. The remote, fetch,
/// and reset steps only warn, since the remote already exists on reruns.
/// Returns the branch name, which is also published as an output.
pub async fn prepare_fork<R: CommandRunner>(
    runner: &R,
    state: &mut RunState,
    outputs: &ActionOutputs,
    branch_suffix: &str,
    path: &Path,
    upstream_url: &str,
) -> Result<String> {
    println!("{} Preparing homebrew-core fork", "==>".bold().green());

    let branch = branch_name(branch_suffix);
    let prior_error = state.error;

    println!("Attempt to create new branch {}", branch.cyan());
    let mut checked_out = execute(
        runner,
        state,
        &git(path).args(["checkout", "-b", branch.as_str()]),
    )
    .await
    .succeeded;

    if !checked_out {
        println!("Attempting to checkout existing branch {}", branch.cyan());
        checked_out = execute(
            runner,
            state,
            &git(path).args(["checkout", branch.as_str()]),
        )
        .await
        .succeeded;
    }

    if !checked_out {
        return Err(ActionError::BranchUnavailable { branch });
    }
    // a failed create followed by a good checkout is the normal rerun path
    state.error = prior_error;

    println!("Adding upstream remote");
    if !execute(
        runner,
        state,
        &git(path)
            .args(["remote", "add", UPSTREAM_REMOTE, upstream_url])
            .ignore_error(),
    )
    .await
    .succeeded
    {
        tracing::warn!("Remote {} not added, it may already exist", UPSTREAM_REMOTE);
    }

    println!("Fetching upstream remote");
    if !execute(
        runner,
        state,
        &git(path)
            .args(["fetch", UPSTREAM_REMOTE, "--depth=1"])
            .ignore_error(),
    )
    .await
    .succeeded
    {
        tracing::warn!("Fetching {} failed", UPSTREAM_REMOTE);
    }

    println!("Hard resetting to {}", UPSTREAM_BRANCH);
    if !execute(
        runner,
        state,
        &git(path)
            .args(["reset", "--hard", UPSTREAM_BRANCH])
            .ignore_error(),
    )
    .await
    .succeeded
    {
        tracing::warn!("Hard reset to {} failed", UPSTREAM_BRANCH);
    }

    outputs.set(outputs::HOMEBREW_CORE_BRANCH, &branch)?;
    Ok(branch)
}
