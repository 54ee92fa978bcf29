//! Fixed `brew` invocations
//!
//! Every call the action makes into Homebrew lives here, each one a direct
//! argument vector handed to the process runner. Homebrew itself does the
//! real work.

use colored::Colorize;
use std::path::PathBuf;

use crate::outputs::{self, ActionOutputs};
use crate::runner::{CommandRunner, CommandSpec, execute};
use crate::state::RunState;
use crate::tempdir::TempDirLocator;

pub const BREW: &str = "brew";

/// Scratch tap the formula is installed from, kept apart from real taps.
pub const TEMP_TAP: &str = "homebrew-release-action/homebrew-test";

/// Where brew materialises [`TEMP_TAP`] on disk, relative to its repository.
pub fn temp_tap_path(brew_repository: &std::path::Path) -> PathBuf {
    brew_repository
        .join("Library")
        .join("Taps")
        .join("homebrew-release-action")
        .join("homebrew-test")
}

/// `<tap>/<formula>` as brew expects it on the command line.
pub fn tap_formula(formula: &str) -> String {
    format!("{}/{}", TEMP_TAP, formula)
}

pub fn version_command() -> CommandSpec {
    CommandSpec::new(BREW).arg("--version")
}

pub fn audit_command(formula: &str) -> CommandSpec {
    CommandSpec::new(BREW).args([
        "audit".to_string(),
        "--os=all".to_string(),
        "--arch=all".to_string(),
        "--strict".to_string(),
        "--online".to_string(),
        tap_formula(formula),
    ])
}

pub fn install_command(formula: &str) -> CommandSpec {
    CommandSpec::new(BREW)
        .args(["install", "--keep-tmp", "--verbose"])
        .arg(tap_formula(formula))
        .env("HOMEBREW_NO_INSTALLED_DEPENDENTS_CHECK", "1")
}

pub fn test_command(formula: &str) -> CommandSpec {
    CommandSpec::new(BREW)
        .args(["test", "--keep-tmp", "--verbose"])
        .arg(tap_formula(formula))
}

fn heading(message: &str) {
    println!("{} {}", "==>".bold().green(), message);
}

/// Whether a working `brew` is on PATH.
pub async fn is_installed<R: CommandRunner>(runner: &R, state: &mut RunState) -> bool {
    heading("Checking if Homebrew is installed");
    execute(runner, state, &version_command()).await.succeeded
}

/// `brew --repository`, or `None` if brew could not answer.
pub async fn repository<R: CommandRunner>(runner: &R, state: &mut RunState) -> Option<PathBuf> {
    let result = execute(
        runner,
        state,
        &CommandSpec::new(BREW).arg("--repository").ignore_error(),
    )
    .await;

    let path = result.stdout_text();
    if !result.succeeded || path.is_empty() {
        tracing::warn!("Could not determine the brew repository");
        return None;
    }
    Some(PathBuf::from(path))
}

pub async fn developer_on<R: CommandRunner>(runner: &R, state: &mut RunState) -> bool {
    heading("Enabling brew developer mode");
    execute(
        runner,
        state,
        &CommandSpec::new(BREW).args(["developer", "on"]),
    )
    .await
    .succeeded
}

/// Create the scratch tap without a git repository.
pub async fn tap_new<R: CommandRunner>(runner: &R, state: &mut RunState) -> bool {
    heading(&format!("Running `brew tap-new {} --no-git`", TEMP_TAP));
    execute(
        runner,
        state,
        &CommandSpec::new(BREW).args(["tap-new", TEMP_TAP, "--no-git"]),
    )
    .await
    .succeeded
}

/// `brew update` followed by `brew upgrade`. Stops at the first failure.
pub async fn upgrade<R: CommandRunner>(runner: &R, state: &mut RunState) -> bool {
    heading("Updating Homebrew");
    if !execute(runner, state, &CommandSpec::new(BREW).arg("update"))
        .await
        .succeeded
    {
        return false;
    }

    heading("Upgrading Homebrew");
    execute(runner, state, &CommandSpec::new(BREW).arg("upgrade"))
        .await
        .succeeded
}

/// Print `brew config` and `brew doctor`. Only `config` decides the result.
pub async fn debug<R: CommandRunner>(runner: &R, state: &mut RunState) -> bool {
    heading("Running `brew config`");
    let config = execute(runner, state, &CommandSpec::new(BREW).arg("config"))
        .await
        .succeeded;

    heading("Running `brew doctor`");
    execute(
        runner,
        state,
        &CommandSpec::new(BREW).arg("doctor").ignore_error(),
    )
    .await;

    config
}

pub async fn audit_formula<R: CommandRunner>(
    runner: &R,
    state: &mut RunState,
    formula: &str,
) -> bool {
    heading(&format!("Auditing formula {}", formula.bold()));
    execute(runner, state, &audit_command(formula))
        .await
        .succeeded
}

pub async fn install_formula<R: CommandRunner>(
    runner: &R,
    state: &mut RunState,
    locator: &TempDirLocator,
    outputs: &ActionOutputs,
    formula: &str,
) -> bool {
    heading(&format!("Installing formula {}", formula.bold()));
    let succeeded = execute(runner, state, &install_command(formula))
        .await
        .succeeded;

    publish_temp_dir(state, locator, outputs, formula, outputs::BUILDPATH);
    succeeded
}

pub async fn test_formula<R: CommandRunner>(
    runner: &R,
    state: &mut RunState,
    locator: &TempDirLocator,
    outputs: &ActionOutputs,
    formula: &str,
) -> bool {
    heading(&format!("Testing formula {}", formula.bold()));
    let succeeded = execute(runner, state, &test_command(formula))
        .await
        .succeeded;

    publish_temp_dir(state, locator, outputs, formula, outputs::TESTPATH);
    succeeded
}

/// Find the directory brew kept and publish it. Never affects the run result.
fn publish_temp_dir(
    state: &mut RunState,
    locator: &TempDirLocator,
    outputs: &ActionOutputs,
    formula: &str,
    output_name: &str,
) {
    println!("Trying to find temp directory");
    let dir = match locator.locate(formula, &mut state.temp_dirs) {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!("{}", e);
            println!("::warning:: {}", e);
            return;
        }
    };

    println!("Found temp directory {}", dir.display());
    if let Err(e) = outputs.set(output_name, &dir.to_string_lossy()) {
        tracing::warn!("Failed to set output {}: {}", output_name, e);
    }
}
