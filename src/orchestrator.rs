//! The full action: stage, then upgrade, debug, audit, install, and test
//!
//! Environment problems (no brew, bad formula path, branch trouble, failed
//! self-update) stop the run with an error. Audit, install, and test
//! failures are recorded and the run carries on, so one invocation reports
//! every failing stage.

use colored::Colorize;

use crate::brew;
use crate::config::Config;
use crate::error::{ActionError, Result};
use crate::formula;
use crate::outputs::ActionOutputs;
use crate::runner::CommandRunner;
use crate::state::{RunState, Stage};
use crate::tempdir::TempDirLocator;

/// Summary of a run that was not aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub formula: String,
    /// False when audit, install, and test were skipped.
    pub validated: bool,
    pub failures: Vec<Stage>,
    pub error: bool,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        !self.validated || !self.error
    }

    /// The error to exit with, if the run failed.
    pub fn into_result(self) -> Result<Self> {
        if self.succeeded() {
            Ok(self)
        } else {
            Err(ActionError::ChecksFailed {
                failures: self.failures,
            })
        }
    }
}

pub struct Orchestrator<R> {
    runner: R,
    config: Config,
    outputs: ActionOutputs,
    locator: TempDirLocator,
    state: RunState,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(runner: R, config: Config) -> Self {
        let outputs = ActionOutputs::new(config.output_file.clone());
        let locator = TempDirLocator::with_override(config.temp_dir_override.as_deref());
        Self {
            runner,
            config,
            outputs,
            locator,
            state: RunState::new(),
        }
    }

    /// Replace the temp roots searched after install and test.
    pub fn with_locator(mut self, locator: TempDirLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Drive every stage. `Err` means the run was aborted.
    pub async fn run(&mut self) -> Result<RunReport> {
        if !brew::is_installed(&self.runner, &mut self.state).await {
            return Err(ActionError::ToolchainMissing);
        }

        let identity =
            formula::stage_formula(&self.runner, &mut self.state, &self.config, &self.outputs)
                .await?;
        let formula = identity.name;

        if !self.config.validate {
            println!("Skipping audit, install, and test");
            return Ok(self.report(formula, false));
        }

        if !brew::upgrade(&self.runner, &mut self.state).await {
            return Err(ActionError::UpgradeFailed);
        }

        if !brew::debug(&self.runner, &mut self.state).await {
            return Err(ActionError::DebugFailed);
        }

        if !brew::audit_formula(&self.runner, &mut self.state, &formula).await {
            println!("::error:: Formula {} failed audit", formula);
            self.state.record_failure(Stage::Audit);
        }

        if !brew::install_formula(
            &self.runner,
            &mut self.state,
            &self.locator,
            &self.outputs,
            &formula,
        )
        .await
        {
            println!("::error:: Formula {} failed install", formula);
            self.state.record_failure(Stage::Install);
        }

        if !brew::test_formula(
            &self.runner,
            &mut self.state,
            &self.locator,
            &self.outputs,
            &formula,
        )
        .await
        {
            println!("::error:: Formula {} failed test", formula);
            self.state.record_failure(Stage::Test);
        }

        let report = self.report(formula, true);
        if report.succeeded() {
            println!(
                "{} Formula {} audit, install, and test successful",
                "✓".green(),
                report.formula.bold()
            );
        }
        Ok(report)
    }

    fn report(&self, formula: String, validated: bool) -> RunReport {
        RunReport {
            formula,
            validated,
            failures: self.state.failures.clone(),
            error: self.state.error,
        }
    }
}
