//! Per-run result accumulator
//!
//! Every stage records into a `RunState` owned by the orchestrator. Nothing
//! here is global, so two runs in one process never see each other's state.

use std::collections::HashSet;
use std::fmt;

/// The tracked, non-fatal stages of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Audit,
    Install,
    Test,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Audit => "audit",
            Stage::Install => "install",
            Stage::Test => "test",
        }
    }

    /// Comma-separated stage names, in recorded order.
    pub fn join(stages: &[Stage]) -> String {
        stages
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Temp directory names already handed out by the locator.
#[derive(Debug, Default, Clone)]
pub struct TempDirRegistry {
    claimed: HashSet<String>,
}

impl TempDirRegistry {
    pub fn is_claimed(&self, name: &str) -> bool {
        self.claimed.contains(name)
    }

    /// Returns false if the name was already claimed.
    pub fn claim(&mut self, name: &str) -> bool {
        self.claimed.insert(name.to_string())
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// Mutable state shared by the stages of a single run.
///
/// `error` is set by any non-ignorable subprocess failure. `failures` only
/// names the tracked stages, so `error` can be true with `failures` empty
/// (for example when enabling developer mode failed).
#[derive(Debug, Default)]
pub struct RunState {
    pub error: bool,
    pub failures: Vec<Stage>,
    pub temp_dirs: TempDirRegistry,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_error(&mut self) {
        self.error = true;
    }

    /// Record a tracked stage failure. Also sets the error flag.
    pub fn record_failure(&mut self, stage: Stage) {
        self.error = true;
        self.failures.push(stage);
    }
}
