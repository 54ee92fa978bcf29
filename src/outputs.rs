//! Named outputs for downstream workflow steps
//!
//! Values are appended to the host's results file using the heredoc form
//! `name<<EOF\nvalue\nEOF\n`, which also carries multi-line values.

use anyhow::Context;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::error::Result;

const DELIMITER: &str = "EOF";

pub const HOMEBREW_CORE_BRANCH: &str = "homebrew_core_branch";
pub const BUILDPATH: &str = "buildpath";
pub const TESTPATH: &str = "testpath";

#[derive(Debug, Clone, Default)]
pub struct ActionOutputs {
    file: Option<PathBuf>,
}

impl ActionOutputs {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }

    /// Publish `name = value`. Without a results file the value is only logged.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        let Some(path) = &self.file else {
            tracing::info!(output = name, value, "No output file configured");
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open output file: {}", path.display()))?;

        write!(file, "{}", format_output(name, value))
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;

        tracing::debug!(output = name, value, file = %path.display(), "Set output");
        Ok(())
    }
}

fn format_output(name: &str, value: &str) -> String {
    format!("{name}<<{DELIMITER}\n{value}\n{DELIMITER}\n")
}
