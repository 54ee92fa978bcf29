//! Locating the build and test directories brew leaves behind with `--keep-tmp`
//!
//! brew names them `<formula>-<random>` under its temp root. The first root
//! that exists wins. Claimed names are remembered in the run's
//! [`TempDirRegistry`] so the install and test phases get different
//! directories. The scan is not safe against an unrelated concurrent build
//! creating directories with the same prefix.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ActionError, Result};
use crate::state::TempDirRegistry;

/// macOS default temp root for brew.
pub const MACOS_TEMP_ROOT: &str = "/private/tmp";

/// Linux default temp root for brew.
pub const LINUX_TEMP_ROOT: &str = "/var/tmp";

#[derive(Debug, Clone)]
pub struct TempDirLocator {
    roots: Vec<PathBuf>,
}

impl TempDirLocator {
    /// Search `roots` in order.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// The override (if any), then the macOS and Linux defaults.
    pub fn with_override(temp_dir_override: Option<&Path>) -> Self {
        let mut roots = Vec::with_capacity(3);
        if let Some(dir) = temp_dir_override {
            roots.push(dir.to_path_buf());
        }
        roots.push(PathBuf::from(MACOS_TEMP_ROOT));
        roots.push(PathBuf::from(LINUX_TEMP_ROOT));
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// First candidate root that is an existing directory.
    pub fn root(&self) -> Result<&Path> {
        self.roots
            .iter()
            .find(|d| !d.as_os_str().is_empty() && d.is_dir())
            .map(PathBuf::as_path)
            .ok_or(ActionError::NoRootTempDir)
    }

    /// Claim and return an unclaimed `<formula>-*` directory under the root.
    pub fn locate(&self, formula: &str, registry: &mut TempDirRegistry) -> Result<PathBuf> {
        let root = self.root()?;
        tracing::debug!(root = %root.display(), formula, "Scanning temp root");

        let prefix = format!("{}-", formula);
        let mut names: Vec<String> = fs::read_dir(root)?
            .flatten()
            // keep-tmp names are built from the formula name; skip anything not UTF-8
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix))
            .collect();
        // read_dir order is unspecified
        names.sort();

        for name in names {
            if registry.is_claimed(&name) {
                continue;
            }
            registry.claim(&name);
            let dir = root.join(&name);
            tracing::info!(dir = %dir.display(), "Found temp directory");
            return Ok(dir);
        }

        Err(ActionError::NoMatchingTempDir {
            formula: formula.to_string(),
            root: root.to_path_buf(),
        })
    }
}
