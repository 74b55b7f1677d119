//! The output directory holding one working copy per component.
//!
//! Layout:
//!
//! ```text
//! <root>/
//!   .baseline-state.json
//!   <repository-name>/      working copy
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::spec::BaselineSpec;
use crate::state::StateRecord;

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "git_repos";

/// File name of the component state record inside the output directory.
pub const STATE_FILE: &str = ".baseline-state.json";

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Path of the working copy of `repository_name`.
    pub fn repo_path(&self, repository_name: &str) -> PathBuf {
        self.root.join(repository_name)
    }

    pub fn has_working_copy(&self, repository_name: &str) -> bool {
        self.repo_path(repository_name).is_dir()
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    /// Load the state record for `spec`; a missing file yields an empty
    /// record. Progress made for another tag or another pin is dropped (see
    /// [`StateRecord::retarget`] and [`StateRecord::reconcile`]).
    pub fn load_state(&self, spec: &BaselineSpec) -> Result<StateRecord> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(StateRecord::new(&spec.tag));
        }
        let content = std::fs::read_to_string(&path)?;
        let record: StateRecord = serde_json::from_str(&content).map_err(|e| Error::State {
            message: format!("cannot parse {}: {}", path.display(), e),
        })?;
        Ok(record.retarget(&spec.tag).reconcile(spec))
    }

    /// Persist `record`, replacing the previous file atomically.
    pub fn save_state(&self, record: &StateRecord) -> Result<()> {
        self.ensure_root()?;
        let path = self.state_path();
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(record)?;
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}
