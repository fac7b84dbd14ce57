use std::path::{Path, PathBuf};

use agentuse_core::remove_dir_all_if_exists;

/// A trial's private working directory, `trials/{scenarioId}-{trialNumber}`
/// under the run's output directory. Created eagerly at construction;
/// removed recursively by [`ScratchDir::cleanup`], which callers must
/// invoke only after the evaluator has inspected the directory's
/// contents — artifact checks run against a still-live scratch dir.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn create(output_dir: &Path, scenario_id: &str, trial_number: u32) -> std::io::Result<Self> {
        let path = output_dir
            .join("trials")
            .join(format!("{scenario_id}-{trial_number}"));
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the scratch directory and everything in it. Never fails
    /// the trial: a cleanup error is a diagnostic, not a trial outcome.
    pub fn cleanup(self) {
        if let Err(error) = remove_dir_all_if_exists(&self.path) {
            tracing::warn!(path = %self.path.display(), %error, "failed to remove trial scratch directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_makes_the_scenario_and_trial_scoped_directory() {
        let output_dir = tempfile::tempdir().expect("tempdir");
        let scratch = ScratchDir::create(output_dir.path(), "s1", 2).expect("create");
        assert!(scratch.path().ends_with("trials/s1-2"));
        assert!(scratch.path().is_dir());
    }

    #[test]
    fn cleanup_removes_the_directory() {
        let output_dir = tempfile::tempdir().expect("tempdir");
        let scratch = ScratchDir::create(output_dir.path(), "s1", 0).expect("create");
        let path = scratch.path().to_path_buf();
        scratch.cleanup();
        assert!(!path.exists());
    }
}
