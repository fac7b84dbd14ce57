use std::path::{Path, PathBuf};

use crate::error::SuiteLoadError;

/// Resolves a user-supplied suite name or path to a concrete file,
/// per the search order: exact path first, then `{name}.suite.yaml` /
/// `{name}.suite.yml` under the project-local suites directory, then
/// the same under the built-in examples directory.
pub fn resolve_suite_path(
    requested: &str,
    project_suites_dir: &Path,
    builtin_examples_dir: &Path,
) -> Result<PathBuf, SuiteLoadError> {
    let exact = PathBuf::from(requested);
    if exact.is_file() {
        return Ok(exact);
    }

    let mut candidates = vec![exact.display().to_string()];
    for dir in [project_suites_dir, builtin_examples_dir] {
        for ext in ["suite.yaml", "suite.yml"] {
            let candidate = dir.join(format!("{requested}.{ext}"));
            if candidate.is_file() {
                return Ok(candidate);
            }
            candidates.push(candidate.display().to_string());
        }
    }

    Err(SuiteLoadError::NotFound {
        requested: requested.to_string(),
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_an_exact_existing_path_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let suite_path = dir.path().join("custom.yaml");
        std::fs::write(&suite_path, "id: x").unwrap();
        let resolved =
            resolve_suite_path(suite_path.to_str().unwrap(), dir.path(), dir.path()).unwrap();
        assert_eq!(resolved, suite_path);
    }

    #[test]
    fn falls_back_to_the_conventional_suite_yaml_name_in_the_project_dir() {
        let project = tempfile::tempdir().expect("tempdir");
        let builtin = tempfile::tempdir().expect("tempdir");
        let suite_path = project.path().join("smoke.suite.yaml");
        std::fs::write(&suite_path, "id: x").unwrap();
        let resolved = resolve_suite_path("smoke", project.path(), builtin.path()).unwrap();
        assert_eq!(resolved, suite_path);
    }

    #[test]
    fn reports_every_candidate_probed_when_nothing_matches() {
        let project = tempfile::tempdir().expect("tempdir");
        let builtin = tempfile::tempdir().expect("tempdir");
        let error = resolve_suite_path("missing", project.path(), builtin.path()).unwrap_err();
        match error {
            SuiteLoadError::NotFound { candidates, .. } => assert_eq!(candidates.len(), 5),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
