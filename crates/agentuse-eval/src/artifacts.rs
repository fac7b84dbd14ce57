use std::path::Path;

use agentuse_model::{ArtifactCheckDetail, ArtifactExpectation, ArtifactResult};

/// Checks every expected artifact against the trial's scratch directory.
/// A read error (permission denied, not a regular file) fails that one
/// check with a diagnostic rather than aborting the whole trial.
pub fn validate_artifacts(expectations: &[ArtifactExpectation], project_root: &Path) -> ArtifactResult {
    let mut details = Vec::with_capacity(expectations.len());
    let mut passed = 0u32;

    for expectation in expectations {
        let detail = check_one(expectation, project_root);
        if detail.passed {
            passed += 1;
        }
        details.push(detail);
    }

    ArtifactResult {
        checked: expectations.len() as u32,
        passed,
        details,
    }
}

fn check_one(expectation: &ArtifactExpectation, project_root: &Path) -> ArtifactCheckDetail {
    let full_path = project_root.join(&expectation.path);
    let exists = full_path.is_file();

    if exists != expectation.exists {
        return ArtifactCheckDetail {
            path: expectation.path.clone(),
            passed: false,
            detail: format!(
                "expected exists={}, found exists={exists}",
                expectation.exists
            ),
        };
    }

    if !expectation.exists || expectation.contains.is_empty() {
        return ArtifactCheckDetail {
            path: expectation.path.clone(),
            passed: true,
            detail: "ok".to_string(),
        };
    }

    let content = match std::fs::read_to_string(&full_path) {
        Ok(content) => content,
        Err(error) => {
            return ArtifactCheckDetail {
                path: expectation.path.clone(),
                passed: false,
                detail: format!("failed to read artifact: {error}"),
            }
        }
    };
    let lowered = content.to_lowercase();
    let missing: Vec<&str> = expectation
        .contains
        .iter()
        .map(String::as_str)
        .filter(|value| !lowered.contains(&value.to_lowercase()))
        .collect();

    if missing.is_empty() {
        ArtifactCheckDetail {
            path: expectation.path.clone(),
            passed: true,
            detail: "ok".to_string(),
        }
    } else {
        ArtifactCheckDetail {
            path: expectation.path.clone(),
            passed: false,
            detail: format!("missing expected content: {}", missing.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expectation(path: &str, exists: bool, contains: &[&str]) -> ArtifactExpectation {
        ArtifactExpectation {
            path: path.to_string(),
            exists,
            contains: contains.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn missing_file_fails_when_existence_is_expected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = validate_artifacts(&[expectation("missing.txt", true, &[])], dir.path());
        assert!(!result.valid());
        assert_eq!(result.details[0].passed, false);
    }

    #[test]
    fn absence_expectation_passes_when_file_is_truly_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = validate_artifacts(&[expectation("missing.txt", false, &[])], dir.path());
        assert!(result.valid());
    }

    #[test]
    fn content_check_is_case_insensitive_and_reports_missing_substrings() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("out.txt"), "Build Succeeded").unwrap();
        let result = validate_artifacts(
            &[expectation("out.txt", true, &["succeeded", "nonexistent"])],
            dir.path(),
        );
        assert!(!result.valid());
        assert!(result.details[0].detail.contains("nonexistent"));
    }
}
