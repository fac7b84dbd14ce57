//! Scores a trial's output text and artifacts against a scenario's
//! declared expectations. Every strategy here is designed to fail soft:
//! a bad regex, an unreadable artifact, or an unparseable judge reply
//! becomes an invalid result with a diagnostic, never a trial crash.

mod artifacts;
mod output;

use std::path::Path;

use agentuse_llm::LlmClient;
use agentuse_model::{ArtifactExpectation, ArtifactResult, OutputResult, OutputValidation};

pub use artifacts::validate_artifacts;
pub use output::{validate_output, DEFAULT_JUDGE_MODEL};

/// Runs both halves of the evaluator and returns the two results a
/// [`agentuse_model::TrialResult`] stores directly. `output_text` is the
/// final assistant message text for the trial; `project_root` is the
/// trial's scratch directory.
pub async fn evaluate(
    output_validation: Option<&OutputValidation>,
    artifact_expectations: &[ArtifactExpectation],
    output_text: &str,
    project_root: &Path,
    judge: &dyn LlmClient,
) -> (OutputResult, ArtifactResult) {
    let output = match output_validation {
        Some(validation) => validate_output(validation, output_text, judge).await,
        None => OutputResult {
            text: output_text.to_string(),
            valid: true,
            validation_details: Vec::new(),
        },
    };
    let artifacts = validate_artifacts(artifact_expectations, project_root);
    (output, artifacts)
}
