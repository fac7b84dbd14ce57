use serde::{Deserialize, Serialize};

/// One of three independent output validation strategies a scenario may
/// declare under `expected.output`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutputValidation {
    Contains { values: Vec<String> },
    Regex { pattern: String },
    LlmJudge {
        criteria: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactExpectation {
    pub path: String,
    #[serde(default = "default_exists")]
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<String>,
}

fn default_exists() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_validation_tags_round_trip_through_json() {
        let contains = OutputValidation::Contains {
            values: vec!["OK".to_string()],
        };
        let encoded = serde_json::to_value(&contains).expect("encode");
        assert_eq!(encoded["type"], "contains");
        let decoded: OutputValidation = serde_json::from_value(encoded).expect("decode");
        assert_eq!(decoded, contains);
    }

    #[test]
    fn artifact_expectation_defaults_exists_to_true() {
        let parsed: ArtifactExpectation =
            serde_json::from_str(r#"{"path": "out.txt"}"#).expect("parse");
        assert!(parsed.exists);
        assert!(parsed.contains.is_empty());
    }
}
