use std::collections::HashSet;

use agentuse_model::suite::{ModelId, Suite};

use crate::error::SuiteLoadError;

/// Cross-field checks serde's derive cannot express on its own: suites
/// that deserialize cleanly can still violate the descriptor's invariants.
pub fn validate_suite(suite: &Suite) -> Result<(), SuiteLoadError> {
    if suite.id.trim().is_empty() {
        return Err(SuiteLoadError::SchemaViolation {
            field: "id".to_string(),
            issue: "must not be empty".to_string(),
        });
    }

    if suite.config.models.is_empty() {
        return Err(SuiteLoadError::SchemaViolation {
            field: "config.models".to_string(),
            issue: "must list at least one model".to_string(),
        });
    }

    for model in &suite.config.models {
        validate_model_id(model)?;
    }

    if suite.config.runs < 1 {
        return Err(SuiteLoadError::SchemaViolation {
            field: "config.runs".to_string(),
            issue: "must be at least 1".to_string(),
        });
    }

    if suite.tests.is_empty() {
        return Err(SuiteLoadError::SchemaViolation {
            field: "tests".to_string(),
            issue: "suite must declare at least one test".to_string(),
        });
    }

    let mut seen_ids = HashSet::new();
    for test in &suite.tests {
        if test.scenarios.is_empty() {
            return Err(SuiteLoadError::SchemaViolation {
                field: format!("tests[agent={}].scenarios", test.agent),
                issue: "must declare at least one scenario".to_string(),
            });
        }
        for scenario in &test.scenarios {
            if scenario.id.trim().is_empty() {
                return Err(SuiteLoadError::SchemaViolation {
                    field: format!("tests[agent={}].scenarios[].id", test.agent),
                    issue: "scenario id must not be empty".to_string(),
                });
            }
            if !seen_ids.insert(scenario.id.clone()) {
                return Err(SuiteLoadError::SchemaViolation {
                    field: "tests[].scenarios[].id".to_string(),
                    issue: format!("duplicate scenario id '{}'", scenario.id),
                });
            }
        }
    }

    Ok(())
}

fn validate_model_id(model: &ModelId) -> Result<(), SuiteLoadError> {
    let raw = model.as_str();
    let mut parts = raw.splitn(2, ':');
    let provider = parts.next().unwrap_or_default();
    let name = parts.next().unwrap_or_default();
    if provider.trim().is_empty() || name.trim().is_empty() {
        return Err(SuiteLoadError::InvalidModelId {
            raw: raw.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentuse_model::suite::{Scenario, SuiteConfig, Test};

    fn base_suite() -> Suite {
        Suite {
            id: "smoke".to_string(),
            name: "Smoke".to_string(),
            config: SuiteConfig {
                models: vec![ModelId::new("openai:gpt-5")],
                runs: 1,
            },
            tests: vec![Test {
                agent: "agent.md".to_string(),
                scenarios: vec![Scenario {
                    id: "s1".to_string(),
                    name: "first".to_string(),
                    difficulty: None,
                    input: "do it".to_string(),
                    expected: None,
                }],
            }],
        }
    }

    #[test]
    fn accepts_a_well_formed_suite() {
        assert!(validate_suite(&base_suite()).is_ok());
    }

    #[test]
    fn rejects_an_empty_models_list() {
        let mut suite = base_suite();
        suite.config.models.clear();
        let error = validate_suite(&suite).unwrap_err();
        assert!(matches!(error, SuiteLoadError::SchemaViolation { field, .. } if field == "config.models"));
    }

    #[test]
    fn rejects_a_model_id_without_a_provider_prefix() {
        let mut suite = base_suite();
        suite.config.models = vec![ModelId::new("no-colon-here")];
        let error = validate_suite(&suite).unwrap_err();
        assert!(matches!(error, SuiteLoadError::InvalidModelId { .. }));
    }

    #[test]
    fn rejects_duplicate_scenario_ids_across_tests() {
        let mut suite = base_suite();
        let duplicate = suite.tests[0].scenarios[0].clone();
        suite.tests.push(Test {
            agent: "other.md".to_string(),
            scenarios: vec![duplicate],
        });
        let error = validate_suite(&suite).unwrap_err();
        assert!(matches!(error, SuiteLoadError::SchemaViolation { field, .. } if field == "tests[].scenarios[].id"));
    }

    #[test]
    fn rejects_zero_runs() {
        let mut suite = base_suite();
        suite.config.runs = 0;
        let error = validate_suite(&suite).unwrap_err();
        assert!(matches!(error, SuiteLoadError::SchemaViolation { field, .. } if field == "config.runs"));
    }
}
