use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use agentuse_model::suite::{Agent, Suite};

use crate::agent_file::load_agent_file;
use crate::error::SuiteLoadError;
use crate::resolve::resolve_suite_path;
use crate::validate::validate_suite;

/// Loads suite descriptors and the agent files they reference.
///
/// Agents are cached by their canonicalized source path: a suite that
/// references the same agent file from more than one `Test` entry loads
/// it once. The cache is internal to one loader instance, not shared
/// across suites.
pub struct SuiteLoader {
    project_suites_dir: PathBuf,
    builtin_examples_dir: PathBuf,
    agent_cache: Mutex<HashMap<PathBuf, Agent>>,
}

/// A suite together with every agent its tests reference, keyed by the
/// `Test::agent` path as written in the suite file.
#[derive(Debug)]
pub struct LoadedSuite {
    pub suite: Suite,
    pub agents: HashMap<String, Agent>,
}

impl SuiteLoader {
    pub fn new(project_suites_dir: impl Into<PathBuf>, builtin_examples_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_suites_dir: project_suites_dir.into(),
            builtin_examples_dir: builtin_examples_dir.into(),
            agent_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn load(&self, requested: &str) -> Result<LoadedSuite, SuiteLoadError> {
        let suite_path =
            resolve_suite_path(requested, &self.project_suites_dir, &self.builtin_examples_dir)?;
        let raw = std::fs::read_to_string(&suite_path).map_err(|source| {
            SuiteLoadError::AgentLoadError {
                agent_path: suite_path.display().to_string(),
                source: anyhow::Error::new(source),
            }
        })?;
        let suite: Suite =
            serde_yaml::from_str(&raw).map_err(|source| SuiteLoadError::SchemaViolation {
                field: "<root>".to_string(),
                issue: source.to_string(),
            })?;
        validate_suite(&suite)?;

        let suite_dir = suite_path.parent().unwrap_or_else(|| Path::new("."));
        let mut agents = HashMap::new();
        for test in &suite.tests {
            if agents.contains_key(&test.agent) {
                continue;
            }
            let agent = self.load_agent_cached(suite_dir, &test.agent)?;
            agents.insert(test.agent.clone(), agent);
        }

        Ok(LoadedSuite { suite, agents })
    }

    fn load_agent_cached(&self, suite_dir: &Path, relative_path: &str) -> Result<Agent, SuiteLoadError> {
        let agent_path = suite_dir.join(relative_path);
        let canonical = agent_path
            .canonicalize()
            .unwrap_or_else(|_| agent_path.clone());

        if let Some(agent) = self.agent_cache.lock().unwrap().get(&canonical) {
            return Ok(agent.clone());
        }

        let agent = load_agent_file(&agent_path).map_err(|source| SuiteLoadError::AgentLoadError {
            agent_path: agent_path.display().to_string(),
            source,
        })?;

        self.agent_cache
            .lock()
            .unwrap()
            .insert(canonical, agent.clone());
        Ok(agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_suite(dir: &Path) {
        fs::write(
            dir.join("smoke.suite.yaml"),
            r#"
id: smoke
name: Smoke
config:
  models:
    - "openai:gpt-5"
  runs: 1
tests:
  - agent: agent.md
    scenarios:
      - id: s1
        name: first
        input: do it
"#,
        )
        .unwrap();
        fs::write(
            dir.join("agent.md"),
            "---\nmodel: ${model}\n---\nYou are a helpful agent.\n",
        )
        .unwrap();
    }

    #[test]
    fn loads_a_suite_and_its_referenced_agent() {
        let project = tempfile::tempdir().expect("tempdir");
        write_suite(project.path());
        let builtin = tempfile::tempdir().expect("tempdir");

        let loader = SuiteLoader::new(project.path(), builtin.path());
        let loaded = loader.load("smoke").expect("load");

        assert_eq!(loaded.suite.id, "smoke");
        assert_eq!(loaded.agents.len(), 1);
        assert_eq!(loaded.agents["agent.md"].config.model, "${model}");
    }

    #[test]
    fn caches_an_agent_referenced_by_two_tests() {
        let project = tempfile::tempdir().expect("tempdir");
        fs::write(
            project.path().join("two.suite.yaml"),
            r#"
id: two
name: Two
config:
  models:
    - "openai:gpt-5"
  runs: 1
tests:
  - agent: agent.md
    scenarios:
      - id: s1
        name: first
        input: do it
  - agent: agent.md
    scenarios:
      - id: s2
        name: second
        input: do it again
"#,
        )
        .unwrap();
        fs::write(
            project.path().join("agent.md"),
            "---\nmodel: ${model}\n---\nYou are a helpful agent.\n",
        )
        .unwrap();
        let builtin = tempfile::tempdir().expect("tempdir");

        let loader = SuiteLoader::new(project.path(), builtin.path());
        let loaded = loader.load("two").expect("load");
        assert_eq!(loaded.agents.len(), 1);
        assert_eq!(loader.agent_cache.lock().unwrap().len(), 1);
    }

    #[test]
    fn surfaces_schema_violations_from_an_invalid_suite() {
        let project = tempfile::tempdir().expect("tempdir");
        fs::write(
            project.path().join("bad.suite.yaml"),
            r#"
id: bad
name: Bad
config:
  models: []
  runs: 1
tests: []
"#,
        )
        .unwrap();
        let builtin = tempfile::tempdir().expect("tempdir");
        let loader = SuiteLoader::new(project.path(), builtin.path());
        let error = loader.load("bad").unwrap_err();
        assert!(matches!(error, SuiteLoadError::SchemaViolation { .. }));
    }
}
