use agentuse_model::{Agent, AgentConfig, McpServerSpec};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Shape of the YAML front-matter block, before it is folded into
/// [`AgentConfig`]. `instructions` is not part of the front-matter; it is
/// the body text that follows the closing `---`.
#[derive(Debug, Deserialize)]
struct FrontMatter {
    model: String,
    #[serde(default)]
    max_steps: Option<u32>,
    #[serde(default)]
    mcp_servers: BTreeMap<String, McpServerDecl>,
}

#[derive(Debug, Deserialize)]
struct McpServerDecl {
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
}

/// Parses an agent definition file: an optional `---`-delimited YAML
/// front-matter block followed by a body used as the agent's
/// instructions. Only the fields the core requires (`model`,
/// `maxSteps`, `mcpServers`) are extracted; everything else in the
/// front-matter is a collaborator's concern and is ignored here.
pub fn parse_agent_file(source_path: &str, raw: &str) -> Result<Agent> {
    let (front_matter_raw, instructions) = split_front_matter(raw)
        .with_context(|| format!("agent file '{source_path}' has no front-matter block"))?;

    let front_matter: FrontMatter = serde_yaml::from_str(front_matter_raw)
        .with_context(|| format!("agent file '{source_path}' has invalid front-matter"))?;

    if front_matter.model.trim().is_empty() {
        bail!("agent file '{source_path}' is missing a model");
    }

    let mcp_servers = front_matter
        .mcp_servers
        .into_iter()
        .map(|(name, decl)| McpServerSpec {
            name,
            command: decl.command,
            args: decl.args,
            env: decl.env,
        })
        .collect();

    Ok(Agent {
        source_path: source_path.to_string(),
        config: AgentConfig {
            model: front_matter.model,
            max_steps: front_matter.max_steps,
            mcp_servers,
            instructions: instructions.trim().to_string(),
        },
    })
}

pub fn load_agent_file(path: &Path) -> Result<Agent> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read agent file {}", path.display()))?;
    parse_agent_file(&path.display().to_string(), &raw)
}

fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let end = rest.find("\n---")?;
    let front_matter = &rest[..end];
    let after_marker = &rest[end + 4..];
    let body = after_marker.strip_prefix('\n').unwrap_or(after_marker);
    Some((front_matter, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "---\nmodel: ${model}\nmaxSteps: 20\nmcpServers:\n  fs:\n    command: node\n    args: [\"server.js\"]\n---\nYou are a helpful agent.\n";

    #[test]
    fn parses_model_max_steps_and_mcp_servers_from_front_matter() {
        let agent = parse_agent_file("agents/demo.md", SAMPLE).expect("parse");
        assert_eq!(agent.config.model, "${model}");
        assert_eq!(agent.config.max_steps, Some(20));
        assert_eq!(agent.config.mcp_servers.len(), 1);
        assert_eq!(agent.config.mcp_servers[0].command, "node");
        assert_eq!(agent.config.instructions, "You are a helpful agent.");
    }

    #[test]
    fn rejects_a_file_with_no_front_matter_block() {
        let error = parse_agent_file("agents/demo.md", "no front matter here").unwrap_err();
        assert!(error.to_string().contains("no front-matter block"));
    }

    #[test]
    fn rejects_an_empty_model_field() {
        let raw = "---\nmodel: \"\"\n---\nbody\n";
        let error = parse_agent_file("agents/demo.md", raw).unwrap_err();
        assert!(error.to_string().contains("missing a model"));
    }
}
