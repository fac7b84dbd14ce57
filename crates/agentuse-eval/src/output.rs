use agentuse_llm::{ChatRequest, LlmClient, Message};
use agentuse_model::{OutputResult, OutputValidation};
use regex::RegexBuilder;

/// Default judge model used when a `llm-judge` validation omits `model`.
pub const DEFAULT_JUDGE_MODEL: &str = "anthropic:claude-3-5-sonnet-latest";

/// Scores a trial's final output text against its declared validation
/// strategy. Never returns an error: a malformed regex or an unparseable
/// judge response is folded into `valid = false` with a diagnostic in
/// `validation_details`, per the evaluator's "never fatal" contract.
pub async fn validate_output(
    validation: &OutputValidation,
    output_text: &str,
    judge: &dyn LlmClient,
) -> OutputResult {
    let (valid, validation_details) = match validation {
        OutputValidation::Contains { values } => validate_contains(output_text, values),
        OutputValidation::Regex { pattern } => validate_regex(output_text, pattern),
        OutputValidation::LlmJudge { criteria, model } => {
            validate_llm_judge(output_text, criteria, model.as_deref(), judge).await
        }
    };
    OutputResult {
        text: output_text.to_string(),
        valid,
        validation_details,
    }
}

fn validate_contains(output_text: &str, values: &[String]) -> (bool, Vec<String>) {
    let haystack = output_text.to_lowercase();
    let missing: Vec<String> = values
        .iter()
        .filter(|value| !haystack.contains(&value.to_lowercase()))
        .cloned()
        .collect();
    (missing.is_empty(), missing)
}

fn validate_regex(output_text: &str, pattern: &str) -> (bool, Vec<String>) {
    match RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
    {
        Ok(regex) => {
            let matched = regex.is_match(output_text);
            let details = if matched {
                Vec::new()
            } else {
                vec![format!("output did not match pattern '{pattern}'")]
            };
            (matched, details)
        }
        Err(error) => (
            false,
            vec![format!("invalid regex pattern '{pattern}': {error}")],
        ),
    }
}

async fn validate_llm_judge(
    output_text: &str,
    criteria: &str,
    model: Option<&str>,
    judge: &dyn LlmClient,
) -> (bool, Vec<String>) {
    let model = model.unwrap_or(DEFAULT_JUDGE_MODEL).to_string();
    let prompt = format!(
        "You are grading an AI agent's output against a rubric.\n\n\
         Output:\n{output_text}\n\n\
         Criteria:\n{criteria}\n\n\
         Respond with exactly one JSON object of the form \
         {{\"pass\": boolean, \"reasoning\": string}} and nothing else."
    );
    let request = ChatRequest {
        model,
        messages: vec![Message::user(prompt)],
        tools: Vec::new(),
        tool_choice: None,
        json_mode: true,
        max_tokens: Some(512),
        temperature: Some(0.0),
    };

    let response = match judge.complete(request).await {
        Ok(response) => response,
        Err(error) => return (false, vec![format!("judge request failed: {error}")]),
    };

    match extract_judge_verdict(&response.message.text_content()) {
        Some((pass, reasoning)) => (pass, vec![reasoning]),
        None => (
            false,
            vec![format!(
                "judge response was not a parseable verdict: {}",
                response.message.text_content()
            )],
        ),
    }
}

/// Tolerant extractor: finds the first balanced `{...}` block in `raw`
/// and decodes it as `{pass, reasoning}`, ignoring any surrounding prose
/// a judge model adds despite being asked for bare JSON.
fn extract_judge_verdict(raw: &str) -> Option<(bool, String)> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut end = None;
    for (offset, ch) in raw[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + offset + 1);
                    break;
                }
            }
            _ => {}
        }
    }
    let block = &raw[start..end?];
    let value: serde_json::Value = serde_json::from_str(block).ok()?;
    let pass = value.get("pass")?.as_bool()?;
    let reasoning = value
        .get("reasoning")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    Some((pass, reasoning))
}
