use agentuse_llm::{ContentBlock, Message, MessageRole};

pub const GOAL_TRACKING_SYSTEM_PROMPT: &str = "Before starting any multi-step piece of work, call \
benchmark__declare_goal with a short name for it. Once you finish that piece of work, call \
benchmark__complete_goal with the same name and whether it succeeded. Declare and complete every \
goal you work on, one at a time.";

const CONTEXT_SUMMARY_PREFIX: &str = "[context truncated]";
const CONTEXT_SUMMARY_MAX_EXCERPTS: usize = 6;
const CONTEXT_SUMMARY_SNIPPET_MAX_CHARS: usize = 160;
const CONTEXT_SUMMARY_MAX_CHARS: usize = 2000;

pub fn system_messages(instructions: &str) -> Vec<Message> {
    vec![
        Message::system(instructions.to_string()),
        Message::system(GOAL_TRACKING_SYSTEM_PROMPT.to_string()),
    ]
}

/// Keeps the message list under `max_messages` by collapsing the oldest
/// dropped turns into a single synthetic system summary, preserving a
/// leading system message and the most recent turns verbatim.
pub fn bounded_messages(messages: &[Message], max_messages: usize) -> Vec<Message> {
    if max_messages == 0 || messages.len() <= max_messages {
        return messages.to_vec();
    }
    if max_messages < 3 {
        return messages[messages.len() - max_messages..].to_vec();
    }

    let leading_system = matches!(
        messages.first().map(|message| message.role),
        Some(MessageRole::System)
    );
    let tail_keep = if leading_system {
        max_messages - 2
    } else {
        max_messages - 1
    };
    let tail_start = messages.len().saturating_sub(tail_keep);
    if tail_start <= usize::from(leading_system) {
        return messages.to_vec();
    }

    let dropped_start = usize::from(leading_system);
    let dropped = &messages[dropped_start..tail_start];
    let mut bounded = Vec::with_capacity(max_messages);
    if leading_system {
        bounded.push(messages[0].clone());
    }
    bounded.push(Message::system(summarize_dropped_messages(dropped)));
    bounded.extend_from_slice(&messages[tail_start..]);
    bounded
}

fn summarize_dropped_messages(messages: &[Message]) -> String {
    let mut excerpts = Vec::new();
    for message in messages {
        let text = message.text_content();
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() || excerpts.len() >= CONTEXT_SUMMARY_MAX_EXCERPTS {
            continue;
        }
        excerpts.push(format!(
            "- {}: {}",
            role_label(message.role),
            truncate_chars(&collapsed, CONTEXT_SUMMARY_SNIPPET_MAX_CHARS)
        ));
    }

    let mut summary = format!(
        "{CONTEXT_SUMMARY_PREFIX} summarized {} earlier messages.",
        messages.len()
    );
    if !excerpts.is_empty() {
        summary.push('\n');
        summary.push_str(&excerpts.join("\n"));
    }
    truncate_chars(&summary, CONTEXT_SUMMARY_MAX_CHARS)
}

fn role_label(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::Tool => "tool",
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncate_at = text
        .char_indices()
        .nth(max_chars.saturating_sub(1))
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    let mut truncated = text[..truncate_at].to_string();
    truncated.push('…');
    truncated
}

/// Extracts the final assistant message's concatenated text content, the
/// value the evaluator scores against.
pub fn final_assistant_text(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .find(|message| message.role == MessageRole::Assistant)
        .map(|message| message.text_content())
        .unwrap_or_default()
}

pub fn has_pending_tool_calls(message: &Message) -> bool {
    message
        .content
        .iter()
        .any(|block| matches!(block, ContentBlock::ToolCall { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_the_limit_is_returned_unchanged() {
        let messages = vec![Message::system("s"), Message::user("u")];
        assert_eq!(bounded_messages(&messages, 10), messages);
    }

    #[test]
    fn over_the_limit_collapses_the_middle_and_keeps_the_leading_system_message() {
        let mut messages = vec![Message::system("instructions")];
        for index in 0..10 {
            messages.push(Message::user(format!("turn {index}")));
        }
        let bounded = bounded_messages(&messages, 5);
        assert_eq!(bounded.len(), 5);
        assert_eq!(bounded[0].role, MessageRole::System);
        assert!(bounded[1].text_content().contains("context truncated"));
    }

    #[test]
    fn final_assistant_text_ignores_trailing_tool_messages() {
        let messages = vec![
            Message::assistant_text("the answer is 42"),
            Message::tool_result("call-1", "search", "result", false),
        ];
        assert_eq!(final_assistant_text(&messages), "the answer is 42");
    }
}
