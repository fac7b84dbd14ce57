use agentuse_core::ids::{new_random_hex, new_uuid};
use agentuse_core::time_utils::SharedClock;

/// Expands the dynamic scenario-input placeholders `{{$uuid}}`,
/// `{{$timestamp}}`, and `{{$randomHex}}` in place. Any other `{{$...}}`
/// form is left untouched, per the static/dynamic substitution split.
pub fn substitute_dynamic_variables(input: &str, clock: &SharedClock) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("{{$") {
        let Some(end_offset) = rest[start..].find("}}") else {
            output.push_str(rest);
            return output;
        };
        let end = start + end_offset + 2;
        output.push_str(&rest[..start]);
        let name = &rest[start + 3..start + end_offset];
        match name {
            "uuid" => output.push_str(&new_uuid()),
            "timestamp" => output.push_str(&clock.now_iso8601()),
            "randomHex" => output.push_str(&new_random_hex()),
            _ => output.push_str(&rest[start..end]),
        }
        rest = &rest[end..];
    }
    output.push_str(rest);
    output
}
