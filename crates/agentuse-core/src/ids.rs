use std::sync::atomic::{AtomicU64, Ordering};

/// Generates a fresh v4 UUID, used both for the `{{$uuid}}` dynamic
/// scenario variable and for request ids handed to external collaborators
/// (LLM clients, MCP servers).
pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generates eight lowercase hexadecimal characters from a cryptographic
/// RNG, used for the `{{$randomHex}}` dynamic scenario variable.
pub fn new_random_hex() -> String {
    let bytes: [u8; 4] = rand::random();
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Builds a monotonically-sortable run id from the current millisecond
/// timestamp plus a random suffix, so two runs started in the same
/// process within the same millisecond still sort distinctly and never
/// collide on disk.
pub fn new_run_id(now_unix_ms: u64) -> String {
    format!("{now_unix_ms:013}-{}", new_random_hex())
}

/// A process-local monotonic counter used to mint goal ids within one
/// trial. Goal ids only need to be unique within a single trial's
/// `GoalTracker`, so a simple atomic counter (rather than a UUID) keeps
/// them short and sortable by declaration order.
#[derive(Debug, Default)]
pub struct MonotonicIdSource {
    next: AtomicU64,
}

impl MonotonicIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self, prefix: &str) -> String {
        let value = self.next.fetch_add(1, Ordering::SeqCst);
        format!("{prefix}-{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uuid_produces_distinct_well_formed_values() {
        let first = new_uuid();
        let second = new_uuid();
        assert_ne!(first, second);
        assert_eq!(first.len(), 36);
        assert_eq!(first.chars().filter(|c| *c == '-').count(), 4);
    }

    #[test]
    fn new_random_hex_produces_eight_lowercase_hex_chars() {
        let hex = new_random_hex();
        assert_eq!(hex.len(), 8);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn monotonic_id_source_increments_without_reuse() {
        let source = MonotonicIdSource::new();
        let first = source.next_id("goal");
        let second = source.next_id("goal");
        assert_ne!(first, second);
        assert!(first.starts_with("goal-"));
    }
}
