//! Foundational low-level utilities shared across AgentUse benchmark crates.
//!
//! Provides atomic file-write helpers, injectable time sources, id
//! generation, and run-log rotation used throughout suite loading, trial
//! execution, and report generation.

pub mod atomic_io;
pub mod ids;
pub mod log_rotation;
pub mod run_events;
pub mod time_utils;

pub use atomic_io::{remove_dir_all_if_exists, write_json_atomic, write_text_atomic};
pub use ids::{new_random_hex, new_run_id, new_uuid, MonotonicIdSource};
pub use log_rotation::{append_line_with_rotation, LogRotationPolicy};
pub use run_events::{RunEventLog, RunEventRecord};
pub use time_utils::{
    current_unix_timestamp, current_unix_timestamp_ms, is_expired_unix, system_clock, Clock,
    FixedClock, SharedClock, SystemClock,
};
