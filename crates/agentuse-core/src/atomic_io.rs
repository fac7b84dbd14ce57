use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::time_utils::current_unix_timestamp;

/// Writes text using a temp file + rename so readers never observe partial data.
pub fn write_text_atomic(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("destination path cannot be empty");
    }
    if path.exists() && path.is_dir() {
        bail!("destination path '{}' is a directory", path.display());
    }

    let parent_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent_dir)
        .with_context(|| format!("failed to create {}", parent_dir.display()))?;

    let temp_name = format!(
        ".{}.tmp-{}-{}",
        path.file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("report"),
        std::process::id(),
        current_unix_timestamp()
    );
    let temp_path = parent_dir.join(temp_name);
    std::fs::write(&temp_path, content)
        .with_context(|| format!("failed to write temporary file {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path).with_context(|| {
        format!(
            "failed to rename temporary file {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;
    Ok(())
}

/// Serializes `value` as pretty JSON and writes it atomically.
///
/// Used by the reporter: the JSON artifact is the canonical form, so it
/// must never be observed half-written by a concurrent reader.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize JSON")?;
    write_text_atomic(path, &rendered)
}

/// Recursively removes `path` if it exists, tolerating a path that is
/// already gone. Used to tear down per-trial scratch directories on every
/// exit path, including ones where the directory was never created.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => {
            Err(error).with_context(|| format!("failed to remove {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn write_text_atomic_writes_content() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("sample.txt");
        write_text_atomic(&path, "hello world").expect("write");
        let contents = read_to_string(&path).expect("read");
        assert_eq!(contents, "hello world");
    }

    #[test]
    fn write_json_atomic_round_trips_pretty_json() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("sample.json");
        let value = Sample {
            name: "demo".to_string(),
            count: 3,
        };
        write_json_atomic(&path, &value).expect("write");
        let parsed: serde_json::Value =
            serde_json::from_str(&read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(parsed["name"], "demo");
        assert_eq!(parsed["count"], 3);
    }

    #[test]
    fn remove_dir_all_if_exists_tolerates_missing_path() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let missing = tempdir.path().join("never-created");
        remove_dir_all_if_exists(&missing).expect("missing dir should not error");
    }

    #[test]
    fn remove_dir_all_if_exists_removes_existing_tree() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let scratch = tempdir.path().join("scratch");
        std::fs::create_dir_all(scratch.join("nested")).expect("create");
        std::fs::write(scratch.join("nested/file.txt"), "data").expect("write");
        remove_dir_all_if_exists(&scratch).expect("remove");
        assert!(!scratch.exists());
    }
}
