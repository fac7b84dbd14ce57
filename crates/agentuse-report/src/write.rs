//! Persists a rendered report's three artifacts under a run's output
//! directory, named `{suiteId}-{runId}.{ext}` (SPEC §6). The JSON file is
//! written atomically since it is the canonical form; Markdown and HTML
//! are views and use the same atomic-write discipline for consistency.

use std::path::{Path, PathBuf};

use agentuse_core::{write_json_atomic, write_text_atomic};

use crate::error::ReportError;
use crate::render::{render_html, render_markdown};
use crate::report_data::ReportData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilePaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
    pub html: PathBuf,
}

pub fn write_report_files(data: &ReportData, output_dir: &Path) -> Result<ReportFilePaths, ReportError> {
    let base = format!("{}-{}", data.suite_id, data.run_id);
    let paths = ReportFilePaths {
        json: output_dir.join(format!("{base}.json")),
        markdown: output_dir.join(format!("{base}.md")),
        html: output_dir.join(format!("{base}.html")),
    };

    write_json_atomic(&paths.json, data)?;
    write_text_atomic(&paths.markdown, &render_markdown(data))?;
    write_text_atomic(&paths.html, &render_html(data))?;

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReportData {
        ReportData {
            suite_id: "suite-1".to_string(),
            run_id: "run-1".to_string(),
            generated_at: "2026-01-01T00:00:00.000Z".to_string(),
            models: vec![],
            ranking: vec![],
        }
    }

    #[test]
    fn writes_all_three_artifacts_with_the_suite_and_run_id_stem() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = write_report_files(&sample(), dir.path()).expect("write");
        assert!(paths.json.ends_with("suite-1-run-1.json"));
        assert!(paths.json.exists());
        assert!(paths.markdown.exists());
        assert!(paths.html.exists());
    }
}
