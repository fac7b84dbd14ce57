use thiserror::Error;

/// Errors writing a rendered report's artifacts to disk. The in-memory
/// `SuiteResult`/`ReportData` is always returned to the caller regardless
/// of whether persistence succeeds (SPEC §7 reporter I/O policy).
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report artifact: {0}")]
    Write(#[from] anyhow::Error),
}
