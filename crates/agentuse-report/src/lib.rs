//! Aggregator & Reporter: rolls raw [`agentuse_model::TrialResult`]s up
//! into per-scenario/agent/model aggregates, ranks the models, and
//! renders the suite's JSON/Markdown/HTML report artifacts.

pub mod aggregate;
pub mod error;
pub mod format;
pub mod render;
pub mod report_data;
pub mod write;

pub use aggregate::{
    aggregate_agent, aggregate_model, aggregate_scenario, apply_relative_efficiency, rank_models,
};
pub use error::ReportError;
pub use format::{format_cost_usd, format_duration_ms, format_percentage, format_token_count};
pub use render::{render_html, render_json, render_markdown};
pub use report_data::{build_report_data, ModelReportSection, ReportData};
pub use write::{write_report_files, ReportFilePaths};
