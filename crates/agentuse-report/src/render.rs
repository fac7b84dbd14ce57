//! Renders a [`ReportData`] record into the suite's three output
//! artifacts. Every function here is pure: no I/O, no clock reads — the
//! intermediate record already carries `generated_at`.

use std::fmt::Write as _;

use crate::format::{format_cost_usd, format_duration_ms, format_percentage, format_token_count};
use crate::report_data::ReportData;

/// JSON is the canonical, verbatim serialization of the intermediate
/// record.
pub fn render_json(data: &ReportData) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}

pub fn render_markdown(data: &ReportData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} ({})", data.suite_id, data.run_id);
    let _ = writeln!(out, "\nGenerated at {}\n", data.generated_at);

    let _ = writeln!(out, "## Ranking\n");
    let _ = writeln!(out, "| Rank | Model | Overall score |");
    let _ = writeln!(out, "|---|---|---|");
    for ranked in &data.ranking {
        let _ = writeln!(out, "| {} | {} | {:.2} |", ranked.rank, ranked.model, ranked.overall_score);
    }

    for section in &data.models {
        let _ = writeln!(out, "\n## {}\n", section.model);
        let _ = writeln!(out, "| Metric | Value |");
        let _ = writeln!(out, "|---|---|");
        let _ = writeln!(
            out,
            "| Completion rate | {} |",
            format_percentage(section.aggregate.completion_rate)
        );
        let _ = writeln!(out, "| Pass@k | {} |", format_percentage(section.aggregate.pass_k));
        let _ = writeln!(
            out,
            "| Consistency | {} |",
            format_percentage(section.aggregate.consistency)
        );
        let _ = writeln!(
            out,
            "| Efficiency | {} |",
            format_percentage(section.aggregate.efficiency)
        );
        let _ = writeln!(out, "| Overall score | {:.2} |", section.aggregate.overall_score);

        for agent in &section.agents {
            let _ = writeln!(out, "\n### {}\n", agent.agent_path);
            let _ = writeln!(out, "| Scenario | n | Completion | Pass@k | Latency (mean) | Cost (mean) |");
            let _ = writeln!(out, "|---|---|---|---|---|---|");
            for scenario in &agent.scenarios {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} | {} |",
                    scenario.name,
                    scenario.aggregate.n,
                    format_percentage(scenario.aggregate.completion_rate),
                    format_percentage(scenario.aggregate.pass_k),
                    format_duration_ms(scenario.aggregate.latency.mean_ms as u64),
                    scenario
                        .aggregate
                        .cost_mean_usd
                        .map(format_cost_usd)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }

        if !section.errors.counts_by_category.is_empty() {
            let _ = writeln!(out, "\n### Errors\n");
            let _ = writeln!(out, "| Category | Count |");
            let _ = writeln!(out, "|---|---|");
            for (category, count) in &section.errors.counts_by_category {
                let _ = writeln!(out, "| {category:?} | {count} |");
            }
            for detail in &section.errors.detailed {
                let _ = writeln!(
                    out,
                    "- `{}` trial {} ({:?}): {}",
                    detail.scenario_id, detail.trial_number, detail.category, detail.message
                );
            }
            if section.errors.overflow_count > 0 {
                let _ = writeln!(out, "- …and {} more", section.errors.overflow_count);
            }
        }
    }

    out
}

pub fn render_html(data: &ReportData) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{} ({})</title>", escape_html(&data.suite_id), escape_html(&data.run_id));
    out.push_str(
        "<style>\
body{font-family:system-ui,sans-serif;margin:2rem;color:#1a1a1a}\
table{border-collapse:collapse;margin-bottom:1.5rem;width:100%}\
th,td{border:1px solid #ccc;padding:0.4rem 0.6rem;text-align:left}\
th{background:#f3f3f3}\
h1,h2,h3{margin-top:2rem}\
</style>\n</head>\n<body>\n",
    );
    let _ = writeln!(out, "<h1>{} ({})</h1>", escape_html(&data.suite_id), escape_html(&data.run_id));
    let _ = writeln!(out, "<p>Generated at {}</p>", escape_html(&data.generated_at));

    out.push_str("<h2>Ranking</h2>\n<table><tr><th>Rank</th><th>Model</th><th>Overall score</th></tr>\n");
    for ranked in &data.ranking {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td></tr>",
            ranked.rank,
            escape_html(&ranked.model.to_string()),
            ranked.overall_score
        );
    }
    out.push_str("</table>\n");

    for section in &data.models {
        let _ = writeln!(out, "<h2>{}</h2>", escape_html(&section.model.to_string()));
        out.push_str("<table>");
        let _ = writeln!(
            out,
            "<tr><td>Completion rate</td><td>{}</td></tr>",
            format_percentage(section.aggregate.completion_rate)
        );
        let _ = writeln!(
            out,
            "<tr><td>Pass@k</td><td>{}</td></tr>",
            format_percentage(section.aggregate.pass_k)
        );
        let _ = writeln!(
            out,
            "<tr><td>Efficiency</td><td>{}</td></tr>",
            format_percentage(section.aggregate.efficiency)
        );
        let _ = writeln!(
            out,
            "<tr><td>Overall score</td><td>{:.2}</td></tr>",
            section.aggregate.overall_score
        );
        out.push_str("</table>\n");

        for agent in &section.agents {
            let _ = writeln!(out, "<h3>{}</h3>", escape_html(&agent.agent_path));
            out.push_str(
                "<table><tr><th>Scenario</th><th>n</th><th>Completion</th><th>Pass@k</th><th>Latency</th><th>Tokens/success</th></tr>\n",
            );
            for scenario in &agent.scenarios {
                let _ = writeln!(
                    out,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_html(&scenario.name),
                    scenario.aggregate.n,
                    format_percentage(scenario.aggregate.completion_rate),
                    format_percentage(scenario.aggregate.pass_k),
                    format_duration_ms(scenario.aggregate.latency.mean_ms as u64),
                    format_token_count(scenario.aggregate.token_efficiency.total_per_success as u64),
                );
            }
            out.push_str("</table>\n");
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
