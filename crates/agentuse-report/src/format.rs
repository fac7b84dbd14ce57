//! Numeric formatting contracts shared by the Markdown and HTML renderers
//! (SPEC §4.E). Kept separate from the renderers so both views format a
//! given duration, cost, percentage or token count identically.

/// `{ms}ms` under one second, one decimal of seconds under a minute, else
/// `XmYs`.
pub fn format_duration_ms(duration_ms: u64) -> String {
    if duration_ms < 1_000 {
        format!("{duration_ms}ms")
    } else if duration_ms < 60_000 {
        format!("{:.1}s", duration_ms as f64 / 1_000.0)
    } else {
        let total_seconds = duration_ms / 1_000;
        format!("{}m {}s", total_seconds / 60, total_seconds % 60)
    }
}

/// Four decimals under a cent, three under a dollar, two otherwise.
pub fn format_cost_usd(cost_usd: f64) -> String {
    let magnitude = cost_usd.abs();
    if magnitude < 0.01 {
        format!("${cost_usd:.4}")
    } else if magnitude < 1.0 {
        format!("${cost_usd:.3}")
    } else {
        format!("${cost_usd:.2}")
    }
}

/// One decimal place; `fraction` is `0.0..=1.0`.
pub fn format_percentage(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// `K`/`M` suffixes with one decimal above 1 000 and 1 000 000.
pub fn format_token_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_switches_units_at_the_second_and_minute_boundaries() {
        assert_eq!(format_duration_ms(500), "500ms");
        assert_eq!(format_duration_ms(12_300), "12.3s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn cost_precision_narrows_as_magnitude_grows() {
        assert_eq!(format_cost_usd(0.0042), "$0.0042");
        assert_eq!(format_cost_usd(0.42), "$0.420");
        assert_eq!(format_cost_usd(4.2), "$4.20");
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(format_percentage(0.42345), "42.3%");
    }

    #[test]
    fn token_counts_use_k_and_m_suffixes() {
        assert_eq!(format_token_count(999), "999");
        assert_eq!(format_token_count(1_500), "1.5K");
        assert_eq!(format_token_count(2_300_000), "2.3M");
    }
}
