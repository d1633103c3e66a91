//! Dashboard page.
//!
//! The page is rendered with the current summary filled in, then polls
//! `/stats/summary` every 30 seconds on its own.

use axum::{extract::State, response::Html};

use extstats_core::Summary;

use crate::app_state::AppState;

const TEMPLATE: &str = include_str!("index.html");

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render(&state.store().summary().await))
}

pub fn render(summary: &Summary) -> String {
    // Summary is three integers; serializing it cannot fail
    let summary_json = serde_json::to_string(summary).unwrap_or_else(|_| "{}".into());
    TEMPLATE
        .replace("{{installations}}", &format_compact(summary.install_count))
        .replace("{{filtered_results}}", &format_compact(summary.filtered_result_count))
        .replace("{{summary_json}}", &summary_json)
}

/// `1234 -> "1.2K"`, `2500000 -> "2.5M"`, one decimal, half rounds up
/// (same output as the page's `toFixed(1)`).
pub fn format_compact(n: u64) -> String {
    let (div, suffix) = match n {
        n if n >= 1_000_000 => (1_000_000u128, "M"),
        n if n >= 1_000 => (1_000u128, "K"),
        n => return n.to_string(),
    };
    let tenths = (n as u128 * 10 + div / 2) / div;
    format!("{}.{}{}", tenths / 10, tenths % 10, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_formatting() {
        assert_eq!(format_compact(0), "0");
        assert_eq!(format_compact(999), "999");
        assert_eq!(format_compact(1_000), "1.0K");
        assert_eq!(format_compact(1_250), "1.3K");
        assert_eq!(format_compact(12_345), "12.3K");
        assert_eq!(format_compact(999_999), "1000.0K");
        assert_eq!(format_compact(1_000_000), "1.0M");
        assert_eq!(format_compact(2_560_000), "2.6M");
        assert_eq!(format_compact(u64::MAX), "18446744073709.6M");
    }

    #[test]
    fn render_fills_placeholders() {
        let page = render(&Summary {
            install_count: 1_500,
            filtered_result_count: 42,
            last_updated: 7,
        });
        assert!(page.contains(r#"id="installations">1.5K<"#));
        assert!(page.contains(r#"id="filteredResults">42<"#));
        assert!(page.contains(r#"const INITIAL = {"installCount":1500,"filteredResultCount":42,"lastUpdated":7};"#));
        assert!(!page.contains("{{"));
        assert!(page.contains("setInterval(updateStats, 30000)"));
    }
}
