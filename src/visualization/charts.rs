use colored::Colorize;

use crate::models::{Projection, SeriesKind, TimeSeries};

const BAR_WIDTH: usize = 40;

/// Format a text chart of historical and projected emissions as a string.
///
/// Bars are scaled between the smallest and largest value so small trends
/// remain visible on large totals.
pub fn format_emissions_chart(history: &TimeSeries, projection: &Projection) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Emissions Trend".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let points = projection.combined_with(history);
    if points.is_empty() {
        output.push_str("  No data available.\n");
        return output;
    }

    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|p| p.value)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    output.push_str(&format!("  {:>4}  {:>12}  Trend\n", "Step", "Emissions"));
    output.push_str(&format!("  {}\n", "-".repeat(70)));

    for point in &points {
        // Keep one cell so the lowest value still shows a bar.
        let bar_len = if range > 0.0 {
            1 + (((point.value - min) / range) * (BAR_WIDTH - 1) as f64).round() as usize
        } else {
            BAR_WIDTH
        };
        let bar = match point.kind {
            SeriesKind::Historical => "\u{2588}".repeat(bar_len).blue(),
            SeriesKind::Projected => "\u{2591}".repeat(bar_len).red(),
        };
        output.push_str(&format!(
            "  {:>4}  {:>12.1}  {}\n",
            point.time_index, point.value, bar
        ));
    }

    output.push_str(&format!(
        "  {} historical   {} projected\n",
        "\u{2588}".blue(),
        "\u{2591}".red()
    ));
    output
}

/// Print a text chart of historical and projected emissions.
pub fn print_emissions_chart(history: &TimeSeries, projection: &Projection) {
    print!("{}", format_emissions_chart(history, projection));
}
