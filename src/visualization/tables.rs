use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::{FitReport, IndexReport};
use crate::models::{Indicator, Projection, ScoreSet, TimeSeries};

fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format the composite index line, e.g. `EPI: 88.89`.
pub fn format_epi(report: &IndexReport) -> String {
    format!("\n{}\n", format!("EPI: {:.2}", report.epi_percent()).bold().cyan())
}

/// Print the composite index line.
pub fn print_epi(report: &IndexReport) {
    print!("{}", format_epi(report));
}

/// Format the indicator inputs and their normalized scores as a string.
pub fn format_score_table(indicators: &[Indicator], scores: &ScoreSet) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Indicator Scores".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = styled_table();
    table.set_header(vec!["Indicator", "Raw", "Baseline", "Panel", "Score"]);

    for (name, score) in scores.iter() {
        let row = match indicators.iter().find(|i| i.name == name) {
            Some(ind) => vec![
                Cell::new(name),
                Cell::new(format!("{:.6}", ind.raw_value)),
                Cell::new(format!("{:.6}", ind.baseline)),
                Cell::new(format!("{:.6}", ind.panel)),
                Cell::new(format!("{:.6}", score)),
            ],
            None => vec![
                Cell::new(name),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(format!("{:.6}", score)),
            ],
        };
        table.add_row(row);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the indicator score table.
pub fn print_score_table(indicators: &[Indicator], scores: &ScoreSet) {
    print!("{}", format_score_table(indicators, scores));
}

/// Format fitted curve parameters and diagnostics as a string.
pub fn format_fit_table(fit: &FitReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Exponential Fit".bold().green()));
    output.push_str(&format!(
        "{}\n",
        "f(t) = a * exp(-b * t) + c".dimmed()
    ));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = styled_table();
    table.set_header(vec!["Parameter", "Value"]);

    let rows = [
        ("Amplitude (a)", format!("{:.6}", fit.model.amplitude)),
        ("Decay rate (b)", format!("{:.6}", fit.model.decay_rate)),
        ("Offset (c)", format!("{:.6}", fit.model.offset)),
        ("Residual SS", format!("{:.4}", fit.residual_sum_squares)),
        ("R-squared", format!("{:.4}", fit.r_squared)),
        ("Iterations", format!("{}", fit.iterations)),
        (
            "Seed",
            if fit.used_fallback_seed {
                "three-point".to_string()
            } else {
                "initial guess".to_string()
            },
        ),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the fitted curve table.
pub fn print_fit_table(fit: &FitReport) {
    print!("{}", format_fit_table(fit));
}

/// Format historical and projected emissions as a string.
pub fn format_projection_table(history: &TimeSeries, projection: &Projection) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Emissions Projection".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = styled_table();
    table.set_header(vec!["Step", "Emissions", "Kind"]);

    for point in projection.combined_with(history) {
        table.add_row(vec![
            Cell::new(format!("{}", point.time_index)),
            Cell::new(format!("{:.1}", point.value)),
            Cell::new(point.kind.to_string()),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the projection table.
pub fn print_projection_table(history: &TimeSeries, projection: &Projection) {
    print!("{}", format_projection_table(history, projection));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ExponentialModel;

    fn sample_fit(fallback: bool) -> FitReport {
        FitReport {
            model: ExponentialModel::new(4086.0, 12.5, 91428.0),
            iterations: 3,
            residual_sum_squares: 16_831_448.0,
            r_squared: 0.42,
            used_fallback_seed: fallback,
        }
    }

    #[test]
    fn test_format_score_table_contains_indicators() {
        let indicators = vec![Indicator::new("GHP", 45.2, 0.026, 53.7)];
        let scores = ScoreSet::try_from_iter([("GHP", 0.0084), ("GHN", 0.0018)]).unwrap();
        let output = format_score_table(&indicators, &scores);
        assert!(output.contains("Indicator Scores"));
        assert!(output.contains("GHP"));
        assert!(output.contains("GHN"));
        assert!(output.contains("45.200000"));
        assert!(output.contains("0.008400"));
    }

    #[test]
    fn test_format_score_table_empty() {
        let output = format_score_table(&[], &ScoreSet::new());
        assert!(output.contains("Indicator Scores"));
    }

    #[test]
    fn test_format_fit_table_fields() {
        let output = format_fit_table(&sample_fit(false));
        assert!(output.contains("Amplitude (a)"));
        assert!(output.contains("Decay rate (b)"));
        assert!(output.contains("Offset (c)"));
        assert!(output.contains("91428.000000"));
        assert!(output.contains("initial guess"));
    }

    #[test]
    fn test_format_fit_table_fallback() {
        let output = format_fit_table(&sample_fit(true));
        assert!(output.contains("three-point"));
    }

    #[test]
    fn test_format_projection_table() {
        let history = TimeSeries::new(vec![100.0, 90.0]).unwrap();
        let projection = Projection {
            start_index: 2,
            values: vec![85.5],
        };
        let output = format_projection_table(&history, &projection);
        assert!(output.contains("Emissions Projection"));
        assert!(output.contains("historical"));
        assert!(output.contains("projected"));
        assert!(output.contains("85.5"));
    }
}
