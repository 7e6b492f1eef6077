use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sews_predict::RiskTier;

use crate::types::{EtlResult, ExternalResult, PredictResult, TrainResult};

pub fn print_etl_summary(result: &EtlResult) {
    println!("Corpus: {}", result.output.display());
    let report = &result.report;
    let mut table = metric_table();
    table.add_row(vec![Cell::new("Patient files"), Cell::new(report.files)]);
    table.add_row(vec![
        Cell::new("Patients with rows"),
        Cell::new(report.patients_with_rows),
    ]);
    table.add_row(vec![
        Cell::new("Patients too short for horizon"),
        count_cell(report.patients_without_rows, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Skipped patients"),
        count_cell(report.skipped(), Color::Red),
    ]);
    table.add_row(vec![Cell::new("Rows"), Cell::new(result.rows)]);
    table.add_row(vec![
        Cell::new("Positive rows"),
        Cell::new(result.counts.positive),
    ]);
    table.add_row(vec![
        Cell::new("Positive prevalence"),
        Cell::new(percent(result.prevalence)),
    ]);
    println!("{table}");

    if !report.failures.is_empty() {
        let mut failures = Table::new();
        failures.set_header(vec![header_cell("Skipped file"), header_cell("Reason")]);
        apply_table_style(&mut failures);
        for failure in &report.failures {
            failures.add_row(vec![
                Cell::new(failure.path.display()),
                Cell::new(&failure.reason).fg(Color::Red),
            ]);
        }
        println!();
        println!("{failures}");
    }
}

pub fn print_train_summary(result: &TrainResult) {
    println!("Model: {}", result.model_path.display());
    let mut table = metric_table();
    table.add_row(vec![Cell::new("Corpus rows"), Cell::new(result.corpus_rows)]);
    table.add_row(vec![
        Cell::new("Corpus prevalence"),
        Cell::new(percent(result.corpus_prevalence)),
    ]);
    table.add_row(vec![
        Cell::new("Train patients"),
        Cell::new(result.train_patients),
    ]);
    table.add_row(vec![
        Cell::new("Test patients"),
        Cell::new(result.test_patients),
    ]);
    let balance = &result.balance;
    table.add_row(vec![
        Cell::new("Balanced positives"),
        Cell::new(balance.positives),
    ]);
    let negatives = if balance.clamped {
        Cell::new(format!(
            "{} (requested {}, clamped)",
            balance.negatives_kept, balance.negatives_requested
        ))
        .fg(Color::Yellow)
    } else {
        Cell::new(balance.negatives_kept)
    };
    table.add_row(vec![Cell::new("Balanced negatives"), negatives]);
    table.add_row(vec![
        Cell::new("Holdout rows"),
        Cell::new(result.holdout_rows),
    ]);
    table.add_row(vec![
        Cell::new("Holdout prevalence"),
        Cell::new(percent(result.holdout_prevalence)),
    ]);
    let matrix = &result.evaluation.matrix;
    table.add_row(vec![
        Cell::new("Accuracy").add_attribute(Attribute::Bold),
        rate_cell(matrix.accuracy()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Precision"), rate_cell(matrix.precision())]);
    table.add_row(vec![Cell::new("Recall"), rate_cell(matrix.recall())]);
    println!("{table}");

    let mut confusion = Table::new();
    confusion.set_header(vec![
        header_cell(""),
        header_cell("Predicted healthy"),
        header_cell("Predicted sepsis"),
    ]);
    apply_table_style(&mut confusion);
    align_column(&mut confusion, 1, CellAlignment::Right);
    align_column(&mut confusion, 2, CellAlignment::Right);
    confusion.add_row(vec![
        Cell::new("Actual healthy"),
        Cell::new(matrix.true_negative),
        Cell::new(matrix.false_positive),
    ]);
    confusion.add_row(vec![
        Cell::new("Actual sepsis"),
        Cell::new(matrix.false_negative),
        Cell::new(matrix.true_positive),
    ]);
    println!();
    println!(
        "Confusion matrix (threshold {:.2}):",
        result.evaluation.threshold
    );
    println!("{confusion}");

    if !result.top_weights.is_empty() {
        let mut weights = Table::new();
        weights.set_header(vec![header_cell("Feature"), header_cell("Weight")]);
        apply_table_style(&mut weights);
        align_column(&mut weights, 1, CellAlignment::Right);
        for (name, weight) in &result.top_weights {
            weights.add_row(vec![Cell::new(name), Cell::new(format!("{weight:+.4}"))]);
        }
        println!();
        println!("Strongest features:");
        println!("{weights}");
    }
}

pub fn print_external_summary(result: &ExternalResult) {
    println!("External dataset: {}", result.dataset.display());
    let summary = &result.summary;
    let diff = &result.diff;
    let mut table = metric_table();
    table.add_row(vec![
        Cell::new("Source rows read"),
        Cell::new(result.source_rows),
    ]);
    table.add_row(vec![
        Cell::new("Rows without key"),
        count_cell(result.skipped_rows, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Features mapped"),
        Cell::new(diff.mapped_count()),
    ]);
    table.add_row(vec![
        Cell::new("Features defaulted"),
        Cell::new(diff.missing_features.len()).fg(Color::DarkGrey),
    ]);
    table.add_row(vec![
        Cell::new("Dropped codes"),
        dropped_codes_cell(&diff.dropped_codes),
    ]);
    table.add_row(vec![Cell::new("Patients"), Cell::new(summary.patients)]);
    table.add_row(vec![
        Cell::new("Patient hours analysed"),
        Cell::new(summary.rows),
    ]);
    table.add_row(vec![
        Cell::new("Average predicted risk"),
        Cell::new(format!(
            "{:.4} ({})",
            summary.mean_risk,
            percent(summary.mean_risk)
        )),
    ]);
    table.add_row(vec![
        Cell::new(format!(
            "High risk alerts (> {:.2})",
            summary.alert_threshold
        )),
        count_cell(summary.alerts, Color::Red),
    ]);
    println!("{table}");

    if summary.looks_unmapped() {
        eprintln!("warning: model output is zero; check the feature mapping");
    } else {
        println!("Predictions generated; no ground-truth labels, so no accuracy is reported.");
    }
}

pub fn print_assessment(result: &PredictResult) {
    let assessment = &result.assessment;
    let report = assessment.render();
    let mut table = Table::new();
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(report.trim_end()).fg(tier_color(assessment.tier)),
    ]);
    println!("{table}");
    println!("Values provided: {}", result.provided);
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn metric_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
    align_column(&mut table, 1, CellAlignment::Right);
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn rate_cell(rate: Option<f64>) -> Cell {
    match rate {
        Some(value) => Cell::new(percent(value)),
        None => dim_cell("-"),
    }
}

fn dropped_codes_cell(codes: &[String]) -> Cell {
    const SHOWN: usize = 8;
    if codes.is_empty() {
        return dim_cell("-");
    }
    let mut text = codes
        .iter()
        .take(SHOWN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if codes.len() > SHOWN {
        text.push_str(&format!(" (+{} more)", codes.len() - SHOWN));
    }
    Cell::new(text).fg(Color::Yellow)
}

fn tier_color(tier: RiskTier) -> Color {
    match tier {
        RiskTier::Low => Color::Green,
        RiskTier::Moderate => Color::Yellow,
        RiskTier::High => Color::Red,
    }
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
