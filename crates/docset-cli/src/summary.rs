//! End-of-build console summary.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use docset_model::Severity;
use docset_validate::RulesConfig;

use crate::pipeline::BuildOutcome;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        Cell::new("0").fg(Color::DarkGrey)
    } else {
        Cell::new(count).fg(color)
    }
}

/// Print the per-file diagnostics table and totals for a build run.
pub fn print_summary(outcome: &BuildOutcome) {
    println!(
        "Files: {} discovered, {} published",
        outcome.files.len(),
        outcome.published
    );
    println!("Output: {}", outcome.output_dir.display());
    if let Some(path) = &outcome.manifest_path {
        println!("Publish manifest: {}", path.display());
    }

    if outcome.report.is_empty() {
        println!("No diagnostics.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Suggestions"),
    ]);
    apply_table_style(&mut table);
    for column in 1..=3 {
        if let Some(column) = table.column_mut(column) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (file, diagnostics) in &outcome.report {
        let count = |severity: Severity| {
            diagnostics
                .iter()
                .filter(|diagnostic| diagnostic.severity == severity)
                .count()
        };
        table.add_row(vec![
            Cell::new(file),
            count_cell(count(Severity::Error), Color::Red),
            count_cell(count(Severity::Warning), Color::Yellow),
            count_cell(count(Severity::Suggestion), Color::Cyan),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL").add_attribute(Attribute::Bold),
        count_cell(outcome.count(Severity::Error), Color::Red).add_attribute(Attribute::Bold),
        count_cell(outcome.count(Severity::Warning), Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(outcome.count(Severity::Suggestion), Color::Cyan)
            .add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    print_diagnostics(outcome);
}

fn print_diagnostics(outcome: &BuildOutcome) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Severity"),
        header_cell("Code"),
        header_cell("Field"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);

    for (file, diagnostics) in &outcome.report {
        for diagnostic in diagnostics {
            let severity_color = match diagnostic.severity {
                Severity::Error => Color::Red,
                Severity::Warning => Color::Yellow,
                Severity::Suggestion => Color::Cyan,
            };
            table.add_row(vec![
                Cell::new(file),
                Cell::new(diagnostic.severity.label()).fg(severity_color),
                Cell::new(&diagnostic.code),
                Cell::new(&diagnostic.field),
                Cell::new(&diagnostic.message),
            ]);
        }
    }
    println!("{table}");
}

/// Print the per-field rule inventory of a checked configuration.
pub fn print_rules(config: &RulesConfig) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Rules"),
        header_cell("Kinds"),
    ]);
    apply_table_style(&mut table);

    for (field, rules) in config.rule_set.iter() {
        let kinds: Vec<&str> = rules.iter().map(|rule| rule.check.kind()).collect();
        table.add_row(vec![
            Cell::new(field),
            Cell::new(rules.len()),
            Cell::new(kinds.join(", ")),
        ]);
    }
    println!("{table}");
    println!(
        "{} rules across {} fields; configuration is valid.",
        config.rule_set.rule_count(),
        config.rule_set.field_count()
    );
}
