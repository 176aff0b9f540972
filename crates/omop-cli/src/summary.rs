use std::path::PathBuf;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use omop_cli::types::{BuildResult, SemanticSummary};
use omop_concepts::FieldCoverage;
use omop_semantic::FieldPathCoverage;

pub fn print_build_summary(result: &BuildResult) {
    println!("Patients: {}", result.patients);
    if result.dry_run {
        println!("Output: dry run, nothing written");
    } else {
        println!("Output: {}", result.output_dir.display());
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Rows"), header_cell("CSV")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);
    let mut total_rows = 0usize;
    for summary in &result.tables {
        total_rows += summary.rows;
        table.add_row(vec![
            Cell::new(&summary.table)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            count_cell(summary.rows, Color::White),
            output_cell(summary.output.as_ref()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    print_lookup_coverage(&result.lookups.coverage);
    if let Some(semantic) = &result.semantic {
        print_semantic_summary(semantic);
    }
}

fn print_lookup_coverage(coverage: &[FieldCoverage]) {
    if coverage.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Tier"),
        header_cell("Value set"),
        header_cell("Matched"),
        header_cell("Missed"),
        header_cell("Coverage"),
    ]);
    apply_summary_table_style(&mut table);
    for column in 2..5 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for row in coverage {
        table.add_row(vec![
            Cell::new(row.lookup_type),
            Cell::new(&row.value_set),
            Cell::new(row.matched),
            count_cell(row.missed, Color::Red),
            coverage_cell(row.coverage_fraction),
        ]);
    }
    println!();
    println!("Concept lookups:");
    println!("{table}");
}

pub fn print_semantic_summary(summary: &SemanticSummary) {
    println!();
    println!(
        "Semantic queries: {} ({} matched, {} missed)",
        summary.queries,
        summary.matched,
        summary.queries - summary.matched
    );
    for path in [&summary.matches_file, &summary.missing_file]
        .into_iter()
        .flatten()
    {
        println!("  {}", path.display());
    }
    if summary.coverage.is_empty() {
        return;
    }
    println!("{}", semantic_table(&summary.coverage));
}

fn semantic_table(coverage: &[FieldPathCoverage]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field path"),
        header_cell("Matched"),
        header_cell("Missed"),
        header_cell("Coverage"),
    ]);
    apply_summary_table_style(&mut table);
    for column in 1..4 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for row in coverage {
        table.add_row(vec![
            Cell::new(&row.field_path),
            Cell::new(row.matched),
            count_cell(row.missed, Color::Yellow),
            coverage_cell(row.coverage_fraction),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn output_cell(path: Option<&PathBuf>) -> Cell {
    match path {
        Some(_) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn coverage_cell(fraction: f64) -> Cell {
    let text = format!("{:.1}%", fraction * 100.0);
    if fraction >= 1.0 {
        Cell::new(text).fg(Color::Green)
    } else if fraction >= 0.5 {
        Cell::new(text).fg(Color::Yellow)
    } else {
        Cell::new(text).fg(Color::Red)
    }
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
