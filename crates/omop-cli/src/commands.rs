use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Color, Table};
use omop_cli::config::RunConfig;
use omop_cli::pipeline::{RunOptions, run_build as build_tables, run_queries as resolve_queries};
use omop_cli::types::{BuildResult, SemanticSummary};
use omop_semantic::{DEFAULT_FIELD_CONFIGS, merge_field_configs};
use omop_vocab::vocab_root;

use crate::cli::{BuildArgs, FieldsArgs, InputArgs, QueriesArgs};
use crate::summary::{apply_table_style, dim_cell, header_cell};

fn default_output_dir(patients: &Path) -> PathBuf {
    patients
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("omop")
}

fn run_options(input: &InputArgs, write_outputs: bool) -> Result<RunOptions> {
    Ok(RunOptions {
        patients: input.patients.clone(),
        vocab_dir: input.vocab_dir.clone().unwrap_or_else(vocab_root),
        output_dir: input
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&input.patients)),
        config: RunConfig::load_optional(input.config.as_deref())?,
        run_date: chrono::Local::now().date_naive(),
        write_outputs,
    })
}

pub fn run_build(args: &BuildArgs) -> Result<BuildResult> {
    let options = run_options(&args.input, !args.dry_run)?;
    build_tables(&options, !args.no_semantic)
}

pub fn run_queries(args: &QueriesArgs) -> Result<SemanticSummary> {
    let options = run_options(&args.input, !args.dry_run)?;
    resolve_queries(&options)
}

pub fn run_fields(args: &FieldsArgs) -> Result<()> {
    let config = RunConfig::load_optional(args.config.as_deref())?;
    let selection = config.fields.selection();
    let configs = merge_field_configs(&DEFAULT_FIELD_CONFIGS, &config.fields.overrides);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Name"),
        header_cell("Field path"),
        header_cell("Domains"),
        header_cell("Tags"),
    ]);
    apply_table_style(&mut table);
    for field in &configs {
        let selected = selection.selects(field);
        if !selected && !args.all {
            continue;
        }
        let domains = field
            .target
            .as_ref()
            .and_then(|target| target.domains.as_ref())
            .map(|domains| {
                domains
                    .iter()
                    .map(|d| d.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_else(|| "-".to_string());
        let tags = field.tags.iter().cloned().collect::<Vec<_>>().join(", ");
        let name = if selected {
            Cell::new(&field.name).fg(Color::Blue)
        } else {
            dim_cell(format!("{} (off)", field.name))
        };
        table.add_row(vec![
            name,
            Cell::new(field.dotted_path()),
            Cell::new(domains),
            Cell::new(tags),
        ]);
    }
    println!("{table}");
    Ok(())
}
