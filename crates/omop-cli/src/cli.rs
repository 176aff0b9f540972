//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use omop_vocab::VOCAB_ENV_VAR;

#[derive(Parser)]
#[command(
    name = "omop-etl",
    version,
    about = "OMOP ETL - Build OMOP CDM tables from harmonized trial patients",
    long_about = "Build OMOP CDM tables from harmonized clinical-trial patients.\n\n\
                  Concepts are resolved against static, structural and semantic\n\
                  vocabulary tables. Unresolved lookups are written to report files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include source values from patient records in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build OMOP tables and lookup reports from a patients file.
    Build(BuildArgs),

    /// Resolve semantic queries only and report matches and misses.
    Queries(QueriesArgs),

    /// List the field configs used for semantic queries.
    Fields(FieldsArgs),
}

/// Options shared by commands that read patients and vocabularies.
#[derive(Args)]
pub struct InputArgs {
    /// JSON file containing an array of harmonized patients.
    #[arg(value_name = "PATIENTS_JSON")]
    pub patients: PathBuf,

    /// Directory holding the vocabulary CSV tables.
    #[arg(long = "vocab-dir", value_name = "DIR", env = VOCAB_ENV_VAR)]
    pub vocab_dir: Option<PathBuf>,

    /// Run configuration file (TOML).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output directory for CSV files (default: <PATIENTS_JSON dir>/omop).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Skip the semantic tier; condition rows need it and will be empty.
    #[arg(long = "no-semantic")]
    pub no_semantic: bool,

    /// Build and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct QueriesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct FieldsArgs {
    /// Run configuration file (TOML) whose selection and overrides apply.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show every config, marking those the selection filters out.
    #[arg(long = "all")]
    pub all: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
