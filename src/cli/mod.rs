//! Command-line parsing for the HP-filter yield tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the decomposition code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hpy", version, about = "Hodrick-Prescott trend/cycle decomposition of per-city yield series")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decompose every city in the input table and write charts, tables and a summary.
    Run(RunArgs),
    /// Write a synthetic input table in the default layout.
    Sample(SampleArgs),
}

/// Options for a decomposition run.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Input table (CSV): year header row, yield rows, area rows.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Directory for per-city charts/tables and the summary.
    #[arg(short, long, value_name = "DIR", default_value = "hp_output")]
    pub out_dir: PathBuf,

    /// Optional TOML run file (schema, filter, chart and output sections).
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Smoothing parameter (overrides the run file).
    #[arg(long)]
    pub lambda: Option<f64>,

    /// First year of the selected range (overrides the run file).
    #[arg(long)]
    pub year_start: Option<i32>,

    /// Last year of the selected range (overrides the run file).
    #[arg(long)]
    pub year_end: Option<i32>,

    /// Skip cities that fail instead of aborting the run.
    #[arg(long)]
    pub keep_going: bool,
}

/// Options for synthetic input generation.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// City names, comma separated. Exactly three, to match the default layout.
    #[arg(long, value_delimiter = ',', default_value = "Zhengzhou,Kaifeng,Luoyang")]
    pub cities: Vec<String>,

    /// First year of the series.
    #[arg(long, default_value_t = 2002)]
    pub year_start: i32,

    /// Last year of the series.
    #[arg(long, default_value_t = 2021)]
    pub year_end: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults() {
        let cli = Cli::parse_from(["hpy", "run", "--input", "wheat.csv"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.input, PathBuf::from("wheat.csv"));
        assert_eq!(args.out_dir, PathBuf::from("hp_output"));
        assert!(args.lambda.is_none());
        assert!(!args.keep_going);
        assert!(!cli.verbose);
    }

    #[test]
    fn sample_parses_city_list() {
        let cli = Cli::parse_from(["hpy", "-v", "sample", "--out", "s.csv", "--cities", "A,B"]);
        let Command::Sample(args) = cli.command else {
            panic!("expected sample");
        };
        assert_eq!(args.cities, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(args.seed, 42);
        assert!(cli.verbose);
    }
}
