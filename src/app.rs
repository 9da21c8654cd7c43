//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - layers CLI flags over the optional TOML run file
//! - runs the decomposition pipeline and prints the summary
//! - writes synthetic input tables on request

use clap::Parser;
use tracing::info;

use crate::cli::{Command, RunArgs, SampleArgs};
use crate::data::{SampleSpec, generate_sample, write_raw_table};
use crate::domain::{FailurePolicy, RunConfig, SchemaDescriptor, YearRange};
use crate::error::AppError;
use crate::io::{RunFile, read_run_file};

pub mod pipeline;

/// Entry point for the `hpy` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let run_file = match &args.config {
        Some(path) => read_run_file(path)?,
        None => RunFile::default(),
    };
    let config = run_config_from_args(&args, run_file);
    let summary = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_summary(&summary.rows, &summary.failures));
    println!("Output: {}", config.out_dir.display());
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let spec = SampleSpec {
        cities: args.cities.iter().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect(),
        years: YearRange {
            start: args.year_start,
            end: args.year_end,
        },
        seed: args.seed,
        unit_factor: SchemaDescriptor::default().unit_factor,
    };
    let table = generate_sample(&spec)?;
    write_raw_table(&args.out, &table)?;
    info!(path = %args.out.display(), cities = spec.cities.len(), "sample written");
    Ok(())
}

/// Build the run configuration: defaults, then the run file, then CLI flags.
pub fn run_config_from_args(args: &RunArgs, run_file: RunFile) -> RunConfig {
    let mut config = RunConfig::new(&args.input, &args.out_dir);
    config.schema = run_file.schema;
    config.lambda = run_file.filter.lambda;
    config.chart = run_file.chart;
    config.naming = run_file.output;

    if let Some(lambda) = args.lambda {
        config.lambda = lambda;
    }
    if let Some(start) = args.year_start {
        config.schema.years.start = start;
    }
    if let Some(end) = args.year_end {
        config.schema.years.end = end;
    }
    if args.keep_going {
        config.failure_policy = FailurePolicy::KeepGoing;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_run_file;

    fn args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["hpy", "run", "--input", "in.csv"];
        argv.extend_from_slice(extra);
        let cli = crate::cli::Cli::parse_from(argv);
        match cli.command {
            Command::Run(args) => args,
            Command::Sample(_) => panic!("expected run"),
        }
    }

    #[test]
    fn defaults_reproduce_fixed_constants() {
        let config = run_config_from_args(&args(&[]), RunFile::default());
        assert_eq!(config.lambda, 100.0);
        assert_eq!(config.schema.years, YearRange { start: 2002, end: 2021 });
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn cli_flags_override_run_file() {
        let file = parse_run_file("[filter]\nlambda = 400.0\n[schema]\nyears = { start = 2000, end = 2010 }\n").unwrap();
        let config = run_config_from_args(&args(&["--lambda", "6.25", "--year-end", "2008", "--keep-going"]), file);
        assert_eq!(config.lambda, 6.25);
        assert_eq!(config.schema.years, YearRange { start: 2000, end: 2008 });
        assert_eq!(config.failure_policy, FailurePolicy::KeepGoing);
    }
}
