mod registry;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use registry::{RunContext, finish_run, init_run_logging, start_run};
use retailgen_core::{CoreError, ENTITY_ORDER, build_dependency_report, validate_order};
use retailgen_generate::{GenerationEngine, GenerationError, RunSettings};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
}

#[derive(Parser, Debug)]
#[command(name = "retailgen", version, about = "Deterministic retail dataset generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate every entity into an output directory.
    Generate(GenerateArgs),
    /// Print the validated entity generation order.
    Order,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Output directory for entity files, report and run manifest.
    #[arg(value_name = "OUT_DIR")]
    out_dir: PathBuf,
    /// Output format (positional form): csv, json or bson.
    #[arg(value_name = "FORMAT", conflicts_with = "format")]
    format_pos: Option<String>,
    /// Output format (flag form).
    #[arg(long)]
    format: Option<String>,
    /// TOML settings file applied before any flag.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Master seed, decimal or 0x-prefixed hex.
    #[arg(long)]
    seed: Option<String>,
    /// Number of simulated days.
    #[arg(long)]
    days: Option<u32>,
    /// Keep per-entity intermediate files after the run.
    #[arg(long, default_value_t = false)]
    keep_intermediate: bool,
    /// Directory for intermediate files.
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,
    /// Reference data root.
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,
    /// Extra `key=value` setting; may be repeated.
    #[arg(long = "setting", value_name = "KEY=VALUE")]
    settings: Vec<String>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Order => print_order(),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let settings = resolve_settings(&args)?;

    let run_ctx = RunContext {
        run_id: Uuid::new_v4().to_string(),
        started_at: chrono::Utc::now(),
        out_dir: args.out_dir,
        settings,
    };
    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(
        run_id = %run_ctx.run_id,
        manifest = %run_paths.manifest_path.display(),
        "run started"
    );

    let result = GenerationEngine::new(run_ctx.settings.clone())
        .with_run_id(run_ctx.run_id.clone())
        .run(&run_ctx.out_dir);

    match result {
        Ok(result) => {
            finish_run(&run_ctx, &run_paths, Ok(&result.report))?;
            if let Some(dir) = &result.intermediate_dir {
                tracing::info!(dir = %dir.display(), "intermediate files kept");
            }
            tracing::info!(
                run_id = %run_ctx.run_id,
                status = "success",
                sales = result.report.sales.lines,
                visits = result.report.sales.visits,
                lost_customers = result.report.sales.lost_customers,
                "run finished"
            );
            Ok(())
        }
        Err(err) => {
            finish_run(&run_ctx, &run_paths, Err(err.to_string()))?;
            tracing::error!(run_id = %run_ctx.run_id, error = %err, "run failed");
            Err(err.into())
        }
    }
}

/// Defaults, then the TOML file, then dedicated flags, then `--setting`
/// pairs in the order given.
fn resolve_settings(args: &GenerateArgs) -> Result<RunSettings, CliError> {
    let mut settings = match &args.config {
        Some(path) => RunSettings::from_toml_file(path)?,
        None => RunSettings::default(),
    };

    if let Some(seed) = &args.seed {
        settings.apply("seed", seed)?;
    }
    if let Some(days) = args.days {
        settings.days = days;
    }
    if let Some(format) = args.format.as_ref().or(args.format_pos.as_ref()) {
        settings.format = format.parse()?;
    }
    if args.keep_intermediate {
        settings.keep_intermediate = true;
    }
    if let Some(dir) = &args.work_dir {
        settings.work_dir = Some(dir.clone());
    }
    if let Some(dir) = &args.assets {
        settings.assets_dir = Some(dir.clone());
    }
    for pair in &args.settings {
        settings.apply_pair(pair)?;
    }

    settings.validate()?;
    Ok(settings)
}

fn print_order() -> Result<(), CliError> {
    validate_order(&ENTITY_ORDER)?;
    let report = build_dependency_report();

    for (position, kind) in ENTITY_ORDER.iter().enumerate() {
        let reads: Vec<String> = kind.dependencies().iter().map(ToString::to_string).collect();
        if reads.is_empty() {
            println!("{:>2}. {kind}", position + 1);
        } else {
            println!("{:>2}. {kind} (reads {})", position + 1, reads.join(", "));
        }
    }
    println!("{} entities, {} dependency edges", report.nodes, report.edges);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use retailgen_generate::OutputFormat;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let cli = Cli::try_parse_from(argv).expect("parse args");
        match cli.command {
            Command::Generate(args) => args,
            Command::Order => panic!("expected generate"),
        }
    }

    #[test]
    fn positional_format_and_flags_override_defaults() {
        let args = generate_args(&[
            "retailgen", "generate", "out", "json", "--seed", "0xff", "--days", "3",
        ]);
        let settings = resolve_settings(&args).expect("settings");

        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.seed, 255);
        assert_eq!(settings.days, 3);
        assert!(!settings.keep_intermediate);
    }

    #[test]
    fn setting_pairs_apply_after_flags() {
        let args = generate_args(&[
            "retailgen",
            "generate",
            "out",
            "--days",
            "3",
            "--setting",
            "days=5",
            "--setting",
            "deletetemp=false",
        ]);
        let settings = resolve_settings(&args).expect("settings");

        assert_eq!(settings.days, 5);
        assert!(settings.keep_intermediate);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let args = generate_args(&["retailgen", "generate", "out", "xml"]);
        let err = resolve_settings(&args).unwrap_err();
        assert!(matches!(err, CliError::Generation(GenerationError::Config(_))));
    }

    #[test]
    fn config_file_is_loaded_before_flags() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("retailgen.toml");
        std::fs::write(&path, "seed = 9\ndays = 2\nformat = \"bson\"\n").expect("write config");

        let config = path.to_string_lossy().into_owned();
        let args = generate_args(&[
            "retailgen", "generate", "out", "--config", &config, "--days", "4",
        ]);
        let settings = resolve_settings(&args).expect("settings");

        assert_eq!(settings.seed, 9);
        assert_eq!(settings.days, 4);
        assert_eq!(settings.format, OutputFormat::Bson);
    }

    #[test]
    fn positional_and_flag_format_conflict() {
        let result = Cli::try_parse_from(["retailgen", "generate", "out", "csv", "--format", "json"]);
        assert!(result.is_err());
    }
}
