use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sitecurve_core::time::{parse_as_of, parse_timezone, today_in};
use sitecurve_core::{
    CurveOptions, Granularity, ProgressCurveResult, ProgressReport, ProjectTask, WeightingMode,
    compute_progress_curve, rollup_groups,
};
use sitecurve_ingest::{load_tasks, write_curve_csv, write_tasks_csv};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

mod config;
mod logging;
mod render;
mod state;

use config::Config;
use logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "sitecurve", version, about = "S-Curve progress for construction schedules")]
struct Cli {
    /// Log level (overrides SITECURVE_LOG)
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the planned-vs-actual curve for a task file
    Curve {
        #[command(flatten)]
        curve: CurveArgs,

        /// Write the bucket table as CSV
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the full result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the progress report text for a task file
    Report {
        #[command(flatten)]
        curve: CurveArgs,

        /// Project name shown in the report header
        #[arg(long)]
        project: Option<String>,
    },

    /// Synchronize group rows from their children and write the result
    Rollup {
        /// Task file (.csv or .json)
        #[arg(long)]
        tasks: PathBuf,

        /// Output CSV path
        #[arg(long)]
        out: PathBuf,
    },

    /// Manage ~/.sitecurve/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
}

#[derive(Args, Debug)]
struct CurveArgs {
    /// Task file (.csv or .json)
    #[arg(long)]
    tasks: PathBuf,

    /// Window start (defaults to earliest plan start)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Window end (defaults to latest plan end)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// day | week | month
    #[arg(long)]
    granularity: Option<Granularity>,

    /// duration | cost
    #[arg(long)]
    weighting: Option<WeightingMode>,

    /// "Now" as YYYY-MM-DD or RFC3339 (defaults to today in the configured timezone)
    #[arg(long)]
    as_of: Option<String>,

    /// Keep the window exactly as given instead of extending to the project end
    #[arg(long)]
    no_extend: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level)?;

    match cli.command {
        Command::Curve { curve, out, json } => {
            let cfg = config::load_config()?;
            let (_, result) = run_curve(&curve, &cfg)?;

            if let Some(path) = out {
                write_curve_file(&result, &path)?;
                info!(path = %path.display(), buckets = result.buckets.len(), "wrote curve CSV");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render::curve_table(&result));
                println!();
                print!("{}", render::kpi_summary(&result));
            }
        }

        Command::Report { curve, project } => {
            let cfg = config::load_config()?;
            let (tasks, result) = run_curve(&curve, &cfg)?;
            let opts = cfg.report.to_options(project.as_deref());
            print!("{}", ProgressReport::build(&tasks, &result, &opts));
        }

        Command::Rollup { tasks, out } => {
            let mut loaded = read_tasks(&tasks)?;
            rollup_groups(&mut loaded);
            let file = File::create(&out).with_context(|| format!("create {}", out.display()))?;
            write_tasks_csv(&loaded, BufWriter::new(file))?;
            println!("Wrote {} tasks to {}", loaded.len(), out.display());
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },
    }

    Ok(())
}

fn read_tasks(path: &Path) -> Result<Vec<ProjectTask>> {
    let report = load_tasks(path)?;
    if !report.rejected.is_empty() {
        let lines: Vec<u64> = report.rejected.iter().map(|r| r.line).collect();
        warn!(path = %path.display(), ?lines, "some task rows were rejected");
    }
    info!(
        path = %path.display(),
        tasks = report.tasks.len(),
        rejected = report.rejected.len(),
        "loaded tasks"
    );
    Ok(report.tasks)
}

fn curve_options(args: &CurveArgs, cfg: &Config, tasks: &[ProjectTask]) -> Result<CurveOptions> {
    let tz = parse_timezone(&cfg.locale.timezone)?;
    let as_of = match &args.as_of {
        Some(s) => parse_as_of(s, tz)?,
        None => today_in(tz),
    };

    let derived = CurveOptions::for_tasks(tasks, as_of);
    let start = args.from.or(derived.as_ref().map(|o| o.window_start));
    let end = args.to.or(derived.as_ref().map(|o| o.window_end));
    let (Some(start), Some(end)) = (start, end) else {
        bail!("no task has plan dates; pass --from and --to to set the window");
    };

    Ok(CurveOptions::new(start, end, as_of)
        .with_granularity(args.granularity.unwrap_or(cfg.curve.granularity))
        .with_weighting(args.weighting.unwrap_or(cfg.curve.weighting))
        .with_extension(!args.no_extend))
}

fn run_curve(args: &CurveArgs, cfg: &Config) -> Result<(Vec<ProjectTask>, ProgressCurveResult)> {
    let tasks = read_tasks(&args.tasks)?;
    let opts = curve_options(args, cfg, &tasks)?;
    let result = compute_progress_curve(&tasks, &opts)?;

    for s in &result.skipped {
        warn!(task = %s.id, issue = s.issue.describe(), "task left out of curve");
    }
    if result.is_empty() {
        warn!(from = %opts.window_start, to = %opts.window_end, "window is empty");
    }

    Ok((tasks, result))
}

fn write_curve_file(result: &ProgressCurveResult, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_curve_csv(result, BufWriter::new(file))
}
