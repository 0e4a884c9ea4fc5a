use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dosing_oracle::advisor::{build_recommendations, Recommendation};
use dosing_oracle::aeration::{calibrated_k, estimate_time, projected_ph, CalibrationSample};
use dosing_oracle::chemistry::{ChemistryModel, Parameter};
use dosing_oracle::classify::{check_reading, classify_named, RangeCheck, RangeStatus};
use dosing_oracle::config::{Config, ConfigOverrides};
use dosing_oracle::output::csv::{checks_to_csv, recommendations_to_csv};
use dosing_oracle::output::render_json;
use dosing_oracle::output::table::{
    render_checks_table, render_key_value_table, render_recommendations_table,
    render_solution_table,
};
use dosing_oracle::server::run_server;
use dosing_oracle::solver::{solve_ph_ta, Solution};
use dosing_oracle::types::{validate_named, WaterReading};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "dosing-oracle",
    about = "Water chemistry dosing and aeration advisor"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// Aeration rate coefficient for this invocation.
    #[arg(long)]
    k: Option<f64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct ReadingArgs {
    #[arg(long)]
    ph: Option<f64>,
    #[arg(long)]
    ta: Option<f64>,
    #[arg(long)]
    fac: Option<f64>,
    #[arg(long)]
    cya: Option<f64>,
    #[arg(long)]
    salt: Option<f64>,
}

impl From<ReadingArgs> for WaterReading {
    fn from(value: ReadingArgs) -> Self {
        Self {
            ph: value.ph,
            ta: value.ta,
            fac: value.fac,
            cya: value.cya,
            salt: value.salt,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Joint pH/TA dosing plan.
    Solve {
        #[arg(long)]
        ph: f64,
        #[arg(long)]
        ta: f64,
    },
    Classify {
        parameter: String,
        value: f64,
    },
    Check {
        #[command(flatten)]
        reading: ReadingArgs,
    },
    Advise {
        #[command(flatten)]
        reading: ReadingArgs,
    },
    Aerate {
        #[command(subcommand)]
        command: AerateCommand,
    },
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3002)]
        port: u16,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Subcommand)]
enum AerateCommand {
    /// Hours of aeration to reach the pH target.
    Estimate {
        #[arg(long)]
        ph: f64,
        #[arg(long)]
        target: Option<f64>,
        #[arg(long)]
        ta: f64,
    },
    /// Rate coefficient from completed runs, each given as `before,after,hours,ta`.
    Calibrate {
        #[arg(long = "run", value_parser = parse_run, required = true)]
        runs: Vec<AerationRun>,
    },
    /// pH expected part-way through a run.
    Project {
        #[arg(long)]
        ph: f64,
        #[arg(long)]
        hours: f64,
        #[arg(long)]
        ta: f64,
    },
}

#[derive(Debug, Clone, Copy)]
struct AerationRun {
    ph_before: f64,
    ph_after: f64,
    duration_hours: f64,
    ta: f64,
}

#[derive(Debug, Serialize)]
struct ClassifyOutput<'a> {
    parameter: &'a str,
    value: f64,
    status: RangeStatus,
}

#[derive(Debug, Serialize)]
struct EstimateOutput {
    ph_current: f64,
    ph_target: f64,
    ta: f64,
    k: f64,
    hours: f64,
}

#[derive(Debug, Serialize)]
struct CalibrationOutput {
    samples: Vec<CalibrationSample>,
    calibrated_k: f64,
}

#[derive(Debug, Serialize)]
struct ProjectionOutput {
    ph_start: f64,
    elapsed_hours: f64,
    ta: f64,
    k: f64,
    ceiling: f64,
    ph: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides { k: cli.k });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, addr).await;
    }

    let model = config.build_model()?;

    match &cli.command {
        Commands::Solve { ph, ta } => {
            WaterReading::default()
                .with(Parameter::Ph, *ph)
                .with(Parameter::Ta, *ta)
                .validate()?;
            let solution = solve_ph_ta(&model, *ph, *ta);
            print_solution(&solution, cli.output)?;
        }
        Commands::Classify { parameter, value } => {
            validate_named(parameter, *value)?;
            let status = classify_named(model.targets(), parameter, *value);
            print_classification(parameter, *value, status, cli.output)?;
        }
        Commands::Check { reading } => {
            let reading = require_reading(reading.clone())?;
            print_checks(&check_reading(model.targets(), &reading), cli.output)?;
        }
        Commands::Advise { reading } => {
            let reading = require_reading(reading.clone())?;
            let recommendations =
                build_recommendations(&model, &reading, &config.advisor_settings())?;
            print_recommendations(&recommendations, cli.output)?;
        }
        Commands::Aerate { command } => {
            handle_aerate_command(command, &config, &model, cli.output)?;
        }
        Commands::Serve { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn handle_aerate_command(
    command: &AerateCommand,
    config: &Config,
    model: &ChemistryModel,
    format: OutputFormat,
) -> Result<()> {
    let k = config.effective_k();
    match command {
        AerateCommand::Estimate { ph, target, ta } => {
            let ph_target = target.unwrap_or_else(|| model.spec(Parameter::Ph).target);
            let hours = estimate_time(*ph, ph_target, *ta, k)?;
            let result = EstimateOutput {
                ph_current: *ph,
                ph_target,
                ta: *ta,
                k,
                hours,
            };
            print_single(
                &result,
                &[
                    ("pH", format!("{:.2} -> {:.2}", result.ph_current, result.ph_target)),
                    ("TA", format!("{:.0} ppm", result.ta)),
                    ("k", format!("{:.3}", result.k)),
                    ("Aeration time", format!("{:.1} h", result.hours)),
                ],
                "aerate estimate",
                format,
            )
        }
        AerateCommand::Calibrate { runs } => {
            let samples = runs
                .iter()
                .map(|run| {
                    CalibrationSample::from_run(
                        run.ph_before,
                        run.ph_after,
                        run.duration_hours,
                        run.ta,
                    )
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let usable = samples.iter().filter(|s| s.is_usable()).count();
            let result = CalibrationOutput {
                calibrated_k: calibrated_k(&samples, config.aeration.default_k),
                samples,
            };
            print_single(
                &result,
                &[
                    ("Runs", result.samples.len().to_string()),
                    ("Usable runs", usable.to_string()),
                    ("Calibrated k", format!("{:.3}", result.calibrated_k)),
                ],
                "aerate calibrate",
                format,
            )
        }
        AerateCommand::Project { ph, hours, ta } => {
            let ceiling = config.aeration.ph_ceiling;
            let projected = projected_ph(*ph, *hours, *ta, k, ceiling)?;
            let result = ProjectionOutput {
                ph_start: *ph,
                elapsed_hours: *hours,
                ta: *ta,
                k,
                ceiling,
                ph: projected,
            };
            print_single(
                &result,
                &[
                    ("Start pH", format!("{:.2}", result.ph_start)),
                    ("Elapsed", format!("{:.1} h", result.elapsed_hours)),
                    ("k", format!("{:.3}", result.k)),
                    ("Projected pH", format!("{:.2}", result.ph)),
                ],
                "aerate project",
                format,
            )
        }
    }
}

fn require_reading(args: ReadingArgs) -> Result<WaterReading> {
    let reading = WaterReading::from(args);
    if reading.is_empty() {
        return Err(anyhow!(
            "at least one of --ph, --ta, --fac, --cya, --salt is required"
        ));
    }
    reading.validate()?;
    Ok(reading)
}

fn parse_run(raw: &str) -> std::result::Result<AerationRun, String> {
    let values = raw
        .split(',')
        .map(|piece| piece.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid run {raw}: {e}"))?;
    let &[ph_before, ph_after, duration_hours, ta] = values.as_slice() else {
        return Err(format!("expected before,after,hours,ta, got {raw}"));
    };
    Ok(AerationRun {
        ph_before,
        ph_after,
        duration_hours,
        ta,
    })
}

fn print_solution(solution: &Solution, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{}", render_solution_table(solution));
            println!("{}", solution.explanation);
        }
        OutputFormat::Json => println!("{}", render_json(solution)?),
        OutputFormat::Csv => {
            warn!("CSV output for solve not implemented, using JSON");
            println!("{}", render_json(solution)?);
        }
    }
    Ok(())
}

fn print_classification(
    parameter: &str,
    value: f64,
    status: RangeStatus,
    format: OutputFormat,
) -> Result<()> {
    let label = if status.is_out_of_range() {
        "out of range"
    } else {
        "within range"
    };
    let result = ClassifyOutput {
        parameter,
        value,
        status,
    };
    print_single(
        &result,
        &[
            ("Parameter", parameter.to_string()),
            ("Value", value.to_string()),
            ("Status", label.to_string()),
        ],
        "classify",
        format,
    )
}

fn print_checks(checks: &[RangeCheck], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_checks_table(checks)),
        OutputFormat::Json => println!("{}", render_json(checks)?),
        OutputFormat::Csv => println!("{}", checks_to_csv(checks)?),
    }
    Ok(())
}

fn print_recommendations(recommendations: &[Recommendation], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if recommendations.is_empty() {
                println!("No action needed.");
            } else {
                println!("{}", render_recommendations_table(recommendations));
            }
        }
        OutputFormat::Json => println!("{}", render_json(recommendations)?),
        OutputFormat::Csv => println!("{}", recommendations_to_csv(recommendations)?),
    }
    Ok(())
}

fn print_single<T: Serialize>(
    value: &T,
    rows: &[(&str, String)],
    command: &str,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_key_value_table(rows)),
        OutputFormat::Json => println!("{}", render_json(value)?),
        OutputFormat::Csv => {
            warn!("CSV output for {command} not implemented, using JSON");
            println!("{}", render_json(value)?);
        }
    }
    Ok(())
}
