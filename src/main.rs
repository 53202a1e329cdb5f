use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use epi_calculator::{
    analysis::{calculate_ghn_score, project_emissions, Analyzer, AggregationMode},
    io::writer_for_path,
    visualization::{
        print_emissions_chart, print_epi, print_fit_table, print_projection_table,
        print_score_table,
    },
    IndexConfig, TimeSeries,
};

#[derive(Parser)]
#[command(
    name = "epi-calc",
    about = "EPI Calculator - Environmental performance index with emissions projection",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the composite index and display the report
    Run {
        /// TOML configuration overriding the reference constants
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Export the report (.json) or the emissions series (.csv)
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Pretty-print JSON export
        #[arg(long)]
        pretty: bool,

        /// Aggregation formula: literal or simplified
        #[arg(short, long)]
        mode: Option<String>,

        /// Skip the emissions chart
        #[arg(long)]
        no_chart: bool,
    },

    /// Fit and project the emissions history only
    Project {
        /// TOML configuration overriding the reference constants
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of steps to project (overrides the configuration)
        #[arg(long)]
        horizon: Option<usize>,
    },

    /// Print the default configuration as TOML
    Config,
}

fn load_config(path: Option<&PathBuf>) -> Result<IndexConfig> {
    match path {
        Some(p) => Ok(IndexConfig::from_file(p)?),
        None => Ok(IndexConfig::default()),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            export,
            pretty,
            mode,
            no_chart,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(mode) = mode {
                config.aggregation.mode = mode.parse::<AggregationMode>()?;
            }

            println!("\n{}", "Environmental Performance Index".bold().cyan());

            let report = Analyzer::new(&config).run()?;
            print_score_table(&report.indicators, &report.scores);
            print_fit_table(&report.fit);
            if !no_chart {
                print_emissions_chart(&report.history, &report.projection);
            }
            print_epi(&report);

            if let Some(path) = export {
                let writer = writer_for_path(&path, pretty)?;
                writer.write(&report, &path)?;
                println!(
                    "{} Exported report -> {}",
                    "Success:".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Project { config, horizon } => {
            let config = load_config(config.as_ref())?;
            let inputs = &config.scenario.ghn;
            let horizon = horizon.unwrap_or(inputs.horizon);

            println!(
                "\n{}",
                format!("Emissions Projection: {horizon} steps").bold().cyan()
            );

            let history = TimeSeries::new(inputs.history.clone())?;
            let projected = project_emissions(&history, horizon, &config.solver)?;
            print_fit_table(&projected.fit);
            print_projection_table(&history, &projected.projection);
            print_emissions_chart(&history, &projected.projection);

            let score = calculate_ghn_score(
                history.values(),
                &projected.projection.values,
                inputs.rate_steps,
            )
            .map_err(|e| e.in_stage("GHN rate"))?;
            println!(
                "\n  GHN score over {} steps: {:.6}",
                inputs.rate_steps, score
            );
        }

        Commands::Config => {
            print!("{}", IndexConfig::default().to_toml_string()?);
        }
    }

    Ok(())
}
