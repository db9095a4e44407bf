use crate::infra::{build_service, parse_date};
use crate::render::{write_fleet_report, write_vehicle_status};
use crate::server;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fleet_status::config::AppConfig;
use fleet_status::error::AppError;
use fleet_status::fleet::router::evaluation_instant;
use fleet_status::fleet::VehicleId;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Status",
    about = "Serve and inspect vehicle document, maintenance and fuel status",
    version
)]
struct Cli {
    /// Read vehicles from a JSON fixture instead of the configured backend
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect a single vehicle
    Vehicle {
        #[command(subcommand)]
        command: VehicleCommand,
    },
    /// Fleet-wide reports
    Fleet {
        #[command(subcommand)]
        command: FleetCommand,
    },
}

#[derive(Subcommand, Debug)]
enum VehicleCommand {
    /// Show documents, maintenance and fuel status for one vehicle
    Status(VehicleStatusArgs),
}

#[derive(Subcommand, Debug)]
enum FleetCommand {
    /// Expiration report covering every vehicle
    Report(FleetReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
struct VehicleStatusArgs {
    /// Vehicle identifier
    id: VehicleId,
    /// Evaluation date (defaults to now)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct FleetReportArgs {
    /// Evaluation date (defaults to now)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Emit CSV instead of text
    #[arg(long)]
    csv: bool,
    /// Write the report to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args, cli.fixture).await,
        Command::Vehicle {
            command: VehicleCommand::Status(args),
        } => vehicle_status(args, cli.fixture).await,
        Command::Fleet {
            command: FleetCommand::Report(args),
        } => fleet_report(args, cli.fixture).await,
    }
}

async fn vehicle_status(args: VehicleStatusArgs, fixture: Option<PathBuf>) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config, fixture)?;
    let report = service
        .vehicle_status(args.id, evaluation_instant(args.today))
        .await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &report).map_err(io::Error::from)?;
        writeln!(out)?;
    } else {
        write_vehicle_status(&mut out, &report)?;
    }
    Ok(())
}

async fn fleet_report(args: FleetReportArgs, fixture: Option<PathBuf>) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config, fixture)?;
    let overview = service
        .fleet_overview(evaluation_instant(args.today))
        .await?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    if args.csv {
        overview.write_csv(&mut out)?;
    } else {
        write_fleet_report(&mut out, &overview)?;
    }
    out.flush()?;

    if let Some(path) = &args.output {
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}
