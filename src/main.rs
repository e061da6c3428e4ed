mod ui;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Parser, Subcommand};
use egui::Vec2;
use log::{error, warn};
use snafu::Snafu;
use ui::{LiveDashboardApp, config::AppConfig};
use vts_dashboard::{DashboardError, MockTelemetryProducer, telemetry::producer::available_ports};

const REPLAY_LINE_DELAY_MS: u64 = 200;

#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("{source}"))]
    Dashboard { source: DashboardError },
    #[snafu(display("Could not start the dashboard window"))]
    Window { source: eframe::Error },
}

impl From<DashboardError> for CliError {
    fn from(value: DashboardError) -> Self {
        CliError::Dashboard { source: value }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the dashboard and read telemetry from a serial port
    Live {
        #[arg(short, long)]
        port: Option<String>,

        #[arg(short, long)]
        baud: Option<u32>,

        /// Heat length in minutes
        #[arg(long)]
        heat_minutes: Option<u32>,
    },
    /// Open the dashboard fed by a captured telemetry file
    Replay {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, default_value_t = REPLAY_LINE_DELAY_MS)]
        line_delay_ms: u64,
    },
    /// List the serial ports available on this machine
    Ports,
}

fn load_config() -> AppConfig {
    match AppConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            warn!("Ignoring unreadable config file: {}", e);
            AppConfig::default()
        }
    }
}

fn native_options() -> eframe::NativeOptions {
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_title("VTS Dashboard")
        .with_inner_size(Vec2::new(1000., 800.));
    native_options
}

fn live(port: Option<String>, baud: Option<u32>, heat_minutes: Option<u32>) -> Result<(), CliError> {
    let mut app_config = load_config();
    if port.is_some() {
        app_config.port_name = port;
    }
    if let Some(baud) = baud {
        app_config.baud_rate = baud;
    }
    if let Some(minutes) = heat_minutes {
        app_config.heat_duration_s = minutes.saturating_mul(60);
    }

    eframe::run_native(
        "VTS Dashboard",
        native_options(),
        Box::new(|cc| Ok(Box::new(LiveDashboardApp::new(app_config, cc)))),
    )
    .map_err(|e| CliError::Window { source: e })
}

fn replay(input: &Path, line_delay_ms: u64) -> Result<(), CliError> {
    let producer = MockTelemetryProducer::from_file(input)?
        .with_line_delay(Duration::from_millis(line_delay_ms));
    let app_config = load_config();

    eframe::run_native(
        "VTS Dashboard (replay)",
        native_options(),
        Box::new(|cc| {
            Ok(Box::new(LiveDashboardApp::with_producer(
                app_config, producer, cc,
            )))
        }),
    )
    .map_err(|e| CliError::Window { source: e })
}

fn ports() {
    let ports = available_ports();
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{}", port);
    }
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let result = match cli.command {
        Commands::Live {
            port,
            baud,
            heat_minutes,
        } => live(port, baud, heat_minutes),
        Commands::Replay {
            input,
            line_delay_ms,
        } => replay(&input, line_delay_ms),
        Commands::Ports => {
            ports();
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
