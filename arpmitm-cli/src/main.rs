//! arpmitm binary entry point

mod args;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use arpmitm_engine::AttackEngine;

use crate::args::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list {
        return list_interfaces();
    }

    run_attack(&cli)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn list_interfaces() -> ExitCode {
    match arpmitm_net::interface::list_interfaces() {
        Ok(interfaces) if interfaces.is_empty() => {
            error!("no active network interfaces found");
            ExitCode::FAILURE
        }
        Ok(interfaces) => {
            println!("Available network interfaces:");
            for (i, iface) in interfaces.iter().enumerate() {
                println!("{}. {}", i + 1, iface);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_attack(cli: &Cli) -> ExitCode {
    let config = match cli.attack_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut engine = AttackEngine::new(arpmitm_net::platform());
    engine.set_on_stop(|| info!("attack stopped by request"));

    let stop = engine.stop_handle();
    if let Err(e) = ctrlc::set_handler(move || stop.request_stop()) {
        error!("failed to install Ctrl+C handler: {e}");
        return ExitCode::FAILURE;
    }

    if let Err(e) = engine.configure(config) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    info!("press Ctrl+C to stop");
    match engine.start() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
