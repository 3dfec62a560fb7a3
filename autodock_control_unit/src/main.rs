//! # Autodock
//!
//! Runs the autocharge control loop against a peripheral driver.
//!
//! # Usage
//!
//! ```bash
//! # Simulated robot, defaults
//! autodock --simulate
//!
//! # Custom thresholds, stop after 5000 steps, debug logging
//! autodock -s --config config/autocharge.toml --max-steps 5000 -v
//!
//! # Robot already parked on the guide line
//! autodock -s --start-state follow-line
//! ```

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use autodock_common::prelude::DEFAULT_TIMEBASE_PERIOD;
use autodock_control_unit::{AutochargeFsm, FsmState};
use autodock_control_unit::config::{AutochargeConfig, load_config};
use autodock_control_unit::cycle::CycleRunner;
use autodock_control_unit::timebase::Timebase;
use autodock_hal::drivers::{AVAILABLE_DRIVERS, create_driver};
use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Autodock - autonomous line-guided docking and charging
#[derive(Parser, Debug)]
#[command(name = "autodock")]
#[command(version)]
#[command(about = "Autocharge state machine for a line-guided docking robot")]
struct Args {
    /// Path to the TOML configuration. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Force the simulation driver.
    #[arg(short = 's', long)]
    simulate: bool,

    /// Driver to load.
    #[arg(short, long, default_value = "simulation")]
    driver: String,

    /// Begin in this state instead of Explore (explore, search-line,
    /// follow-line, charge).
    #[arg(long, value_name = "STATE")]
    start_state: Option<FsmState>,

    /// Stop after this many control steps.
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path),
        None => Ok(AutochargeConfig::default()),
    };
    setup_tracing(&args, config.as_ref().ok());

    info!("Autodock v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        .and_then(|config| run(&args, config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Autodock shutdown complete");
}

fn run(args: &Args, config: AutochargeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let driver_name = if args.simulate {
        info!("Simulation mode enabled");
        "simulation"
    } else {
        args.driver.as_str()
    };
    info!(
        "Service '{}' using driver '{}' (available: {:?})",
        config.shared.service_name, driver_name, AVAILABLE_DRIVERS
    );

    let mut driver = create_driver(driver_name, &config.simulation)?;
    let peripherals = driver.peripherals();
    let ground = driver.ground_topic();
    let feed = ground.subscribe();
    driver.start()?;

    let running = Arc::new(AtomicBool::new(true));
    let timebase = Timebase::new();
    let ticker = timebase.spawn_ticker(DEFAULT_TIMEBASE_PERIOD, Arc::clone(&running))?;

    let r = Arc::clone(&running);
    let topic = ground.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
        topic.close();
    })?;

    let mut fsm = AutochargeFsm::new(&config, timebase);
    if let Some(state) = args.start_state {
        fsm.resume(state);
    }
    let mut runner = CycleRunner::new(fsm, peripherals, feed, Arc::clone(&running))
        .with_max_steps(args.max_steps);
    let outcome = runner.run();

    running.store(false, Ordering::SeqCst);
    if ticker.join().is_err() {
        warn!("Timebase thread panicked");
    }
    driver.shutdown()?;

    let stats = outcome?;
    info!(
        "Final state {} after {} steps (avg step {}us)",
        runner.fsm().state(),
        stats.steps,
        stats.avg_step_us()
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, config: Option<&AutochargeConfig>) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        let level = config
            .map(|c| c.shared.log_level.as_directive())
            .unwrap_or("info");
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
