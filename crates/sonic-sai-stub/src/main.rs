//! LAG flow runner for the stub SAI.
//!
//! Initializes the stub switch, prints its port list and runs the scripted
//! LAG flows against it.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info};
use sonic_sai_stub::{LagFlow, SaiContext, StubConfig};

/// Hardware id passed to switch initialization.
const HARDWARE_ID: &str = "HW_ID";

/// Which flows to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FlowSelection {
    All,
    Basic,
    Limits,
}

impl FlowSelection {
    fn flows(self) -> Vec<LagFlow> {
        match self {
            FlowSelection::All => LagFlow::ALL.to_vec(),
            FlowSelection::Basic => vec![LagFlow::Basic],
            FlowSelection::Limits => vec![LagFlow::Limits],
        }
    }
}

/// Stub SAI LAG test runner
#[derive(Parser, Debug)]
#[command(name = "sai-lag-test")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Flows to run
    #[arg(short = 'f', long, value_enum, default_value = "all")]
    flow: FlowSelection,
}

fn load_config(path: Option<&PathBuf>) -> Result<StubConfig> {
    match path {
        Some(path) => StubConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(StubConfig::default()),
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    info!(
        "Switch ports: {}, max LAGs: {}, max ports per LAG: {}",
        config.switch.port_count, config.lag.max_lags, config.lag.max_ports_per_lag
    );

    let mut ctx = SaiContext::new(config).context("invalid configuration")?;
    ctx.initialize_switch(HARDWARE_ID)
        .context("failed to initialize switch")?;

    let ports = ctx
        .switch_api()
        .port_list()
        .context("failed to get switch port list")?;
    info!("Switch ports available:");
    for (i, port) in ports.iter().enumerate() {
        info!("{:<2}: 0x{:010x}", i, port.as_raw());
    }

    let result = args.flow.flows().into_iter().try_for_each(|flow| {
        flow.run(&mut ctx)
            .with_context(|| format!("LAG test flow {} failed", flow))?;
        info!("LAG test flow {} passed", flow);
        Ok(())
    });

    ctx.shutdown_switch();
    result
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
