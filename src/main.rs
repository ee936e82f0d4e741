use std::time::Duration;

use clap::Parser;
use crossbeam_channel::never;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod ads;
pub mod config;
pub mod direction;
pub mod display;
pub mod doors;
pub mod elevator;
pub mod error;
pub mod fsm;
pub mod inputs;
pub mod scheduler;
pub mod timer;

use crate::config::{Args, Config};
use crate::display::{HallDisplay, LogDisplay, TerminalDisplay};
use crate::elevator::FloorPosition;
use crate::error::AppError;

const INPUT_POLL_PERIOD: Duration = Duration::from_millis(25);

fn init_tracing(headless: bool) {
    // the terminal panel owns stdout, keep stderr quiet unless asked
    let default_filter = if headless { "warn,elevator_display=info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();
    init_tracing(args.headless);

    // READ CONFIGURATION
    let config = Config::get(&args)?;
    info!(
        start_floor = config.start_floor,
        tick_ms = config.tick_interval.as_millis() as u64,
        step_ms = config.step_interval.as_millis() as u64,
        ad_source = %config.ad_source.display(),
        headless = config.headless,
        "elevator display starting"
    );

    // INITIALIZE DISPLAY AND INPUTS
    let mut display: Box<dyn HallDisplay> = if config.headless {
        Box::new(LogDisplay::new())
    } else {
        Box::new(TerminalDisplay::new(
            config.ad_geometry,
            FloorPosition::new(config.start_floor).digits(),
        )?)
    };
    let quit_rx = if config.headless {
        never()
    } else {
        inputs::init(INPUT_POLL_PERIOD)?
    };

    // RUN UNTIL QUIT OR DEADLINE
    scheduler::run(&config, display.as_mut(), quit_rx)
}
