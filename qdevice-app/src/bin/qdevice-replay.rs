//! Replay a scripted event sequence against one decision algorithm.

use std::path::PathBuf;

use clap::Parser;
use qdevice_app::{fatal, logging, replay, AppError, DeviceConfig, FailFast, Session};
use qdevice_core::AlgorithmRegistry;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "qdevice-replay")]
#[command(about = "Feed a scripted event list through a qdevice decision algorithm")]
struct Args {
    /// Device configuration (JSON).
    #[arg(short, long)]
    config: PathBuf,

    /// Event script (JSON array).
    #[arg(short, long)]
    events: PathBuf,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!(error = %err, "replay failed");
        eprintln!("qdevice-replay: {err}");
        std::process::exit(2);
    }
}

fn run(args: &Args) -> Result<(), AppError> {
    let config = DeviceConfig::load(&args.config)?;
    logging::init(config.log_filter.as_deref());

    let algorithm = config.algorithm_id()?;
    let events_json = std::fs::read_to_string(&args.events).map_err(|source| AppError::Io {
        path: args.events.clone(),
        source,
    })?;
    let events = replay::parse_events(&events_json)?;

    let registry = match AlgorithmRegistry::builtin() {
        Ok(registry) => registry,
        Err(err) => fatal::abort_startup(&err),
    };
    info!(%algorithm, events = events.len(), "starting replay");

    let mut session = Session::open(
        &registry,
        algorithm,
        config.instance_options(),
        FailFast::process(),
    )?;
    let records = replay::run(&mut session, events);
    session.close();

    for record in records? {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
