use clap::Parser;
use flamewatch_cv::{MonitorConfig, StopHandle};
use log::info;

mod runner;

use runner::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Some(path) = &args.write_default_config {
        MonitorConfig::default().save(path)?;
        info!("Default configuration written to {:?}", path);
        return Ok(());
    }

    let config = runner::load_config(&args)?;
    info!(
        "Band {:?}..{:?}, area > {}, cooldown {}ms, max {} fps",
        <[u8; 3]>::from(config.band.lower),
        <[u8; 3]>::from(config.band.upper),
        config.area_threshold,
        config.cooldown_ms,
        config.max_fps
    );

    let stop = StopHandle::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        info!("Shutdown signal received...");
        handler_stop.stop();
    })?;

    let summary = runner::run(&args, &config, stop)?;

    if args.json_stats {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
