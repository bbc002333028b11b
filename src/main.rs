use std::io::Write;

use anyhow::Context;
use astar_visualizer::shell::{config, window, Visualizer};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = config::Args::parse();
    let config = config::resolve(&args).context("invalid configuration")?;
    log::info!(
        "Starting with a {0}x{0} grid in a {1}px window",
        config.grid_size,
        config.window_width
    );
    let visualizer = Visualizer::new(config).context("failed to build grid")?;
    window::run(visualizer).map_err(|e| anyhow::anyhow!("window closed with an error: {e}"))?;
    Ok(())
}
