// src/main.rs
mod config;
mod drivers;
use anyhow::{Context, Result};
use log::info;
use crate::config::RunConfig;
use crate::drivers::{list_record_names, DirectorySink, QuickLook, WfdbReader};
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = RunConfig::from_args(std::env::args().skip(1))?;
    info!("run config: {}", serde_json::to_string(&config)?);
    let reader = WfdbReader::new(&config.source_dir);
    let names = list_record_names(reader.dir())
        .with_context(|| format!("listing records in {}", reader.dir().display()))?;
    info!("{} records in {}", names.len(), reader.dir().display());
    let sink = DirectorySink::create(&config.output_dir)
        .with_context(|| format!("preparing output directory {}", config.output_dir.display()))?;
    info!("writing images to {}", sink.root().display());
    let mut quick_look = QuickLook::new(reader, sink, config.export.clone());
    let summary = quick_look.run(&names).context("export run aborted")?;
    info!(
        "done: {} segment images; {}",
        summary.total_segments(),
        serde_json::to_string(&summary)?
    );
    Ok(())
}
