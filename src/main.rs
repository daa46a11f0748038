use std::fs;
use std::io;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use risc86::config::Config;
use risc86::dump;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter = match config.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let program = fs::read(&config.input).with_context(|| format!("reading {}", config.input.display()))?;
    tracing::info!(bytes = program.len(), path = %config.input.display(), "loaded program image");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let machine = risc86::run_program(&program, config.mode(), &mut out).map_err(|err| {
        tracing::error!(%err, "simulation stopped");
        err
    })?;

    if let Some(path) = &config.dump {
        dump::write_memory_image(path, &machine).with_context(|| format!("writing memory dump to {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote memory dump");
    }

    Ok(())
}
