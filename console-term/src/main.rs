//! Glyph Console
//!
//! A single-line text console drawn from a glyph atlas.

mod app;
mod config;
mod font_atlas;
mod headless;
mod keys;
mod raster;
mod session;

use std::error::Error;
use std::io;

use app::App;
use clap::Parser;
use config::{CliArgs, Config};

fn main() -> Result<(), Box<dyn Error>> {
    // Users can set RUST_LOG=info or RUST_LOG=debug for more verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    log::debug!("Starting Glyph Console");

    let args = CliArgs::parse();

    // Load configuration with precedence: CLI > env > file > defaults
    let config = match Config::load_with_args(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    log::debug!("Theme: {:?}", config.theme);
    log::debug!("Font size: {}px", config.font.size);

    if args.headless {
        headless::run(&config, io::stdin().lock(), io::stdout().lock())?;
    } else {
        let app = App::new(config)?;
        app.run()?;
    }

    log::debug!("Glyph Console exited");
    Ok(())
}
