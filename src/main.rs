use anyhow::Result;
use clap::Parser;
use tracing::error;

mod app;
mod cli;
mod config;
mod controller;
mod db;
mod dictation;
mod domain;
mod export;
mod format;
mod logging;
mod markdown;
mod store;
mod tui;

use app::AppContext;
use cli::{args::Cli, commands::dispatch};
use config::Settings;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    logging::init_logging(&settings.log_path(), &settings.log_filter)?;

    let mut app = AppContext::open(settings)?;
    let result = dispatch(&mut app, cli);
    if let Err(err) = &result {
        error!("{err:#}");
    }
    app.close()?;
    result
}
