//! Opens a window and renders the agent field shader with a debug overlay.
//!
//! Controls: left-drag pans, the wheel zooms around the pointer, Home resets
//! the view, F1 toggles the overlay and Escape quits.

mod app;
mod camera;
mod config;
mod hud;
mod palette;
mod population;

use std::process::ExitCode;

use quadshade_engine::logging::{init_logging, LoggingConfig};
use quadshade_engine::window::Runtime;

use crate::app::DemoApp;
use crate::config::{AppConfig, AssetPaths};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());
    log::info!("Start");

    let assets = match AssetPaths::from_env() {
        Ok(paths) => paths,
        Err(e) => {
            log::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let config = AppConfig::default();
    let runtime = config.runtime();
    let gpu = config.gpu();

    match Runtime::run(runtime, gpu, DemoApp::new(config, assets)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("exiting after error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
