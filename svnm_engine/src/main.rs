#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! SVNM terminal player.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use svnm_engine::data_paths::data_root;
use svnm_engine::{SVNM_VERSION, load_config, load_narrative, run_player};

fn main() -> Result<()> {
    env_logger::init();
    info!("data root: {}", data_root().display());
    let config = load_config();
    info!("Start: loading narrative...");
    let svnm = Arc::new(load_narrative(&config).context("while loading the narrative")?);

    println!(
        "{:^60}",
        format!("SVNM {SVNM_VERSION}").bright_yellow().underline()
    );
    println!("{}", "enter to continue, :help for commands".dimmed());

    run_player(svnm, &config.states.start)
}
