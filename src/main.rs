/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Main executable for rowland-rs

use clap::Parser;
use rowland_rs::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    log::debug!("rowland-rs v{}", rowland_rs::VERSION);
    run(cli)
}
