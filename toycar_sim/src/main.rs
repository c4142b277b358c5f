// toycar_sim/src/main.rs

//! Headless entry point: loads a scenario, runs it for its duration and exits.
//!
//! To run the showcase scenario from the workspace root:
//! `cargo run -p toycar_sim -- --telemetry-csv telemetry.csv`

use bevy::{log::LogPlugin, prelude::*};
use clap::Parser;

use toycar_sim::add_headless_simulation;
use toycar_sim::cli::Cli;
use toycar_sim::simulation::config::load_scenario;

fn main() -> AppExit {
    let cli = Cli::parse();

    let mut app = App::new();
    app.add_plugins(LogPlugin {
        level: bevy::log::Level::INFO,
        filter: "info,toycar_sim=debug,toycar_core=debug".to_string(),
        ..default()
    });

    // --- 1. Load Simulation Configuration ---
    info!("Loading scenario from: {:?}", cli.scenario);
    let mut scenario = match load_scenario(&cli.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!("{}", e);
            return AppExit::error();
        }
    };
    if let Some(duration) = cli.duration {
        scenario.simulation.duration_seconds = duration;
    }
    if let Err(e) = scenario.simulation.validate() {
        error!("Invalid simulation settings: {}", e);
        return AppExit::error();
    }

    // --- 2. Add the Simulation ---
    let options = cli.run_options();
    add_headless_simulation(&mut app, scenario, options);
    app.insert_resource(cli);

    // --- 3. Run the App ---
    info!("Starting toycar simulation...");
    app.run()
}
