// toycar_sim/src/cli.rs

use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

use crate::simulation::config::structs::RunOptions;

/// Toycar: a headless simulator for AR toy-car motion.
///
/// Runs a scenario of scripted cars for a fixed amount of simulated time and
/// reports their telemetry.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/showcase.toml")]
    pub scenario: PathBuf,

    /// The root of the prefab catalog.
    #[arg(long, default_value = "assets/catalog")]
    pub catalog: PathBuf,

    /// Skin preference file, read at startup and written at the end of the run.
    #[arg(long)]
    pub skin_prefs: Option<PathBuf>,

    /// Write per-vehicle telemetry samples to this CSV file.
    #[arg(long)]
    pub telemetry_csv: Option<PathBuf>,

    /// Override the scenario's duration, in seconds.
    #[arg(short, long)]
    pub duration: Option<f64>,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            catalog_dir: self.catalog.clone(),
            skin_prefs: self.skin_prefs.clone(),
            telemetry_csv: self.telemetry_csv.clone(),
        }
    }
}
