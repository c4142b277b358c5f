// toycar_sim/src/simulation/config/mod.rs

//! Loading, resolving and validating simulation configuration, including the
//! prefab catalog system.

mod catalog;
mod resolver;

pub mod structs;

use bevy::prelude::*;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use crate::prelude::AppState;
use catalog::load_catalog_from_disk;
pub use catalog::PrefabCatalog;
pub use resolver::{resolve_vehicle_value, ResolveError};
pub use structs::{RunOptions, ScenarioConfig, VehicleConfig};

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app
            // The final, resolved vehicle configurations.
            .init_resource::<ResolvedVehicles>()
            // The raw, unresolved catalog data.
            .init_resource::<PrefabCatalog>()
            .init_resource::<ScenarioConfig>()
            .init_resource::<RunOptions>()
            .add_systems(
                OnEnter(AppState::AssetLoading),
                (
                    load_catalog_from_disk,
                    resolve_scenario_vehicles,
                    transition_to_scene_building,
                )
                    .chain(),
            );
    }
}

#[derive(Resource, Default, Debug)]
pub struct ResolvedVehicles(pub Vec<VehicleConfig>);

#[derive(Debug, thiserror::Error)]
pub enum ScenarioLoadError {
    #[error("scenario file not found at {0:?}")]
    NotFound(PathBuf),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] figment::Error),
}

/// Reads a scenario file from disk.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, ScenarioLoadError> {
    if !path.is_file() {
        return Err(ScenarioLoadError::NotFound(path.to_path_buf()));
    }
    Ok(Figment::new().merge(Toml::file(path)).extract()?)
}

/// Resolves one raw `[[vehicles]]` entry into a validated config.
pub fn resolve_vehicle(
    value: &figment::value::Value,
    catalog: &PrefabCatalog,
) -> Result<VehicleConfig, String> {
    let resolved = resolve_vehicle_value(value, catalog).map_err(|e| e.to_string())?;
    let vehicle: VehicleConfig = resolved
        .deserialize()
        .map_err(|e| format!("failed to deserialize resolved vehicle: {e}"))?;
    vehicle
        .motion
        .validate()
        .map_err(|e| format!("vehicle '{}': {e}", vehicle.name))?;
    Ok(vehicle)
}

fn resolve_scenario_vehicles(
    scenario: Res<ScenarioConfig>,
    catalog: Res<PrefabCatalog>,
    mut resolved_vehicles: ResMut<ResolvedVehicles>,
) {
    for vehicle_value in &scenario.vehicles {
        match resolve_vehicle(vehicle_value, &catalog) {
            Ok(vehicle) => {
                info!("Resolved vehicle: '{}'", &vehicle.name);
                resolved_vehicles.0.push(vehicle);
            }
            Err(e) => {
                error!("Failed to resolve vehicle config: {}. Skipping vehicle.", e);
            }
        }
    }
}

fn transition_to_scene_building(mut next_state: ResMut<NextState<AppState>>) {
    info!("Configuration loading and resolution complete. Transitioning to SceneBuilding state.");
    next_state.set(AppState::SceneBuilding);
}
