// toycar_sim/src/simulation/core/spawn_requests.rs

use crate::prelude::VehicleConfig;
use bevy::prelude::Component;

#[derive(Component, Clone)]
pub struct SpawnVehicleRequest(pub VehicleConfig);
