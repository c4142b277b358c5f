// toycar_sim/src/prelude.rs

// Re-export the entire Bevy prelude for convenience.
pub use bevy::prelude::*;

// Re-export the toycar_core prelude so pure types like `VehicleMotionModel`,
// `DriveInput` and `TrackingStatus` are available everywhere.
pub use toycar_core::prelude::*;

// Re-export common simulation-specific types for easy access in other plugins.
pub use crate::simulation::config::structs::*;
pub use crate::simulation::core::app_state::{AppState, SceneBuildSet, SimulationSet};
pub use crate::simulation::core::components::{CurrentInput, LatestMotion, MotionModel};
pub use crate::simulation::core::simulation_setup::SimulationClock;
