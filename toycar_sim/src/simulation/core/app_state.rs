// toycar_sim/src/simulation/core/app_state.rs

use bevy::{ecs::schedule::SystemSet, prelude::States};

/// Defines the major phases of the application's lifecycle.
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// The initial state. Configuration and the prefab catalog are loaded here.
    #[default]
    AssetLoading,

    /// Configuration is resolved. Vehicles are spawned from it.
    SceneBuilding,

    /// The fixed-step simulation loop is running.
    Running,

    /// The configured duration has elapsed. Outputs are flushed and the app exits.
    Finished,
}

/// System sets to control the order of execution during the SceneBuilding state.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneBuildSet {
    /// Pass 1: Create vehicle shells carrying the spawn request.
    CreateRequests,

    /// Pass 2: Attach the motion model and the integrator.
    ProcessVehicle,

    /// Pass 3: Attach the control source and the placement schedule.
    ProcessInput,

    /// Pass 4: Attach effect sinks and skins.
    ProcessAccessories,

    /// Pass 5: Remove all temporary request components.
    Cleanup,
}

// =========================================================================
// == Main Simulation Sets (The per-tick data flow) ==
// =========================================================================

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Advances the simulation clock. Runs first.
    Clock,
    /// Samples every vehicle's control source.
    Input,
    /// Applies tracking and placement changes.
    Placement,
    /// Advances the motion models.
    Motion,
    /// Integrates poses and probes the ground.
    Integration,
    /// Drives wheel, smoke, audio and skin sinks.
    Effects,
    /// Records telemetry and checks for the end of the run.
    Telemetry,
}
