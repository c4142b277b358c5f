// toycar_sim/src/simulation/plugins/input.rs

//! Control sources. Each car replays its `script` timeline or the recorded
//! device states chosen by its `input` table.

use toycar_core::input::{DeviceTimeline, InputScript, InputSource, PrioritizedInput};

use crate::prelude::*;
use crate::simulation::config::structs::{InputConfig, VehicleConfig};
use crate::simulation::core::components::ControlSource;
use crate::simulation::core::simulation_setup::SimulationClock;
use crate::simulation::core::spawn_requests::SpawnVehicleRequest;

pub struct ScriptedInputPlugin;

impl Plugin for ScriptedInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            attach_input_scripts.in_set(SceneBuildSet::ProcessInput),
        )
        .add_systems(
            FixedUpdate,
            sample_control_sources.in_set(SimulationSet::Input),
        );
    }
}

/// Builds the boxed source for a vehicle. The flag is true when it has nothing to replay.
fn build_control_source(vehicle: &VehicleConfig) -> (Box<dyn InputSource>, bool) {
    match &vehicle.input {
        InputConfig::Script => (
            Box::new(InputScript::new(vehicle.script.clone())),
            vehicle.script.is_empty(),
        ),
        InputConfig::Joystick { moves } => (
            Box::new(DeviceTimeline::new(moves.clone())),
            moves.is_empty(),
        ),
        InputConfig::Buttons { presses } => (
            Box::new(DeviceTimeline::new(presses.clone())),
            presses.is_empty(),
        ),
        InputConfig::KeyboardOverJoystick { keyboard, joystick } => (
            Box::new(PrioritizedInput::new(
                Box::new(DeviceTimeline::new(keyboard.clone())),
                Box::new(DeviceTimeline::new(joystick.clone())),
            )),
            keyboard.is_empty() && joystick.is_empty(),
        ),
    }
}

fn attach_input_scripts(mut commands: Commands, query: Query<(Entity, &SpawnVehicleRequest)>) {
    for (entity, request) in &query {
        let vehicle = &request.0;
        if vehicle.input != InputConfig::Script && !vehicle.script.is_empty() {
            warn!(
                "Vehicle '{}' is driven by its input device; its script is ignored.",
                vehicle.name
            );
        }

        let (source, idle) = build_control_source(vehicle);
        if idle {
            warn!(
                "Vehicle '{}' has no input to replay; it will sit idle.",
                vehicle.name
            );
        }
        debug!("[SPAWN] '{}' input: {:?}", vehicle.name, source);

        commands
            .entity(entity)
            .insert((ControlSource(source), CurrentInput::default()));
    }
}

/// Samples at the start-of-tick time, then moves the source's clock on.
fn sample_control_sources(
    clock: Res<SimulationClock>,
    mut query: Query<(&mut ControlSource, &mut CurrentInput)>,
) {
    for (mut source, mut input) in &mut query {
        input.0 = source.0.sample();
        source.0.advance(clock.dt);
    }
}
