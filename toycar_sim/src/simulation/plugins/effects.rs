// toycar_sim/src/simulation/plugins/effects.rs

//! Effect sinks driven by the motion output: wheel meshes, tyre smoke, engine
//! audio and wheel colliders. A car only gets the sinks its motion params configure.

use toycar_core::models::motion::{DriftEdge, WheelCommands};

use crate::prelude::*;
use crate::simulation::core::events::DriftEvent;
use crate::simulation::core::simulation_setup::SimulationClock;
use crate::simulation::core::spawn_requests::SpawnVehicleRequest;

// --- BEVY COMPONENTS for effect sinks ---

/// Wheel mesh rotation. Rear wheels roll; front wheels roll and steer.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct WheelVisuals {
    pub spin_deg: f64,
    pub front_steer_deg: f64,
}

/// Rear tyre smoke emitters.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct TireSmoke {
    pub emitting: bool,
    pub intensity: f64,
    /// Particles per second.
    pub rate: f64,
    /// Total particles emitted so far.
    pub emitted: f64,
    /// Number of drifts that started emission.
    pub bursts: u32,
}

#[derive(Component, Debug, Default, Clone, Copy)]
pub struct EngineAudio {
    pub pitch: f64,
}

/// Actuation last sent to the wheel colliders.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct WheelColliders(pub WheelCommands);

// --- THE PLUGIN ---
pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            attach_effect_sinks.in_set(SceneBuildSet::ProcessAccessories),
        )
        .add_systems(
            FixedUpdate,
            (count_smoke_bursts, drive_effect_sinks)
                .chain()
                .in_set(SimulationSet::Effects),
        );
    }
}

// --- SYSTEMS ---

fn attach_effect_sinks(mut commands: Commands, query: Query<(Entity, &SpawnVehicleRequest)>) {
    for (entity, request) in &query {
        let motion = &request.0.motion;
        let mut entity_commands = commands.entity(entity);
        if motion.wheel_visuals.is_some() {
            entity_commands.insert(WheelVisuals::default());
        }
        if motion.smoke.is_some() {
            entity_commands.insert(TireSmoke::default());
        }
        if let Some(engine) = motion.engine {
            entity_commands.insert(EngineAudio {
                pitch: engine.base_pitch,
            });
        }
        if motion.wheels.is_some() {
            entity_commands.insert(WheelColliders::default());
        }
    }
}

fn count_smoke_bursts(
    mut drift_events: EventReader<DriftEvent>,
    mut query: Query<(&Name, Option<&mut TireSmoke>)>,
) {
    for event in drift_events.read() {
        let Ok((name, smoke)) = query.get_mut(event.entity) else {
            continue;
        };
        debug!("'{}' drift edge: {:?}", name, event.edge);
        if let (DriftEdge::Entered, Some(mut smoke)) = (event.edge, smoke) {
            smoke.bursts += 1;
        }
    }
}

fn drive_effect_sinks(
    clock: Res<SimulationClock>,
    mut query: Query<(
        &LatestMotion,
        Option<&mut WheelVisuals>,
        Option<&mut TireSmoke>,
        Option<&mut EngineAudio>,
        Option<&mut WheelColliders>,
    )>,
) {
    for (latest, wheels, smoke, engine, colliders) in &mut query {
        let Some(output) = latest.0 else {
            continue;
        };

        if !output.applied {
            // The car is not placed; hold every sink except the smoke.
            if let Some(mut smoke) = smoke {
                smoke.emitting = false;
                smoke.intensity = 0.0;
                smoke.rate = 0.0;
            }
            continue;
        }

        if let (Some(mut wheels), Some(pose)) = (wheels, output.wheel_pose) {
            wheels.spin_deg = pose.spin_deg;
            wheels.front_steer_deg = pose.front_steer_deg;
        }
        if let (Some(mut smoke), Some(emission)) = (smoke, output.smoke) {
            smoke.emitting = emission.emitting;
            smoke.intensity = emission.intensity;
            smoke.rate = emission.rate;
            smoke.emitted += emission.rate * clock.dt;
        }
        if let (Some(mut engine), Some(pitch)) = (engine, output.engine_pitch) {
            engine.pitch = pitch;
        }
        if let (Some(mut colliders), Some(commands)) = (colliders, output.wheels) {
            colliders.0 = commands;
        }
    }
}
