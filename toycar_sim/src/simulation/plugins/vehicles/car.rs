// toycar_sim/src/simulation/plugins/vehicles/car.rs

use nalgebra::Vector3;
use toycar_core::integrator::KinematicIntegrator;

use crate::prelude::*;
use crate::simulation::core::components::{BodyIntegrator, GroundProbe, LatestMotion, MotionModel};
use crate::simulation::core::events::DriftEvent;
use crate::simulation::core::simulation_setup::SimulationClock;
use crate::simulation::core::spawn_requests::SpawnVehicleRequest;
use crate::simulation::core::transforms::pose_to_transform;

/// Height above the ground plane that still counts as touching it.
const GROUND_TOLERANCE: f64 = 1e-3;

// --- THE PLUGIN ---
pub struct CarPlugin;

impl Plugin for CarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            process_car_logic.in_set(SceneBuildSet::ProcessVehicle),
        )
        .add_systems(
            FixedUpdate,
            (
                advance_motion_models.in_set(SimulationSet::Motion),
                (integrate_bodies, probe_ground)
                    .chain()
                    .in_set(SimulationSet::Integration),
            ),
        );
    }
}

// --- SYSTEMS ---

/// SPAWNING: Builds the motion model and kinematic body from the request.
fn process_car_logic(mut commands: Commands, request_query: Query<(Entity, &SpawnVehicleRequest)>) {
    for (entity, request) in &request_query {
        let config = &request.0;

        let model = if config.placement.placed_at_start {
            VehicleMotionModel::new(config.motion.clone())
        } else {
            VehicleMotionModel::awaiting_placement(config.motion.clone())
        };
        let mut model = model.with_heading(config.start_pose.heading_deg);

        let start = config.start_pose.to_isometry();
        if start.translation.vector.y > config.ground.height + GROUND_TOLERANCE {
            model.on_ground_contact(None);
        }

        let integrator = KinematicIntegrator::new(start)
            .with_gravity(config.ground.gravity, config.ground.gravity_multiplier);

        debug!(
            "[SPAWN] '{}': placed={}, grounded={}",
            config.name,
            model.is_placed(),
            model.ground().is_grounded()
        );

        commands.entity(entity).insert((
            MotionModel(model),
            BodyIntegrator(Box::new(integrator)),
            GroundProbe {
                height: config.ground.height,
            },
            LatestMotion::default(),
        ));
    }
}

/// RUNTIME: One `advance` per car per fixed tick.
fn advance_motion_models(
    clock: Res<SimulationClock>,
    mut drift_events: EventWriter<DriftEvent>,
    mut query: Query<(Entity, &mut MotionModel, &CurrentInput, &mut LatestMotion)>,
) {
    for (entity, mut model, input, mut latest) in &mut query {
        let output = model.0.advance(clock.dt, input.0);
        if let Some(edge) = output.drift_edge {
            drift_events.write(DriftEvent { entity, edge });
        }
        latest.0 = Some(output);
    }
}

/// RUNTIME: Hands the tick's motion to the integrator and mirrors the pose.
fn integrate_bodies(
    clock: Res<SimulationClock>,
    mut query: Query<(&mut BodyIntegrator, &LatestMotion, &mut Transform)>,
) {
    for (mut integrator, latest, mut transform) in &mut query {
        let Some(output) = latest.0 else {
            continue;
        };
        let pose = integrator.0.integrate(&output, clock.dt);
        *transform = pose_to_transform(&pose);
    }
}

/// RUNTIME: Tests each body against its ground plane and reports contact to the model.
fn probe_ground(
    mut query: Query<(
        &Name,
        &mut BodyIntegrator,
        &GroundProbe,
        &mut MotionModel,
        &mut Transform,
    )>,
) {
    for (name, mut integrator, probe, mut model, mut transform) in &mut query {
        let height = integrator.0.pose().translation.vector.y;
        let was_grounded = model.0.ground().is_grounded();

        if height <= probe.height + GROUND_TOLERANCE {
            if height < probe.height || !was_grounded {
                integrator.0.land(probe.height);
                transform.translation.y = probe.height as f32;
            }
            model.0.on_ground_contact(Some(Vector3::y()));
            if !was_grounded {
                debug!("'{}' landed.", name);
            }
        } else {
            model.0.on_ground_contact(None);
            if was_grounded {
                debug!("'{}' left the ground.", name);
            }
        }
    }
}
