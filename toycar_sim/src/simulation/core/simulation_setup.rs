// toycar_sim/src/simulation/core/simulation_setup.rs

use std::time::Duration;

use bevy::time::TimeUpdateStrategy;

use crate::prelude::*;
use crate::simulation::config::ResolvedVehicles;
use crate::simulation::core::components::MotionModel;
use crate::simulation::core::events::{CycleSkin, DriftEvent, PlacementChanged, TrackingStatusEvent};
use crate::simulation::core::spawn_requests::SpawnVehicleRequest;

/// Simulated time, advanced once per fixed tick while running.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimulationClock {
    pub ticks: u64,
    pub elapsed: f64,
    pub dt: f64,
    pub duration: f64,
}

impl SimulationClock {
    /// Simulated time at the start of the current tick.
    pub fn tick_start(&self) -> f64 {
        self.ticks.saturating_sub(1) as f64 * self.dt
    }
}

pub struct SimulationSetupPlugin;

impl Plugin for SimulationSetupPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<ScenarioConfig>()
            .map(|config| config.simulation)
            .unwrap_or_default();
        let dt = settings.fixed_dt();
        let tick = Duration::from_secs_f64(dt);

        // --- INITIALIZE RESOURCES & EVENTS ---
        app.insert_resource(SimulationClock {
            dt,
            duration: settings.duration_seconds,
            ..default()
        })
        .add_event::<TrackingStatusEvent>()
        .add_event::<PlacementChanged>()
        .add_event::<DriftEvent>()
        .add_event::<CycleSkin>();

        // Runs are batch jobs: every app update advances exactly one fixed tick.
        app.insert_resource(Time::<Fixed>::from_duration(tick))
            .insert_resource(TimeUpdateStrategy::ManualDuration(tick));

        // --- CONFIGURE THE SPAWNING PIPELINE ---
        app.configure_sets(
            OnEnter(AppState::SceneBuilding),
            (
                SceneBuildSet::CreateRequests,
                SceneBuildSet::ProcessVehicle,
                SceneBuildSet::ProcessInput,
                SceneBuildSet::ProcessAccessories,
                SceneBuildSet::Cleanup,
            )
                .chain(),
        );

        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            (
                spawn_vehicle_shells.in_set(SceneBuildSet::CreateRequests),
                cleanup_spawn_requests.in_set(SceneBuildSet::Cleanup),
                transition_to_running
                    .in_set(SceneBuildSet::Cleanup)
                    .after(cleanup_spawn_requests),
            ),
        );

        // Configure the runtime schedule graph.
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Clock,
                SimulationSet::Input,
                SimulationSet::Placement,
                SimulationSet::Motion,
                SimulationSet::Integration,
                SimulationSet::Effects,
                SimulationSet::Telemetry,
            )
                .chain()
                .run_if(in_state(AppState::Running)),
        );

        app.add_systems(
            FixedUpdate,
            (
                advance_clock.in_set(SimulationSet::Clock),
                check_run_finished.in_set(SimulationSet::Telemetry),
            ),
        )
        .add_systems(
            OnEnter(AppState::Finished),
            (log_run_summary, exit_app).chain(),
        );
    }
}

fn spawn_vehicle_shells(mut commands: Commands, resolved_vehicles: Res<ResolvedVehicles>) {
    for vehicle in &resolved_vehicles.0 {
        info!("[SPAWN] Posting spawn request for vehicle: {}", &vehicle.name);
        commands.spawn((
            Name::new(vehicle.name.clone()),
            vehicle.start_pose.to_bevy_transform(),
            SpawnVehicleRequest(vehicle.clone()),
        ));
    }
}

fn cleanup_spawn_requests(mut commands: Commands, query: Query<Entity, With<SpawnVehicleRequest>>) {
    debug!("[CLEANUP] Removing spawn request components.");
    for entity in &query {
        commands.entity(entity).remove::<SpawnVehicleRequest>();
    }
}

fn transition_to_running(mut next_state: ResMut<NextState<AppState>>) {
    info!("Scene building complete. Transitioning to Running state.");
    next_state.set(AppState::Running);
}

fn advance_clock(mut clock: ResMut<SimulationClock>) {
    clock.ticks += 1;
    clock.elapsed = clock.ticks as f64 * clock.dt;
}

fn check_run_finished(clock: Res<SimulationClock>, mut next_state: ResMut<NextState<AppState>>) {
    // Half a tick of slack so float accumulation cannot add an extra tick.
    if clock.elapsed + 0.5 * clock.dt >= clock.duration {
        next_state.set(AppState::Finished);
    }
}

fn log_run_summary(clock: Res<SimulationClock>, query: Query<(&Name, &MotionModel, &Transform)>) {
    info!(
        "Run finished after {} ticks ({:.2} s simulated).",
        clock.ticks, clock.elapsed
    );
    for (name, model, transform) in &query {
        let state = model.0.state();
        info!(
            "[SUMMARY] {}: position ({:.2}, {:.2}, {:.2}), heading {:.1} deg, speed {:.3} m/s, drift {:?}",
            name,
            transform.translation.x,
            transform.translation.y,
            transform.translation.z,
            state.heading_deg,
            state.forward_speed,
            state.drift,
        );
    }
}

fn exit_app(mut exit: EventWriter<AppExit>) {
    exit.write(AppExit::Success);
}
