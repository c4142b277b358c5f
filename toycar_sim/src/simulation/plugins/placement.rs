// toycar_sim/src/simulation/plugins/placement.rs

//! Replays scripted tracking changes and feeds them to the placement gates.

use crate::prelude::*;
use crate::simulation::core::events::{PlacementChanged, TrackingStatusEvent};
use crate::simulation::core::simulation_setup::SimulationClock;
use crate::simulation::core::spawn_requests::SpawnVehicleRequest;

/// Pending tracking changes for one car, sorted by time.
#[derive(Component, Debug, Clone)]
pub struct TrackingSchedule {
    steps: Vec<TrackingStep>,
    next: usize,
}

impl TrackingSchedule {
    pub fn new(mut steps: Vec<TrackingStep>) -> Self {
        steps.retain(|step| step.at.is_finite());
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { steps, next: 0 }
    }

    /// Returns the statuses whose time has come, in order.
    pub fn due(&mut self, time: f64) -> Vec<TrackingStatus> {
        let mut due = Vec::new();
        while let Some(step) = self.steps.get(self.next) {
            if step.at > time {
                break;
            }
            due.push(step.status);
            self.next += 1;
        }
        due
    }
}

pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(AppState::SceneBuilding),
            attach_tracking_schedules.in_set(SceneBuildSet::ProcessInput),
        )
        .add_systems(
            FixedUpdate,
            (replay_tracking_schedules, apply_tracking_events)
                .chain()
                .in_set(SimulationSet::Placement),
        );
    }
}

fn attach_tracking_schedules(mut commands: Commands, query: Query<(Entity, &SpawnVehicleRequest)>) {
    for (entity, request) in &query {
        let events = &request.0.placement.events;
        if !events.is_empty() {
            commands
                .entity(entity)
                .insert(TrackingSchedule::new(events.clone()));
        }
    }
}

fn replay_tracking_schedules(
    clock: Res<SimulationClock>,
    mut tracking_events: EventWriter<TrackingStatusEvent>,
    mut query: Query<(Entity, &mut TrackingSchedule)>,
) {
    let now = clock.tick_start();
    for (entity, mut schedule) in &mut query {
        for status in schedule.due(now) {
            tracking_events.write(TrackingStatusEvent { entity, status });
        }
    }
}

fn apply_tracking_events(
    mut tracking_events: EventReader<TrackingStatusEvent>,
    mut placement_events: EventWriter<PlacementChanged>,
    mut query: Query<(&Name, &mut MotionModel)>,
) {
    for event in tracking_events.read() {
        let Ok((name, mut model)) = query.get_mut(event.entity) else {
            continue;
        };
        if model.0.on_tracking_status(event.status) {
            let placed = model.0.is_placed();
            info!(
                "'{}' {} (tracking {:?}).",
                name,
                if placed { "placed" } else { "removed" },
                event.status
            );
            placement_events.write(PlacementChanged {
                entity: event.entity,
                placed,
            });
        } else {
            debug!("'{}' tracking {:?}, placement unchanged.", name, event.status);
        }
    }
}
