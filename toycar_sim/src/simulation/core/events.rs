// toycar_sim/src/simulation/core/events.rs

use bevy::prelude::{Entity, Event};
use toycar_core::models::motion::DriftEdge;
use toycar_core::placement::TrackingStatus;

use crate::simulation::config::structs::SkinDirection;

/// A tracking status report for one car's anchor.
#[derive(Event, Debug, Clone, Copy)]
pub struct TrackingStatusEvent {
    pub entity: Entity,
    pub status: TrackingStatus,
}

/// Emitted when a car's placement gate opens or closes.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlacementChanged {
    pub entity: Entity,
    pub placed: bool,
}

/// Emitted on every edge of a car's drift machine.
#[derive(Event, Debug, Clone, Copy)]
pub struct DriftEvent {
    pub entity: Entity,
    pub edge: DriftEdge,
}

/// A press of the skin selector's next/previous button.
#[derive(Event, Debug, Clone, Copy)]
pub struct CycleSkin(pub SkinDirection);
