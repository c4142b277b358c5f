// toycar_core/src/placement.rs

//! The "vehicle is placed" gate driven by AR tracking.

use serde::{Deserialize, Serialize};

/// Tracking status reported for the anchor the car sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TrackingStatus {
    Tracked,
    ExtendedTracked,
    Limited,
    NoPose,
}

impl TrackingStatus {
    /// Whether this status is good enough to drive on.
    pub fn is_tracked(self) -> bool {
        matches!(self, TrackingStatus::Tracked | TrackingStatus::ExtendedTracked)
    }
}

/// Boolean gate that must be open for the motion model to advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlacementGate {
    placed: bool,
}

impl PlacementGate {
    pub fn new(placed: bool) -> Self {
        Self { placed }
    }

    pub fn is_placed(&self) -> bool {
        self.placed
    }

    /// Content-placed style callback. Returns `true` if the gate changed.
    pub fn on_placement_changed(&mut self, placed: bool) -> bool {
        let changed = self.placed != placed;
        self.placed = placed;
        changed
    }

    /// Anchor tracking callback. Returns `true` if the gate changed.
    pub fn on_tracking_status(&mut self, status: TrackingStatus) -> bool {
        self.on_placement_changed(status.is_tracked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_statuses_open_and_close_the_gate() {
        let mut gate = PlacementGate::default();
        assert!(!gate.is_placed());

        assert!(gate.on_tracking_status(TrackingStatus::ExtendedTracked));
        assert!(gate.is_placed());
        assert!(!gate.on_tracking_status(TrackingStatus::Tracked));

        assert!(gate.on_tracking_status(TrackingStatus::Limited));
        assert!(!gate.is_placed());
        assert!(!gate.on_tracking_status(TrackingStatus::NoPose));
    }

    #[test]
    fn explicit_placement() {
        let mut gate = PlacementGate::new(true);
        assert!(gate.on_placement_changed(false));
        assert!(!gate.is_placed());
    }
}
