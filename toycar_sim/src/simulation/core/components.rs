// toycar_sim/src/simulation/core/components.rs

use bevy::prelude::Component;
use toycar_core::prelude::{
    DriveInput, InputSource, MotionOutput, PhysicsIntegrator, VehicleMotionModel,
};

// --- Wrapper Components for Core Types ---

/// The pure motion model of one car.
#[derive(Component, Debug)]
pub struct MotionModel(pub VehicleMotionModel);

/// A Bevy component that wraps a pure `PhysicsIntegrator` trait object.
#[derive(Component, Debug)]
pub struct BodyIntegrator(pub Box<dyn PhysicsIntegrator>);

/// A Bevy component that wraps a pure `InputSource` trait object.
#[derive(Component, Debug)]
pub struct ControlSource(pub Box<dyn InputSource>);

/// The control sample taken this tick. Written in `SimulationSet::Input`.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct CurrentInput(pub DriveInput);

/// The motion output of the latest tick. `None` until the first tick runs.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct LatestMotion(pub Option<MotionOutput>);

/// A flat ground plane under the car.
#[derive(Component, Debug, Clone, Copy)]
pub struct GroundProbe {
    pub height: f64,
}
