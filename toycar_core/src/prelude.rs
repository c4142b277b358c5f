// toycar_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::input::InputSource;
pub use crate::integrator::PhysicsIntegrator;

// --- Core Data Structures ---
pub use crate::models::motion::{
    DriftPhase, MotionOutput, MotionParams, VehicleMotionModel, VehicleState,
};
pub use crate::placement::{PlacementGate, TrackingStatus};
pub use crate::types::{DriveInput, Pose};

// --- Concrete Implementations ---
pub use crate::input::{
    DeviceTimeline, InputScript, JoystickAxes, PrioritizedInput, ScriptStep, TimedState, TouchButtons,
};
pub use crate::integrator::{GroundContact, KinematicIntegrator};
pub use crate::skins::{ApplyOutcome, SkinApplier, SkinSelector};

pub use crate::error::{ConfigError, SkinError};
