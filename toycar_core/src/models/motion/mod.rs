// toycar_core/src/models/motion/mod.rs

//! The parameterised vehicle motion model shared by every car variant.

pub mod drift;
pub mod model;
pub mod params;
pub mod state;
pub mod visuals;
pub mod wheels;

pub use drift::{DriftEdge, FrictionState};
pub use model::{MotionOutput, VehicleMotionModel};
pub use params::{
    CoastCurve, DriftParams, DriftTrigger, EngineParams, MotionParams, SmokeFade, SmokeParams,
    ThrottleResponse, WheelParams, WheelVisualParams,
};
pub use state::{DriftPhase, VehicleState};
pub use visuals::{SmokeEmission, WheelPose};
pub use wheels::WheelCommands;
