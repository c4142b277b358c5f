// toycar_sim/src/simulation/plugins/mod.rs

pub mod effects;
pub mod input;
pub mod placement;
pub mod skins;
pub mod telemetry;
pub mod vehicles;
