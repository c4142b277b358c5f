// toycar_core/src/lib.rs

pub mod error;
pub mod input;
pub mod integrator;
pub mod models;
pub mod placement;
pub mod prelude;
pub mod skins;
pub mod types;
pub mod utils;
