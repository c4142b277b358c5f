// toycar_core/src/models/mod.rs

pub mod motion;
