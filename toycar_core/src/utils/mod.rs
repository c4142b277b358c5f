// toycar_core/src/utils/mod.rs

pub mod easing;
