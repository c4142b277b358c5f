// toycar_core/src/error.rs

use thiserror::Error;

/// Misconfiguration detected while validating tuning parameters.
///
/// The motion model itself never fails at runtime; these errors are raised once,
/// when a configuration is loaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("parameter `{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("parameter `{name}` must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("parameter `{name}` must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkinError {
    #[error("the skin catalog is empty")]
    EmptyCatalog,

    #[error("the car body has no material slots")]
    NoMaterialSlots,
}
