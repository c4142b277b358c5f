// toycar_sim/src/simulation/config/resolver.rs

use figment::value::{Dict, Tag, Value};
use thiserror::Error;
use toycar_core::error::ConfigError;
use toycar_core::models::motion::MotionParams;

use super::catalog::PrefabCatalog;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("prefab '{0}' not found in catalog")]
    MissingPrefab(String),

    #[error("prefab '{0}' must resolve to a table to be merged")]
    NotATable(String),

    #[error("prefab '{0}' inherits from itself")]
    Cycle(String),

    #[error("motion preset: {0}")]
    Preset(#[from] ConfigError),

    #[error("failed to expand motion preset '{name}': {source}")]
    PresetEncoding {
        name: String,
        source: figment::Error,
    },
}

/// Resolves every `from` reference in a vehicle entry and expands its motion preset.
pub fn resolve_vehicle_value(
    vehicle_value: &Value,
    catalog: &PrefabCatalog,
) -> Result<Value, ResolveError> {
    let mut chain = Vec::new();
    let resolved = resolve_value_recursively(vehicle_value, catalog, &mut chain)?;
    expand_motion_preset(resolved)
}

/// Recursive deep merge: tables merge key by key, everything else is replaced.
fn deep_merge(base: &mut Dict, override_dict: &Dict) {
    for (key, override_val) in override_dict {
        // An override that is itself a `from` reference replaces the whole subtree.
        if let Some(d) = override_val.as_dict() {
            if d.contains_key("from") {
                base.insert(key.clone(), override_val.clone());
                continue;
            }
        }

        if let Some(base_val) = base.get_mut(key) {
            if let (Some(base_sub_dict), Some(override_sub_dict)) =
                (base_val.as_dict(), override_val.as_dict())
            {
                let mut new_sub_dict = base_sub_dict.clone();
                deep_merge(&mut new_sub_dict, override_sub_dict);
                *base_val = Value::Dict(Tag::Default, new_sub_dict);
                continue;
            }
        }
        base.insert(key.clone(), override_val.clone());
    }
}

fn resolve_value_recursively(
    value: &Value,
    catalog: &PrefabCatalog,
    chain: &mut Vec<String>,
) -> Result<Value, ResolveError> {
    // --- STEP 1: Resolve the current node if it's a 'from' reference. ---
    let current_node = match value
        .as_dict()
        .and_then(|dict| Some((dict, dict.get("from")?.as_str()?)))
    {
        Some((dict, from_key)) => {
            if chain.iter().any(|k| k == from_key) {
                return Err(ResolveError::Cycle(from_key.to_string()));
            }
            let base_prefab_data = catalog
                .0
                .get(from_key)
                .ok_or_else(|| ResolveError::MissingPrefab(from_key.to_string()))?;

            chain.push(from_key.to_string());
            let resolved_base = resolve_value_recursively(base_prefab_data, catalog, chain);
            chain.pop();

            let mut final_dict = resolved_base?
                .into_dict()
                .ok_or_else(|| ResolveError::NotATable(from_key.to_string()))?;

            // `dict` holds the `from` key and any sibling override keys.
            deep_merge(&mut final_dict, dict);
            Value::Dict(Tag::Default, final_dict)
        }
        None => value.clone(),
    };

    // --- STEP 2: Resolve the children of the result. ---
    match &current_node {
        Value::Dict(tag, dict) => {
            let mut new_dict = Dict::new();
            for (key, val) in dict.iter() {
                if key == "from" {
                    continue;
                }
                new_dict.insert(key.clone(), resolve_value_recursively(val, catalog, chain)?);
            }
            Ok(Value::Dict(*tag, new_dict))
        }
        Value::Array(tag, arr) => {
            let mut resolved_arr = Vec::new();
            for item in arr {
                resolved_arr.push(resolve_value_recursively(item, catalog, chain)?);
            }
            Ok(Value::Array(*tag, resolved_arr))
        }
        _ => Ok(current_node),
    }
}

/// Replaces `motion = { preset = "name", ... }` with the named preset, deep-merging
/// the remaining keys over it.
fn expand_motion_preset(vehicle: Value) -> Result<Value, ResolveError> {
    let Some(mut vehicle_dict) = vehicle.clone().into_dict() else {
        return Ok(vehicle);
    };
    let Some(motion_dict) = vehicle_dict.get("motion").and_then(|m| m.as_dict()) else {
        return Ok(vehicle);
    };
    let Some(preset_name) = motion_dict.get("preset").and_then(|p| p.as_str()) else {
        return Ok(vehicle);
    };

    let preset = MotionParams::from_preset(preset_name)?;
    let mut expanded = Value::serialize(&preset)
        .map_err(|source| ResolveError::PresetEncoding {
            name: preset_name.to_string(),
            source,
        })?
        .into_dict()
        .ok_or_else(|| ResolveError::NotATable(preset_name.to_string()))?;

    let mut overrides = motion_dict.clone();
    overrides.remove("preset");
    deep_merge(&mut expanded, &overrides);

    vehicle_dict.insert("motion".to_string(), Value::Dict(Tag::Default, expanded));
    Ok(Value::Dict(Tag::Default, vehicle_dict))
}
