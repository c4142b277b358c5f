// toycar_sim/src/simulation/config/catalog.rs

//! The `PrefabCatalog` resource and the startup system that fills it from disk.

use bevy::prelude::*;
use figment::{
    providers::{Format, Toml},
    value::Value,
    Figment,
};
use std::{collections::HashMap, path::Path};
use walkdir::WalkDir;

use super::structs::RunOptions;

/// Every parsed prefab, keyed by its dotted path under the catalog root
/// (e.g. `assets/catalog/cars/arcade.toml` becomes "cars.arcade").
#[derive(Resource, Default, Debug, Clone)]
pub struct PrefabCatalog(pub HashMap<String, Value>);

impl PrefabCatalog {
    /// Walks `root` and parses every `.toml` file. Unreadable files are logged and skipped.
    pub fn load_from_dir(root: &Path) -> Self {
        let mut catalog = PrefabCatalog::default();

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                !e.file_type().is_dir() && e.path().extension().map_or(false, |ext| ext == "toml")
            })
        {
            let path = entry.path();
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let key = relative
                .with_extension("")
                .to_string_lossy()
                .replace(std::path::MAIN_SEPARATOR, ".");

            match Figment::new().merge(Toml::file(path)).extract::<Value>() {
                Ok(data) => {
                    debug!("Loaded catalog item: '{}'", key);
                    catalog.0.insert(key, data);
                }
                Err(e) => {
                    error!("Failed to load catalog item from {:?}: {}", path, e);
                }
            }
        }

        catalog
    }
}

/// Merges the on-disk catalog into the resource. Entries inserted before startup win.
pub fn load_catalog_from_disk(options: Res<RunOptions>, mut catalog: ResMut<PrefabCatalog>) {
    let catalog_path = options.catalog_dir.as_path();
    if !catalog_path.exists() {
        warn!(
            "Catalog directory not found at {:?}, no prefabs will be loaded.",
            catalog_path
        );
        return;
    }

    info!("Loading prefab catalog from: {:?}", catalog_path);
    let loaded = PrefabCatalog::load_from_dir(catalog_path);
    for (key, value) in loaded.0 {
        catalog.0.entry(key).or_insert(value);
    }
    info!("Catalog holds {} prefabs.", catalog.0.len());
}
