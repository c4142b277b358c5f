// toycar_sim/src/simulation/plugins/skins.rs

//! Body skins: a persisted preference, per-car selectors and appliers that
//! follow AR tracking.

use serde::{Deserialize, Serialize};
use std::path::Path;
use toycar_core::skins::{ApplyOutcome, SkinApplier, SkinSelector};

use crate::prelude::*;
use crate::simulation::core::events::{CycleSkin, PlacementChanged};
use crate::simulation::core::simulation_setup::SimulationClock;
use crate::simulation::core::spawn_requests::SpawnVehicleRequest;

/// The persisted skin choice, shared by every car.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinPreferences {
    #[serde(default)]
    pub selected_skin: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SkinPreferencesError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Encode(#[from] toml::ser::Error),
}

impl SkinPreferences {
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SkinPreferencesError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SkinPreferencesError> {
        std::fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }
}

/// One car's skin catalog cursor and material slots.
#[derive(Component, Debug, Clone)]
pub struct CarSkin {
    pub selector: SkinSelector,
    pub applier: SkinApplier,
}

/// Scripted presses of the next/previous buttons.
#[derive(Resource, Debug, Clone, Default)]
pub struct SkinChangeSchedule {
    changes: Vec<SkinChange>,
    next: usize,
}

pub struct SkinPlugin;

impl Plugin for SkinPlugin {
    fn build(&self, app: &mut App) {
        let mut changes = app
            .world()
            .get_resource::<ScenarioConfig>()
            .map(|config| config.skin_changes.clone())
            .unwrap_or_default();
        changes.retain(|change| change.at.is_finite());
        changes.sort_by(|a, b| a.at.total_cmp(&b.at));

        app.init_resource::<SkinPreferences>()
            .insert_resource(SkinChangeSchedule { changes, next: 0 })
            .add_systems(OnEnter(AppState::AssetLoading), load_skin_preferences)
            .add_systems(
                OnEnter(AppState::SceneBuilding),
                attach_car_skins.in_set(SceneBuildSet::ProcessAccessories),
            )
            .add_systems(
                FixedUpdate,
                (replay_skin_changes, cycle_skins, follow_placement)
                    .chain()
                    .in_set(SimulationSet::Effects),
            )
            .add_systems(OnEnter(AppState::Finished), save_skin_preferences);
    }
}

fn log_outcome(name: &Name, applier: &SkinApplier, outcome: ApplyOutcome) {
    match outcome {
        ApplyOutcome::Applied {
            skin,
            slot,
            fallback,
        } => {
            if fallback {
                warn!("'{}': no matching body material, using slot 0.", name);
            }
            info!(
                "'{}': applied skin {} ({}) to material slot {}.",
                name,
                skin,
                applier.skin_name(skin),
                slot
            );
        }
        ApplyOutcome::Queued { skin } => {
            info!("'{}': body hidden, queuing skin {}.", name, skin);
        }
    }
}

fn load_skin_preferences(options: Res<RunOptions>, mut preferences: ResMut<SkinPreferences>) {
    let Some(path) = options.skin_prefs.as_deref() else {
        return;
    };
    match SkinPreferences::load(path) {
        Ok(loaded) => {
            info!("Loaded skin preferences from {:?}: {:?}", path, loaded);
            *preferences = loaded;
        }
        Err(e) => error!("Failed to read skin preferences from {:?}: {}. Using defaults.", path, e),
    }
}

fn attach_car_skins(
    mut commands: Commands,
    preferences: Res<SkinPreferences>,
    query: Query<(Entity, &Name, &SpawnVehicleRequest)>,
) {
    for (entity, name, request) in &query {
        let Some(skin) = &request.0.skin else {
            continue;
        };
        let applier = SkinApplier::new(
            skin.skins.clone(),
            skin.body_material_name.clone(),
            skin.material_slots.clone(),
            request.0.placement.placed_at_start,
        );
        let selector = SkinSelector::new(skin.skins.len(), preferences.selected_skin);
        let (mut applier, selector) = match (applier, selector) {
            (Ok(applier), Ok(selector)) => (applier, selector),
            (Err(e), _) | (_, Err(e)) => {
                error!("'{}': invalid skin setup: {}. Skipping skins.", name, e);
                continue;
            }
        };

        let outcome = applier.apply(selector.current());
        log_outcome(name, &applier, outcome);
        commands.entity(entity).insert(CarSkin { selector, applier });
    }
}

fn replay_skin_changes(
    clock: Res<SimulationClock>,
    mut schedule: ResMut<SkinChangeSchedule>,
    mut cycle_events: EventWriter<CycleSkin>,
) {
    let now = clock.tick_start();
    while let Some(change) = schedule.changes.get(schedule.next).copied() {
        if change.at > now {
            break;
        }
        cycle_events.write(CycleSkin(change.direction));
        schedule.next += 1;
    }
}

fn cycle_skins(
    mut cycle_events: EventReader<CycleSkin>,
    mut preferences: ResMut<SkinPreferences>,
    mut query: Query<(&Name, &mut CarSkin)>,
) {
    for CycleSkin(direction) in cycle_events.read() {
        for (name, mut car_skin) in &mut query {
            let car_skin = &mut *car_skin;
            let index = match direction {
                SkinDirection::Next => car_skin.selector.next(),
                SkinDirection::Previous => car_skin.selector.previous(),
            };
            preferences.selected_skin = index;
            let outcome = car_skin.applier.apply(index);
            log_outcome(name, &car_skin.applier, outcome);
        }
    }
}

fn follow_placement(
    mut placement_events: EventReader<PlacementChanged>,
    preferences: Res<SkinPreferences>,
    mut query: Query<(&Name, &mut CarSkin)>,
) {
    for event in placement_events.read() {
        let Ok((name, mut car_skin)) = query.get_mut(event.entity) else {
            continue;
        };
        if event.placed {
            let outcome = car_skin.applier.on_tracking_found(preferences.selected_skin);
            log_outcome(name, &car_skin.applier, outcome);
        } else {
            car_skin.applier.on_tracking_lost();
            debug!("'{}': tracking lost, skin marked unapplied.", name);
        }
    }
}

fn save_skin_preferences(options: Res<RunOptions>, preferences: Res<SkinPreferences>) {
    let Some(path) = options.skin_prefs.as_deref() else {
        return;
    };
    match preferences.save(path) {
        Ok(()) => info!("Saved skin preferences to {:?}.", path),
        Err(e) => error!("Failed to save skin preferences to {:?}: {}", path, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferences_round_trip_through_toml() {
        let dir = std::env::temp_dir().join(format!("toycar_skin_prefs_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("prefs.toml");

        assert_eq!(
            SkinPreferences::load(&path).expect("missing file is fine"),
            SkinPreferences::default()
        );

        let prefs = SkinPreferences { selected_skin: 3 };
        prefs.save(&path).expect("writable temp dir");
        assert_eq!(SkinPreferences::load(&path).expect("readable"), prefs);

        std::fs::write(&path, "selected_skin = \"blue\"").expect("writable temp dir");
        assert!(matches!(
            SkinPreferences::load(&path),
            Err(SkinPreferencesError::Parse(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
