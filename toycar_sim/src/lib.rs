// toycar_sim/src/lib.rs

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::prelude::{AppState, RunOptions, ScenarioConfig};
use crate::simulation::config::ConfigPlugin;
use crate::simulation::core::simulation_setup::SimulationSetupPlugin;
use crate::simulation::plugins::effects::EffectsPlugin;
use crate::simulation::plugins::input::ScriptedInputPlugin;
use crate::simulation::plugins::placement::PlacementPlugin;
use crate::simulation::plugins::skins::SkinPlugin;
use crate::simulation::plugins::telemetry::TelemetryPlugin;
use crate::simulation::plugins::vehicles::car::CarPlugin;

// This prelude is for convenience for other files WITHIN the toycar_sim crate.
pub mod prelude;

pub mod cli;
pub mod simulation;

/// The main plugin that brings together all the simulation parts.
///
/// Expects `ScenarioConfig` and `RunOptions` to be inserted before it is added.
pub struct ToyCarSimulationPlugin;

impl Plugin for ToyCarSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            // Catalog loading and vehicle resolution.
            ConfigPlugin,
            // Fixed timestep, system sets, spawning pipeline and run lifecycle.
            SimulationSetupPlugin,
            // Motion models, kinematic bodies and ground probes.
            CarPlugin,
            ScriptedInputPlugin,
            PlacementPlugin,
            EffectsPlugin,
            SkinPlugin,
            TelemetryPlugin,
        ));
    }
}

/// Adds everything a windowless run needs. The caller adds logging.
pub fn add_headless_simulation(
    app: &mut App,
    scenario: ScenarioConfig,
    options: RunOptions,
) -> &mut App {
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .insert_resource(scenario)
        .insert_resource(options)
        .init_state::<AppState>()
        .add_plugins(ToyCarSimulationPlugin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::simulation::plugins::effects::{TireSmoke, WheelColliders};
    use crate::simulation::plugins::skins::{CarSkin, SkinPreferences};
    use crate::simulation::plugins::telemetry::TelemetryLog;
    use approx::assert_abs_diff_eq;
    use figment::{
        providers::{Format, Toml},
        Figment,
    };
    use std::path::{Path, PathBuf};

    fn catalog_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets/catalog")
    }

    fn scenario(toml: &str) -> ScenarioConfig {
        Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .expect("valid scenario")
    }

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("toycar_sim_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    /// Runs until the app asks to exit. Returns the app for inspection.
    fn run(scenario: ScenarioConfig, options: RunOptions) -> App {
        let mut app = App::new();
        add_headless_simulation(
            &mut app,
            scenario,
            RunOptions {
                catalog_dir: catalog_dir(),
                ..options
            },
        );
        for _ in 0..10_000 {
            app.update();
            if app.should_exit().is_some() {
                return app;
            }
        }
        panic!("simulation did not finish");
    }

    fn model<'a>(app: &'a mut App, name: &str) -> &'a VehicleMotionModel {
        let entity = find(app, name);
        &app.world()
            .get::<MotionModel>(entity)
            .expect("vehicle has a motion model")
            .0
    }

    fn find(app: &mut App, name: &str) -> Entity {
        let mut query = app.world_mut().query::<(Entity, &Name)>();
        query
            .iter(app.world())
            .find(|(_, n)| n.as_str() == name)
            .map(|(e, _)| e)
            .unwrap_or_else(|| panic!("no vehicle named {name}"))
    }

    #[test]
    fn full_throttle_run_reaches_top_speed_and_exits() {
        let mut app = run(
            scenario(
                r#"
                [simulation]
                duration_seconds = 2.0
                tick_rate_hz = 50.0

                [[vehicles]]
                from = "cars.arcade"
                name = "runner"
                script = [{ at = 0.0, throttle = 1.0 }]

                [[vehicles]]
                from = "cars.hovercraft"
                name = "ghost"
                "#,
            ),
            RunOptions::default(),
        );

        assert_eq!(app.world().resource::<SimulationClock>().ticks, 100);
        assert_eq!(*app.world().resource::<State<AppState>>().get(), AppState::Finished);

        let speed = model(&mut app, "runner").state().forward_speed;
        assert_abs_diff_eq!(speed, 1.5, epsilon = 0.015);

        let entity = find(&mut app, "runner");
        let transform = app.world().get::<Transform>(entity).expect("transform");
        assert!(transform.translation.z > 1.0);
        assert_abs_diff_eq!(transform.translation.x, 0.0, epsilon = 1e-5);

        // The unresolvable vehicle was skipped.
        let mut names = app.world_mut().query::<&Name>();
        assert_eq!(names.iter(app.world()).count(), 1);
    }

    #[test]
    fn unplaced_car_waits_for_tracking() {
        let mut app = run(
            scenario(
                r#"
                [simulation]
                duration_seconds = 2.0
                telemetry_interval_seconds = 0.5

                [[vehicles]]
                from = "cars.ar_wheel"
                name = "anchored"
                placement = { events = [{ at = 1.0, status = "Tracked" }] }
                script = [{ at = 0.0, throttle = 1.0 }]
                "#,
            ),
            RunOptions::default(),
        );

        let log = app.world().resource::<TelemetryLog>().clone();
        assert_eq!(log.rows.len(), 4);
        assert!(!log.rows[0].placed);
        assert_eq!(log.rows[0].speed, 0.0);
        assert!(log.rows[3].placed);
        assert!(log.rows[3].speed > 0.0);

        let entity = find(&mut app, "anchored");
        let skin = app.world().get::<CarSkin>(entity).expect("ar_wheel has skins");
        assert!(skin.applier.is_applied());
        assert_eq!(skin.applier.pending(), None);

        let colliders = app.world().get::<WheelColliders>(entity).expect("wheel colliders");
        assert_abs_diff_eq!(colliders.0.motor_torque, 200.0);
    }

    #[test]
    fn released_drift_fades_out() {
        let mut app = run(
            scenario(include_str!("../../assets/scenarios/drift_fade.toml")),
            RunOptions::default(),
        );

        let entity = find(&mut app, "drifter");
        let smoke = *app.world().get::<TireSmoke>(entity).expect("arcade car smokes");
        assert_eq!(smoke.bursts, 1);
        assert!(!smoke.emitting);
        assert!(smoke.emitted > 0.0);
        assert_eq!(model(&mut app, "drifter").state().drift, DriftPhase::Normal);
    }

    #[test]
    fn device_inputs_drive_their_cars() {
        let mut app = run(
            scenario(
                r#"
                [simulation]
                duration_seconds = 2.0

                [[vehicles]]
                from = "cars.arcade"
                name = "buttons"
                input = { type = "Buttons", presses = [
                    { at = 0.0, throttle = true },
                    { at = 1.0, throttle = true, right = true },
                ] }

                [[vehicles]]
                from = "cars.arcade"
                name = "keyboard"
                start_pose = { position = [3.0, 0.0, 0.0] }
                input = { type = "KeyboardOverJoystick", joystick = [
                    { at = 0.0, vertical = 1.0 },
                ], keyboard = [
                    { at = 1.0, vertical = -1.0 },
                ] }
                "#,
            ),
            RunOptions::default(),
        );

        let buttons = *model(&mut app, "buttons").state();
        assert!(buttons.forward_speed > 0.0);
        assert!(buttons.heading_deg > 0.0);

        // The held reverse key overrides the joystick's full throttle.
        let keyboard = *model(&mut app, "keyboard").state();
        assert!(keyboard.is_reversing);
        assert_abs_diff_eq!(keyboard.heading_deg, 0.0);
    }

    #[test]
    fn dropped_car_lands_on_the_ground() {
        let mut app = run(
            scenario(
                r#"
                [simulation]
                duration_seconds = 1.0

                [[vehicles]]
                from = "cars.rc"
                name = "dropped"
                start_pose = { position = [0.0, 1.0, 0.0] }
                "#,
            ),
            RunOptions::default(),
        );

        let entity = find(&mut app, "dropped");
        let transform = *app.world().get::<Transform>(entity).expect("transform");
        assert_eq!(transform.translation.y, 0.0);
        assert!(model(&mut app, "dropped").ground().is_grounded());
    }

    #[test]
    fn outputs_are_written_on_finish() {
        let dir = temp_path("outputs");
        let csv = dir.join("telemetry.csv");
        let prefs = dir.join("skins.toml");
        std::fs::write(&prefs, "selected_skin = 1\n").expect("writable temp dir");

        run(
            scenario(
                r#"
                [simulation]
                duration_seconds = 1.0
                telemetry_interval_seconds = 0.5

                [[vehicles]]
                from = "cars.arcade"
                name = "a"

                [[vehicles]]
                from = "cars.rc"
                name = "b"

                [[skin_changes]]
                at = 0.2
                direction = "Next"
                "#,
            ),
            RunOptions {
                telemetry_csv: Some(csv.clone()),
                skin_prefs: Some(prefs.clone()),
                ..RunOptions::default()
            },
        );

        let text = std::fs::read_to_string(&csv).expect("telemetry written");
        // Header plus two samples for each of the two vehicles.
        assert_eq!(text.lines().count(), 5);
        assert!(text.starts_with("t,vehicle,"));

        let saved = SkinPreferences::load(&prefs).expect("preferences written");
        assert_eq!(saved.selected_skin, 2);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
