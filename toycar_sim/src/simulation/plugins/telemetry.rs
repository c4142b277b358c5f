// toycar_sim/src/simulation/plugins/telemetry.rs

//! Periodic per-vehicle telemetry: logged while running and optionally written
//! as CSV when the run finishes.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use toycar_core::models::motion::DriftPhase;

use crate::prelude::*;
use crate::simulation::core::simulation_setup::SimulationClock;
use crate::simulation::plugins::effects::{EngineAudio, TireSmoke};

/// One sample of one vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRow {
    pub time: f64,
    pub vehicle: String,
    pub position: [f64; 3],
    pub heading_deg: f64,
    pub speed: f64,
    pub steer_deg: f64,
    pub reversing: bool,
    pub placed: bool,
    pub grounded: bool,
    pub drift: DriftPhase,
    pub smoke_rate: f64,
    /// -1 when the car has no engine audio.
    pub engine_pitch: f64,
}

fn drift_label(phase: DriftPhase) -> &'static str {
    match phase {
        DriftPhase::Normal => "normal",
        DriftPhase::Drifting => "drifting",
        DriftPhase::FadingOut { .. } => "fading",
    }
}

/// Defines the CSV schema once so the header and row formats stay in sync.
macro_rules! define_telemetry_csv {
    (
        row: |$row:ident|,
        columns: { $( $name:ident : $fmt:literal => $val:expr ),* $(,)? }
    ) => {
        const CSV_HEADER: &str = concat!( $( stringify!($name), "," ),* );

        pub fn csv_header() -> &'static str {
            CSV_HEADER.trim_end_matches(',')
        }

        pub fn csv_line($row: &TelemetryRow) -> String {
            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            line.trim_end_matches(',').to_string()
        }
    };
}

define_telemetry_csv! {
    row: |row|,
    columns: {
        t: "{:.4}" => row.time,
        vehicle: "{}" => row.vehicle.replace(',', ";"),
        x: "{:.4}" => row.position[0],
        y: "{:.4}" => row.position[1],
        z: "{:.4}" => row.position[2],
        heading_deg: "{:.2}" => row.heading_deg,
        speed: "{:.4}" => row.speed,
        steer_deg: "{:.2}" => row.steer_deg,
        reversing: "{}" => row.reversing as u8,
        placed: "{}" => row.placed as u8,
        grounded: "{}" => row.grounded as u8,
        drift: "{}" => drift_label(row.drift),
        smoke_rate: "{:.3}" => row.smoke_rate,
        engine_pitch: "{:.3}" => row.engine_pitch,
    }
}

pub fn write_csv(path: &Path, rows: &[TelemetryRow]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", csv_header())?;
    for row in rows {
        writeln!(writer, "{}", csv_line(row))?;
    }
    writer.flush()
}

/// Every sample taken so far, plus the sampling schedule.
#[derive(Resource, Debug, Clone)]
pub struct TelemetryLog {
    pub interval: f64,
    pub next_sample: f64,
    pub rows: Vec<TelemetryRow>,
}

pub struct TelemetryPlugin;

impl Plugin for TelemetryPlugin {
    fn build(&self, app: &mut App) {
        let interval = app
            .world()
            .get_resource::<ScenarioConfig>()
            .map(|config| config.simulation.telemetry_interval_seconds)
            .unwrap_or(1.0);

        app.insert_resource(TelemetryLog {
            interval,
            next_sample: interval,
            rows: Vec::new(),
        })
        .add_systems(
            FixedUpdate,
            record_telemetry.in_set(SimulationSet::Telemetry),
        )
        .add_systems(OnEnter(AppState::Finished), flush_telemetry_csv);
    }
}

fn record_telemetry(
    clock: Res<SimulationClock>,
    mut log: ResMut<TelemetryLog>,
    query: Query<(
        &Name,
        &MotionModel,
        &Transform,
        Option<&TireSmoke>,
        Option<&EngineAudio>,
    )>,
) {
    if clock.elapsed + 0.5 * clock.dt < log.next_sample {
        return;
    }
    log.next_sample += log.interval;

    for (name, model, transform, smoke, engine) in &query {
        let state = model.0.state();
        let row = TelemetryRow {
            time: clock.elapsed,
            vehicle: name.to_string(),
            position: [
                transform.translation.x as f64,
                transform.translation.y as f64,
                transform.translation.z as f64,
            ],
            heading_deg: state.heading_deg,
            speed: state.forward_speed,
            steer_deg: state.steer_angle_deg,
            reversing: state.is_reversing,
            placed: model.0.is_placed(),
            grounded: model.0.ground().is_grounded(),
            drift: state.drift,
            smoke_rate: smoke.map_or(0.0, |s| s.rate),
            engine_pitch: engine.map_or(-1.0, |e| e.pitch),
        };
        info!(
            "[TELEMETRY] t={:.2} {}: pos=({:.2}, {:.2}, {:.2}) heading={:.1} speed={:.3} drift={}",
            row.time,
            row.vehicle,
            row.position[0],
            row.position[1],
            row.position[2],
            row.heading_deg,
            row.speed,
            drift_label(row.drift),
        );
        log.rows.push(row);
    }
}

fn flush_telemetry_csv(options: Res<RunOptions>, log: Res<TelemetryLog>) {
    let Some(path) = options.telemetry_csv.as_deref() else {
        return;
    };
    match write_csv(path, &log.rows) {
        Ok(()) => info!("Wrote {} telemetry rows to {:?}.", log.rows.len(), path),
        Err(e) => error!("Failed to write telemetry CSV to {:?}: {}", path, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_rows_share_the_schema() {
        let row = TelemetryRow {
            time: 1.0,
            vehicle: "red, fast".to_string(),
            position: [0.5, 0.0, -1.25],
            heading_deg: 90.0,
            speed: 1.5,
            steer_deg: -12.5,
            reversing: false,
            placed: true,
            grounded: true,
            drift: DriftPhase::FadingOut {
                remaining: 0.2,
                intensity: 0.5,
            },
            smoke_rate: 12.5,
            engine_pitch: -1.0,
        };
        let header = csv_header();
        let line = csv_line(&row);
        assert_eq!(header.split(',').count(), line.split(',').count());
        assert!(header.starts_with("t,vehicle,x,y,z,"));
        assert_eq!(
            line,
            "1.0000,red; fast,0.5000,0.0000,-1.2500,90.00,1.5000,-12.50,0,1,1,fading,12.500,-1.000"
        );
    }
}
