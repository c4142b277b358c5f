// toycar_core/src/input.rs

//! Control sources that produce a `DriveInput` each tick.

use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::types::DriveInput;

// --- INPUT SOURCE TRAIT ---
pub trait InputSource: DynClone + Debug + Send + Sync {
    /// Returns the control sample for the current tick.
    fn sample(&self) -> DriveInput;

    /// Moves any internal clock forward. Stateless sources ignore this.
    fn advance(&mut self, _dt: f64) {}
}

dyn_clone::clone_trait_object!(InputSource);

/// An on-screen or physical stick. `horizontal` steers, `vertical` throttles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JoystickAxes {
    pub horizontal: f64,
    pub vertical: f64,
}

impl InputSource for JoystickAxes {
    fn sample(&self) -> DriveInput {
        DriveInput::new(self.vertical, self.horizontal).clamped()
    }
}

/// Five on-screen buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchButtons {
    pub throttle: bool,
    pub reverse: bool,
    pub left: bool,
    pub right: bool,
    pub handbrake: bool,
}

impl InputSource for TouchButtons {
    fn sample(&self) -> DriveInput {
        let throttle = if self.throttle {
            1.0
        } else if self.reverse {
            -1.0
        } else {
            0.0
        };
        let steer = if self.right {
            1.0
        } else if self.left {
            -1.0
        } else {
            0.0
        };
        DriveInput::new(throttle, steer).with_handbrake(self.handbrake)
    }
}

/// Uses the primary source whenever it reports anything, otherwise the fallback.
#[derive(Debug, Clone)]
pub struct PrioritizedInput {
    primary: Box<dyn InputSource>,
    fallback: Box<dyn InputSource>,
}

impl PrioritizedInput {
    pub fn new(primary: Box<dyn InputSource>, fallback: Box<dyn InputSource>) -> Self {
        Self { primary, fallback }
    }
}

impl InputSource for PrioritizedInput {
    fn sample(&self) -> DriveInput {
        let primary = self.primary.sample();
        if primary.is_neutral() {
            self.fallback.sample()
        } else {
            primary
        }
    }

    fn advance(&mut self, dt: f64) {
        self.primary.advance(dt);
        self.fallback.advance(dt);
    }
}

fn sorted_by_time<T>(mut steps: Vec<T>, at: impl Fn(&T) -> f64) -> Vec<T> {
    steps.retain(|step| at(step).is_finite());
    steps.sort_by(|a, b| at(a).total_cmp(&at(b)));
    steps
}

fn active_at<T>(steps: &[T], time: f64, at: impl Fn(&T) -> f64) -> Option<&T> {
    steps.iter().take_while(|step| at(step) <= time).last()
}

fn advance_clock(elapsed: &mut f64, dt: f64) {
    if dt.is_finite() && dt > 0.0 {
        *elapsed += dt;
    }
}

/// A device state that takes effect at `at` seconds and holds until the next one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedState<S> {
    pub at: f64,
    #[serde(flatten)]
    pub state: S,
}

impl<S> TimedState<S> {
    pub fn new(at: f64, state: S) -> Self {
        Self { at, state }
    }
}

/// Replays recorded states of one device against simulated time.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceTimeline<S> {
    steps: Vec<TimedState<S>>,
    elapsed: f64,
}

impl<S: InputSource + Clone + Default> DeviceTimeline<S> {
    /// Steps are sorted by start time; non-finite times are dropped.
    pub fn new(steps: Vec<TimedState<S>>) -> Self {
        Self {
            steps: sorted_by_time(steps, |step| step.at),
            elapsed: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The device state at `time`. Untouched before the first step.
    pub fn state_at(&self, time: f64) -> S {
        active_at(&self.steps, time, |step| step.at)
            .map(|step| step.state.clone())
            .unwrap_or_default()
    }
}

impl<S: InputSource + Clone + Default> InputSource for DeviceTimeline<S> {
    fn sample(&self) -> DriveInput {
        self.state_at(self.elapsed).sample()
    }

    fn advance(&mut self, dt: f64) {
        advance_clock(&mut self.elapsed, dt);
    }
}

/// One keyframe of a scripted run. The input holds until the next step starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptStep {
    /// Start time in seconds from the beginning of the run.
    pub at: f64,
    #[serde(default)]
    pub throttle: f64,
    #[serde(default)]
    pub steer: f64,
    #[serde(default)]
    pub handbrake: bool,
}

impl ScriptStep {
    pub fn input(&self) -> DriveInput {
        DriveInput::new(self.throttle, self.steer).with_handbrake(self.handbrake)
    }
}

/// A timeline of inputs, replayed against simulated time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputScript {
    steps: Vec<ScriptStep>,
    elapsed: f64,
}

impl InputScript {
    /// Steps are sorted by start time; non-finite times are dropped.
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: sorted_by_time(steps, |step| step.at),
            elapsed: 0.0,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The input active at `time`. Neutral before the first step.
    pub fn input_at(&self, time: f64) -> DriveInput {
        active_at(&self.steps, time, |step| step.at)
            .map(|step| step.input().clamped())
            .unwrap_or(DriveInput::NEUTRAL)
    }
}

impl InputSource for InputScript {
    fn sample(&self) -> DriveInput {
        self.input_at(self.elapsed)
    }

    fn advance(&mut self, dt: f64) {
        advance_clock(&mut self.elapsed, dt);
    }
}
