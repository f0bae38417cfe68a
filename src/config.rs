//! Environment knobs collected into one validated struct.

use crate::error::RouteError;
use std::time::Duration;

/// Half-open rush-hour windows, in minutes-from-midnight.
pub const DEFAULT_RUSH_WINDOWS: [(f64, f64); 2] = [(450.0, 570.0), (960.0, 1110.0)];

/// Angular window (degrees) that counts as a right turn.
pub const RIGHT_TURN_WINDOW: (f64, f64) = (30.0, 150.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub wideness_threshold: f64,
    pub max_labels_per_node: usize,
    pub interval_duration_minutes: f64,
    pub labeling_timeout: Duration,
    pub query_timeout: Duration,
    pub rush_hour_windows: [(f64, f64); 2],
    pub right_turn_window: (f64, f64),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            wideness_threshold: 8.0,
            max_labels_per_node: 10,
            interval_duration_minutes: 30.0,
            labeling_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(10),
            rush_hour_windows: DEFAULT_RUSH_WINDOWS,
            right_turn_window: RIGHT_TURN_WINDOW,
        }
    }
}

impl Config {
    /// Checks the invariants the rest of the crate assumes hold: capacity is
    /// at least one label, the rush-hour windows are within a day and don't
    /// overlap, and the right-turn window is a sane sub-range of `[0,360)`.
    pub fn validate(&self) -> Result<(), RouteError> {
        if self.max_labels_per_node == 0 {
            return Err(RouteError::Config("max_labels_per_node must be >= 1".into()));
        }
        if self.wideness_threshold < 0.0 {
            return Err(RouteError::Config("wideness_threshold must be >= 0".into()));
        }
        for &(a, b) in &self.rush_hour_windows {
            if !(0.0..1440.0).contains(&a) || !(0.0..=1440.0).contains(&b) || a >= b {
                return Err(RouteError::Config(format!("invalid rush-hour window ({a}, {b})")));
            }
        }
        let [(a1, b1), (a2, b2)] = self.rush_hour_windows;
        if a1 < b2 && a2 < b1 {
            return Err(RouteError::Config("rush-hour windows must not overlap".into()));
        }
        let (lo, hi) = self.right_turn_window;
        if !(0.0..=360.0).contains(&lo) || !(0.0..=360.0).contains(&hi) || lo > hi {
            return Err(RouteError::Config(format!("invalid right-turn window ({lo}, {hi})")));
        }
        Ok(())
    }
}
