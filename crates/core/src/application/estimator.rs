//! Wait-Time Estimator
//!
//! Predicts the wait of a freshly issued ticket:
//!
//! ```text
//! W <= 1            -> 0
//! base              =  (W - 1) * avg
//! predicted         =  ceil(base * time% * day% / 10_000)
//! W > 1             -> max(predicted, ceil(avg / 2))
//! ```
//!
//! `W` is the number of tickets already waiting when the ticket is issued.
//! The hour windows and weekday factors are configuration defaults tuned
//! for walk-in service counters, not fixed rules.
//!
//! The estimate is stored on the ticket and never recomputed afterwards.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

/// Multiplier (in percent) applied during `[start_hour, end_hour)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    pub percent: u64,
}

impl HourWindow {
    pub fn new(start_hour: u32, end_hour: u32, percent: u64) -> Self {
        Self {
            start_hour,
            end_hour,
            percent,
        }
    }

    fn contains(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }
}

/// Multiplier (in percent) for one weekday (0 = Sunday ... 6 = Saturday)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFactor {
    pub day: u32,
    pub percent: u64,
}

impl DayFactor {
    pub fn new(day: u32, percent: u64) -> Self {
        Self { day, percent }
    }
}

/// Demand multipliers. First matching hour window wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub hour_windows: Vec<HourWindow>,
    pub day_factors: Vec<DayFactor>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            hour_windows: vec![
                // Lunch and end-of-day peaks
                HourWindow::new(12, 14, 130),
                HourWindow::new(16, 17, 130),
                // Early morning and evening lull
                HourWindow::new(0, 10, 80),
                HourWindow::new(18, 24, 80),
            ],
            day_factors: vec![
                DayFactor::new(5, 120), // Friday
                DayFactor::new(6, 70),  // Saturday
                DayFactor::new(0, 70),  // Sunday
            ],
        }
    }
}

const NEUTRAL_PERCENT: u64 = 100;

#[derive(Debug, Clone, Default)]
pub struct WaitEstimator {
    config: EstimatorConfig,
}

impl WaitEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Time-of-day multiplier in percent
    pub fn time_percent(&self, hour: u32) -> u64 {
        self.config
            .hour_windows
            .iter()
            .find(|w| w.contains(hour))
            .map(|w| w.percent)
            .unwrap_or(NEUTRAL_PERCENT)
    }

    /// Day-of-week multiplier in percent (0 = Sunday)
    pub fn day_percent(&self, day_from_sunday: u32) -> u64 {
        self.config
            .day_factors
            .iter()
            .find(|d| d.day == day_from_sunday)
            .map(|d| d.percent)
            .unwrap_or(NEUTRAL_PERCENT)
    }

    /// Predicted wait in minutes for a ticket issued at local time `at`
    pub fn estimate(&self, waiting: i64, avg_service_minutes: u32, at: &DateTime<FixedOffset>) -> u32 {
        if waiting <= 1 {
            return 0;
        }

        let avg = u64::from(avg_service_minutes);
        let base = (waiting as u64 - 1).saturating_mul(avg);
        let time = self.time_percent(at.hour());
        let day = self.day_percent(at.weekday().num_days_from_sunday());

        let predicted = base.saturating_mul(time).saturating_mul(day).div_ceil(10_000);
        let floor = avg.div_ceil(2);

        predicted.max(floor).min(u64::from(u32::MAX)) as u32
    }
}
