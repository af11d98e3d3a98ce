//! Multi-day trend analysis.
//!
//! Builds per-metric time series from a deduplicated record window,
//! recomputes the historical health score for every day, derives adaptive
//! moving averages, and classifies each metric's direction with a
//! least-squares fit.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use crate::error::{HealthRsError, Result};
use crate::models::{dedupe_by_date, DailyRecord};
use crate::scoring::HealthScorer;

/// Trend classification for one metric series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    /// Fewer than three points; no fit attempted
    InsufficientData,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::InsufficientData => "insufficient_data",
        };
        write!(f, "{}", name)
    }
}

/// Classify a series by the slope of its least-squares line.
///
/// The slope threshold adapts to the series magnitude: 2% of the absolute
/// mean, floored at 0.01 so near-zero series do not flap.
pub fn detect_trend(values: &[f64]) -> TrendDirection {
    if values.len() < 3 {
        return TrendDirection::InsufficientData;
    }

    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        numerator += dx * (y - y_mean);
        denominator += dx * dx;
    }
    let slope = numerator / denominator;

    let threshold = (0.02 * y_mean.abs()).max(0.01);
    if slope > threshold {
        TrendDirection::Increasing
    } else if slope < -threshold {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Sliding arithmetic mean over `window` points, yielding
/// `len - window + 1` values with no padding.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Descriptive statistics for one metric series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub trend: TrendDirection,
}

impl MetricStatistics {
    fn from_series(values: &[f64]) -> Self {
        let mean = values.mean();
        // population variance, not the sample estimator
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        MetricStatistics {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std: variance.sqrt(),
            trend: detect_trend(values),
        }
    }
}

/// Per-day metric series for a window, all the same length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    /// ISO dates, ascending
    pub dates: Vec<String>,
    pub steps: Vec<f64>,
    pub heart_rate: Vec<f64>,
    pub sleep_hours: Vec<f64>,
    pub stress_score: Vec<f64>,
    pub hydration: Vec<f64>,
    /// Latest weight reading per day, 0 when absent
    pub weight: Vec<f64>,
    /// Recomputed composite score per day
    pub health_scores: Vec<f64>,
}

/// Complete trend analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub subject: String,
    pub period_days: u32,
    pub data_points: usize,
    pub trends: TrendSeries,

    /// Moving averages keyed `{metric}_ma{window}`
    pub moving_averages: BTreeMap<String, Vec<f64>>,

    /// Per-metric statistics including the health-score series
    pub statistics: BTreeMap<String, MetricStatistics>,
}

/// Window-based trend analyzer
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    scorer: HealthScorer,
}

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze a fetched record window covering `period_days` days.
    ///
    /// Requires at least two distinct daily records after de-duplication.
    /// A record that fails validation contributes a 0 health score for its
    /// day (logged, not fatal); its raw metrics still enter the series.
    pub fn analyze(
        &self,
        subject: &str,
        records: &[DailyRecord],
        period_days: u32,
    ) -> Result<TrendReport> {
        let records = dedupe_by_date(records);

        if records.len() < 2 {
            let (start, end) = match (records.first(), records.last()) {
                (Some(first), Some(last)) => (first.date.to_string(), last.date.to_string()),
                _ => (String::from("-"), String::from("-")),
            };
            return Err(HealthRsError::NotFound {
                subject: subject.to_string(),
                start,
                end,
            });
        }

        let mut trends = TrendSeries {
            dates: Vec::with_capacity(records.len()),
            steps: Vec::with_capacity(records.len()),
            heart_rate: Vec::with_capacity(records.len()),
            sleep_hours: Vec::with_capacity(records.len()),
            stress_score: Vec::with_capacity(records.len()),
            hydration: Vec::with_capacity(records.len()),
            weight: Vec::with_capacity(records.len()),
            health_scores: Vec::with_capacity(records.len()),
        };

        for record in &records {
            let snapshot = &record.snapshot;
            trends.dates.push(record.date.to_string());
            trends.steps.push(f64::from(snapshot.total_steps));
            trends.heart_rate.push(f64::from(snapshot.avg_heart_rate));
            trends.sleep_hours.push(snapshot.total_sleep_hours);
            trends.stress_score.push(f64::from(snapshot.stress_score));
            trends.hydration.push(snapshot.total_hydration_liters);
            trends.weight.push(snapshot.latest_weight().unwrap_or(0.0));

            // Degraded, not fatal: a malformed day scores 0 and the series
            // keeps its full length.
            let score = match snapshot.validate() {
                Ok(()) => self.scorer.calculate(snapshot).total_score,
                Err(err) => {
                    warn!(
                        subject = subject,
                        date = %record.date,
                        error = %err,
                        "skipping health score for invalid record"
                    );
                    0.0
                }
            };
            trends.health_scores.push(score);
        }

        // Adaptive moving-average window between 3 and 7 days
        let window = (records.len() / 2).clamp(3, 7);
        let mut moving_averages = BTreeMap::new();
        for (name, series) in [
            ("steps", &trends.steps),
            ("heart_rate", &trends.heart_rate),
            ("sleep_hours", &trends.sleep_hours),
            ("stress_score", &trends.stress_score),
            ("hydration", &trends.hydration),
            ("weight", &trends.weight),
        ] {
            moving_averages.insert(
                format!("{name}_ma{window}"),
                moving_average(series, window),
            );
        }

        let mut statistics = BTreeMap::new();
        for (name, series) in [
            ("steps", &trends.steps),
            ("heart_rate", &trends.heart_rate),
            ("sleep_hours", &trends.sleep_hours),
            ("stress_score", &trends.stress_score),
            ("hydration", &trends.hydration),
            ("weight", &trends.weight),
            ("health_scores", &trends.health_scores),
        ] {
            statistics.insert(name.to_string(), MetricStatistics::from_series(series));
        }

        Ok(TrendReport {
            subject: subject.to_string(),
            period_days,
            data_points: records.len(),
            trends,
            moving_averages,
            statistics,
        })
    }
}
