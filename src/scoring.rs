//! Composite health scoring.
//!
//! Converts one day's [`BiometricSnapshot`] into a 0-100 score built from six
//! independently capped sub-scores. The caps act as category weights:
//! activity 25, cardiovascular 25, sleep 20, hydration 10, stress 10,
//! vitals 10, so the plain sum is already the weighted total.
//!
//! Scoring is a pure function of the snapshot: same input, same breakdown.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::BiometricSnapshot;
use crate::norms::HealthNorms;

/// The six scored categories, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Activity,
    Cardiovascular,
    Sleep,
    Hydration,
    Stress,
    Vitals,
}

impl ScoreCategory {
    /// All categories in reporting order
    pub const ALL: [ScoreCategory; 6] = [
        ScoreCategory::Activity,
        ScoreCategory::Cardiovascular,
        ScoreCategory::Sleep,
        ScoreCategory::Hydration,
        ScoreCategory::Stress,
        ScoreCategory::Vitals,
    ];

    /// Maximum points the category can contribute
    pub fn max_points(&self) -> f64 {
        match self {
            ScoreCategory::Activity | ScoreCategory::Cardiovascular => 25.0,
            ScoreCategory::Sleep => 20.0,
            ScoreCategory::Hydration | ScoreCategory::Stress | ScoreCategory::Vitals => 10.0,
        }
    }

    /// Human-readable description used in explanations
    pub fn description(&self) -> &'static str {
        match self {
            ScoreCategory::Activity => "physical activity level",
            ScoreCategory::Cardiovascular => "cardiovascular health",
            ScoreCategory::Sleep => "sleep quality",
            ScoreCategory::Hydration => "hydration level",
            ScoreCategory::Stress => "stress management",
            ScoreCategory::Vitals => "vital signs",
        }
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoreCategory::Activity => "activity",
            ScoreCategory::Cardiovascular => "cardiovascular",
            ScoreCategory::Sleep => "sleep",
            ScoreCategory::Hydration => "hydration",
            ScoreCategory::Stress => "stress",
            ScoreCategory::Vitals => "vitals",
        };
        write!(f, "{}", name)
    }
}

/// Per-category sub-scores for one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Activity sub-score (0-25)
    pub activity: f64,

    /// Cardiovascular sub-score (0-25)
    pub cardiovascular: f64,

    /// Sleep sub-score (0-20)
    pub sleep: f64,

    /// Hydration sub-score (0-10)
    pub hydration: f64,

    /// Stress sub-score (0-10)
    pub stress: f64,

    /// Vital-signs sub-score (0-10)
    pub vitals: f64,
}

impl ScoreBreakdown {
    /// Sub-score for a category
    pub fn get(&self, category: ScoreCategory) -> f64 {
        match category {
            ScoreCategory::Activity => self.activity,
            ScoreCategory::Cardiovascular => self.cardiovascular,
            ScoreCategory::Sleep => self.sleep,
            ScoreCategory::Hydration => self.hydration,
            ScoreCategory::Stress => self.stress,
            ScoreCategory::Vitals => self.vitals,
        }
    }

    /// Unrounded sum of all sub-scores
    pub fn total(&self) -> f64 {
        ScoreCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Category with the lowest share of its maximum, for explanations
    pub fn weakest_category(&self) -> ScoreCategory {
        let mut weakest = ScoreCategory::Activity;
        let mut weakest_ratio = f64::INFINITY;
        for category in ScoreCategory::ALL {
            let ratio = self.get(category) / category.max_points();
            if ratio < weakest_ratio {
                weakest_ratio = ratio;
                weakest = category;
            }
        }
        weakest
    }
}

/// A computed composite score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// Composite score 0-100, rounded to one decimal
    pub total_score: f64,

    /// Per-category sub-scores
    pub breakdown: ScoreBreakdown,
}

/// Composite health score calculator
#[derive(Debug, Clone, Default)]
pub struct HealthScorer {
    norms: HealthNorms,
}

impl HealthScorer {
    /// Create a scorer with the standard reference norms
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scorer with custom reference norms
    pub fn with_norms(norms: HealthNorms) -> Self {
        HealthScorer { norms }
    }

    /// Compute the composite score for one snapshot
    pub fn calculate(&self, snapshot: &BiometricSnapshot) -> HealthScore {
        let breakdown = ScoreBreakdown {
            activity: self.score_activity(snapshot),
            cardiovascular: self.score_cardiovascular(snapshot),
            sleep: self.score_sleep(snapshot.total_sleep_hours),
            hydration: self.score_hydration(snapshot.total_hydration_liters),
            stress: self.score_stress(snapshot.stress_score),
            vitals: self.score_vitals(snapshot),
        };

        HealthScore {
            total_score: (breakdown.total() * 10.0).round() / 10.0,
            breakdown,
        }
    }

    /// Activity sub-score: step count (0-15) plus exercise duration (0-10)
    fn score_activity(&self, snapshot: &BiometricSnapshot) -> f64 {
        let norms = self.norms.steps;
        let steps = snapshot.total_steps;
        let mut score = if steps >= norms.optimal {
            15.0
        } else if steps >= norms.minimum {
            10.0 + f64::from(steps - norms.minimum) / 5000.0 * 5.0
        } else if steps >= norms.low {
            5.0 + f64::from(steps - norms.low) / 3000.0 * 5.0
        } else {
            f64::from(steps) / f64::from(norms.low) * 5.0
        };

        if !snapshot.exercise.is_empty() {
            let minutes = snapshot.total_exercise_minutes();
            score += if minutes >= 30.0 {
                10.0
            } else if minutes >= 20.0 {
                7.0
            } else if minutes >= 10.0 {
                5.0
            } else {
                minutes / 10.0 * 5.0
            };
        }

        score.min(25.0)
    }

    /// Cardiovascular sub-score: average HR (0-15), HR variability (0-5),
    /// latest blood pressure (0-5)
    fn score_cardiovascular(&self, snapshot: &BiometricSnapshot) -> f64 {
        let hr_norms = self.norms.heart_rate;
        let avg_hr = snapshot.avg_heart_rate;

        let mut score: f64 =
            if avg_hr >= hr_norms.optimal_min && avg_hr <= hr_norms.optimal_max {
                15.0
            } else if avg_hr >= hr_norms.bradycardia && avg_hr <= hr_norms.max {
                12.0
            } else if avg_hr < hr_norms.bradycardia {
                10.0
            } else if avg_hr <= hr_norms.tachycardia {
                8.0
            } else {
                5.0
            };

        let spread = snapshot.heart_rate_spread();
        score += if (15..=40).contains(&spread) {
            5.0
        } else if (10..=50).contains(&spread) {
            3.0
        } else {
            1.0
        };

        if let Some(bp) = snapshot.latest_blood_pressure() {
            let bp_norms = self.norms.blood_pressure;
            score += if bp.systolic <= bp_norms.systolic.normal_max
                && bp.diastolic <= bp_norms.diastolic.normal_max
            {
                5.0
            } else if bp.systolic <= bp_norms.systolic.elevated
                && bp.diastolic <= bp_norms.diastolic.elevated
            {
                3.0
            } else {
                1.0
            };
        }

        score.min(25.0)
    }

    /// Sleep sub-score: full credit in the 7-9h band, banded degradation
    /// below, slow decay above
    fn score_sleep(&self, hours: f64) -> f64 {
        let norms = self.norms.sleep;
        if hours >= norms.minimum && hours <= norms.maximum {
            20.0
        } else if hours >= 6.0 && hours < norms.minimum {
            15.0
        } else if hours > norms.maximum {
            let excess = hours - norms.maximum;
            (20.0 - excess * 3.0).max(10.0)
        } else if hours >= 5.0 {
            10.0
        } else {
            (hours * 2.0).max(0.0)
        }
    }

    /// Hydration sub-score: full credit at 2.5L, interpolated 7-10 down to
    /// 1.5L, proportional below
    fn score_hydration(&self, liters: f64) -> f64 {
        let norms = self.norms.hydration;
        if liters >= norms.optimal {
            10.0
        } else if liters >= norms.minimum {
            7.0 + (liters - norms.minimum) * 3.0
        } else {
            liters / norms.minimum * 7.0
        }
    }

    /// Stress sub-score: inverse-linear in the 0-100 stress score
    fn score_stress(&self, stress_score: u8) -> f64 {
        (10.0 - f64::from(stress_score) / 10.0).max(0.0)
    }

    /// Vital-signs sub-score: latest SpO2 (0-5) plus latest temperature (0-5)
    fn score_vitals(&self, snapshot: &BiometricSnapshot) -> f64 {
        let mut score = 0.0;

        if let Some(spo2) = snapshot.latest_spo2() {
            if spo2 >= self.norms.spo2.normal_min {
                score += 5.0;
            } else if spo2 >= self.norms.spo2.low {
                score += 3.0;
            }
        }

        if let Some(temp) = snapshot.latest_temperature() {
            let norms = self.norms.temperature;
            if temp >= norms.normal_min && temp <= norms.normal_max {
                score += 5.0;
            } else if temp >= norms.fever {
                // fever earns nothing
            } else {
                score += 2.0;
            }
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BloodPressureReading, ExerciseSession, OxygenReading, TemperatureReading,
    };

    fn scorer() -> HealthScorer {
        HealthScorer::new()
    }

    #[test]
    fn test_activity_bands() {
        let mut snapshot = BiometricSnapshot::default();

        snapshot.total_steps = 12_000;
        assert_eq!(scorer().calculate(&snapshot).breakdown.activity, 15.0);

        snapshot.total_steps = 7_500;
        let score = scorer().calculate(&snapshot).breakdown.activity;
        assert!((score - 12.5).abs() < 1e-9);

        snapshot.total_steps = 3_500;
        let score = scorer().calculate(&snapshot).breakdown.activity;
        assert!((score - 7.5).abs() < 1e-9);

        snapshot.total_steps = 1_000;
        let score = scorer().calculate(&snapshot).breakdown.activity;
        assert!((score - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_activity_exercise_credit() {
        let snapshot = BiometricSnapshot {
            total_steps: 10_000,
            exercise: vec![
                ExerciseSession {
                    duration_minutes: 20.0,
                },
                ExerciseSession {
                    duration_minutes: 15.0,
                },
            ],
            ..Default::default()
        };

        // 15 from steps + 10 from 35 total exercise minutes, capped at 25
        assert_eq!(scorer().calculate(&snapshot).breakdown.activity, 25.0);
    }

    #[test]
    fn test_activity_short_exercise_is_partial() {
        let snapshot = BiometricSnapshot {
            total_steps: 0,
            exercise: vec![ExerciseSession {
                duration_minutes: 5.0,
            }],
            ..Default::default()
        };

        let score = scorer().calculate(&snapshot).breakdown.activity;
        assert!((score - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_cardiovascular_optimal_band() {
        let snapshot = BiometricSnapshot {
            avg_heart_rate: 70,
            min_heart_rate: 60,
            max_heart_rate: 90, // spread 30 -> 5 points
            blood_pressure: vec![BloodPressureReading {
                systolic: 118,
                diastolic: 78,
            }],
            ..Default::default()
        };

        assert_eq!(scorer().calculate(&snapshot).breakdown.cardiovascular, 25.0);
    }

    #[test]
    fn test_cardiovascular_without_blood_pressure() {
        let snapshot = BiometricSnapshot {
            avg_heart_rate: 70,
            min_heart_rate: 60,
            max_heart_rate: 90,
            ..Default::default()
        };

        // no BP reading, no BP points
        assert_eq!(scorer().calculate(&snapshot).breakdown.cardiovascular, 20.0);
    }

    #[test]
    fn test_cardiovascular_tachycardic_day() {
        let snapshot = BiometricSnapshot {
            avg_heart_rate: 125,
            min_heart_rate: 70,
            max_heart_rate: 150, // spread 80 -> 1 point
            ..Default::default()
        };

        assert_eq!(scorer().calculate(&snapshot).breakdown.cardiovascular, 6.0);
    }

    #[test]
    fn test_sleep_bands() {
        assert_eq!(scorer().score_sleep(8.0), 20.0);
        assert_eq!(scorer().score_sleep(6.5), 15.0);
        assert_eq!(scorer().score_sleep(5.5), 10.0);
        assert_eq!(scorer().score_sleep(4.0), 8.0);
        assert_eq!(scorer().score_sleep(0.0), 0.0);
        // 11h oversleep: 20 - 2*3 = 14
        assert_eq!(scorer().score_sleep(11.0), 14.0);
        // decay floors at 10
        assert_eq!(scorer().score_sleep(15.0), 10.0);
    }

    #[test]
    fn test_hydration_bands() {
        assert_eq!(scorer().score_hydration(3.0), 10.0);
        assert_eq!(scorer().score_hydration(2.5), 10.0);
        assert!((scorer().score_hydration(2.0) - 8.5).abs() < 1e-9);
        assert!((scorer().score_hydration(0.75) - 3.5).abs() < 1e-9);
        assert_eq!(scorer().score_hydration(0.0), 0.0);
    }

    #[test]
    fn test_stress_inverse_linear() {
        assert_eq!(scorer().score_stress(0), 10.0);
        assert_eq!(scorer().score_stress(50), 5.0);
        assert_eq!(scorer().score_stress(100), 0.0);
    }

    #[test]
    fn test_vitals_missing_sequences_score_zero() {
        let snapshot = BiometricSnapshot::default();
        assert_eq!(scorer().calculate(&snapshot).breakdown.vitals, 0.0);
    }

    #[test]
    fn test_vitals_fever_earns_nothing_for_temperature() {
        let snapshot = BiometricSnapshot {
            oxygen_saturation: vec![OxygenReading { percentage: 97.0 }],
            body_temperature: vec![TemperatureReading { temperature: 38.6 }],
            ..Default::default()
        };
        assert_eq!(scorer().calculate(&snapshot).breakdown.vitals, 5.0);
    }

    #[test]
    fn test_vitals_borderline_readings() {
        let snapshot = BiometricSnapshot {
            oxygen_saturation: vec![OxygenReading { percentage: 92.0 }],
            body_temperature: vec![TemperatureReading { temperature: 35.8 }],
            ..Default::default()
        };
        assert_eq!(scorer().calculate(&snapshot).breakdown.vitals, 5.0);
    }

    #[test]
    fn test_excellent_day_scores_98() {
        let snapshot = BiometricSnapshot {
            total_steps: 12_000,
            avg_heart_rate: 70,
            min_heart_rate: 60,
            max_heart_rate: 90,
            total_sleep_hours: 8.0,
            total_hydration_liters: 2.6,
            stress_score: 20,
            blood_pressure: vec![BloodPressureReading {
                systolic: 120,
                diastolic: 78,
            }],
            oxygen_saturation: vec![OxygenReading { percentage: 98.0 }],
            body_temperature: vec![TemperatureReading { temperature: 36.8 }],
            ..Default::default()
        };

        let score = scorer().calculate(&snapshot);
        assert_eq!(score.breakdown.activity, 25.0);
        assert_eq!(score.breakdown.cardiovascular, 25.0);
        assert_eq!(score.breakdown.sleep, 20.0);
        assert_eq!(score.breakdown.hydration, 10.0);
        assert_eq!(score.breakdown.stress, 8.0);
        assert_eq!(score.breakdown.vitals, 10.0);
        assert_eq!(score.total_score, 98.0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let snapshot = BiometricSnapshot {
            total_steps: 6_400,
            avg_heart_rate: 84,
            total_sleep_hours: 6.2,
            stress_score: 64,
            ..Default::default()
        };

        let first = scorer().calculate(&snapshot);
        let second = scorer().calculate(&snapshot);
        assert_eq!(first, second);
    }

    #[test]
    fn test_weakest_category() {
        let breakdown = ScoreBreakdown {
            activity: 25.0,
            cardiovascular: 25.0,
            sleep: 20.0,
            hydration: 10.0,
            stress: 2.0,
            vitals: 10.0,
        };
        assert_eq!(breakdown.weakest_category(), ScoreCategory::Stress);
    }
}
