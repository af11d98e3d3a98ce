//! Personalized recommendation generation.
//!
//! Each category contributes suggestions only when its sub-score falls below
//! a category-specific attention threshold, refined by the underlying field
//! values. Output is capped at [`MAX_RECOMMENDATIONS`] in generation order.

use crate::models::BiometricSnapshot;
use crate::scoring::ScoreBreakdown;

/// Hard cap on the number of recommendations returned
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Sub-score thresholds below which a category needs attention
const ACTIVITY_ATTENTION: f64 = 15.0;
const CARDIO_ATTENTION: f64 = 18.0;
const SLEEP_ATTENTION: f64 = 15.0;
const HYDRATION_ATTENTION: f64 = 7.0;
const STRESS_ATTENTION: f64 = 5.0;

/// Rule-based recommendation generator
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        RecommendationEngine
    }

    /// Generate at most [`MAX_RECOMMENDATIONS`] suggestions for one snapshot
    pub fn generate(
        &self,
        snapshot: &BiometricSnapshot,
        breakdown: &ScoreBreakdown,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        // Activity
        if breakdown.activity < ACTIVITY_ATTENTION {
            if snapshot.total_steps < 5_000 {
                recommendations.push(
                    "Build up gradually to 10,000 steps/day (+500 steps per week)".to_string(),
                );
            }
            if snapshot.exercise.is_empty() {
                recommendations.push(
                    "Add 150 minutes of moderate exercise per week (WHO guideline)".to_string(),
                );
            }
        }

        // Cardiovascular
        if breakdown.cardiovascular < CARDIO_ATTENTION {
            if snapshot.avg_heart_rate > 90 {
                recommendations
                    .push("Cardio training to strengthen the heart (3x per week)".to_string());
            }
            if snapshot
                .latest_blood_pressure()
                .is_some_and(|bp| bp.systolic > 130)
            {
                recommendations.push("See a doctor about elevated blood pressure".to_string());
                recommendations.push("Reduce salt intake (< 5g per day)".to_string());
            }
        }

        // Sleep
        if breakdown.sleep < SLEEP_ATTENTION {
            if snapshot.total_sleep_hours < 7.0 {
                recommendations.push(format!(
                    "Aim for 7-9h of sleep (currently {}h)",
                    snapshot.total_sleep_hours
                ));
                recommendations.push("Keep a fixed bedtime routine (10-11pm)".to_string());
            } else if snapshot.total_sleep_hours > 9.0 {
                recommendations
                    .push("See a doctor if excessive sleepiness persists".to_string());
            }
        }

        // Hydration
        if breakdown.hydration < HYDRATION_ATTENTION {
            let deficit = 2.5 - snapshot.total_hydration_liters;
            recommendations.push(format!(
                "Increase water intake by {deficit:.1}L (target: 2.5L/day)"
            ));
            recommendations.push("Drink a glass of water every 2 hours".to_string());
        }

        // Stress
        if breakdown.stress < STRESS_ATTENTION {
            recommendations.push("Daily meditation (10-15 min)".to_string());
            recommendations.push("Physical activity to relieve stress (30 min/day)".to_string());
            recommendations.push("Restorative sleep (7-9h)".to_string());
        }

        // Vital signs act on raw readings, not on the sub-score
        if snapshot.latest_spo2().is_some_and(|spo2| spo2 < 95.0) {
            recommendations.push("See a doctor about low blood oxygen".to_string());
        }
        if snapshot
            .latest_temperature()
            .is_some_and(|temp| temp >= 38.0)
        {
            recommendations.push("Stay hydrated and monitor your temperature".to_string());
        }

        if recommendations.is_empty() {
            recommendations.push("Excellent health habits!".to_string());
            recommendations.push("Keep up the regular tracking".to_string());
        }

        recommendations.truncate(MAX_RECOMMENDATIONS);
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloodPressureReading, OxygenReading, TemperatureReading};
    use crate::scoring::HealthScorer;

    fn generate(snapshot: &BiometricSnapshot) -> Vec<String> {
        let breakdown = HealthScorer::new().calculate(snapshot).breakdown;
        RecommendationEngine::new().generate(snapshot, &breakdown)
    }

    #[test]
    fn test_healthy_day_gets_positive_reinforcement() {
        let snapshot = BiometricSnapshot {
            total_steps: 11_000,
            avg_heart_rate: 68,
            min_heart_rate: 58,
            max_heart_rate: 88,
            total_sleep_hours: 8.0,
            total_hydration_liters: 2.6,
            stress_score: 25,
            blood_pressure: vec![BloodPressureReading {
                systolic: 115,
                diastolic: 75,
            }],
            ..Default::default()
        };

        let recommendations = generate(&snapshot);
        assert_eq!(
            recommendations,
            vec![
                "Excellent health habits!".to_string(),
                "Keep up the regular tracking".to_string(),
            ]
        );
    }

    #[test]
    fn test_sedentary_day_suggests_steps_and_exercise() {
        let snapshot = BiometricSnapshot {
            total_steps: 2_500,
            ..Default::default()
        };

        let recommendations = generate(&snapshot);
        assert!(recommendations.iter().any(|r| r.contains("10,000 steps")));
        assert!(recommendations.iter().any(|r| r.contains("150 minutes")));
    }

    #[test]
    fn test_elevated_blood_pressure_triggers_doctor_visit() {
        let snapshot = BiometricSnapshot {
            total_steps: 10_000,
            avg_heart_rate: 95,
            min_heart_rate: 88,
            max_heart_rate: 92,
            blood_pressure: vec![BloodPressureReading {
                systolic: 145,
                diastolic: 92,
            }],
            ..Default::default()
        };

        let recommendations = generate(&snapshot);
        assert!(recommendations
            .iter()
            .any(|r| r.contains("elevated blood pressure")));
        assert!(recommendations.iter().any(|r| r.contains("salt")));
    }

    #[test]
    fn test_hydration_deficit_is_quantified() {
        let snapshot = BiometricSnapshot {
            total_steps: 10_000,
            total_hydration_liters: 1.0,
            ..Default::default()
        };

        let recommendations = generate(&snapshot);
        assert!(recommendations
            .iter()
            .any(|r| r.contains("Increase water intake by 1.5L")));
    }

    #[test]
    fn test_vital_sign_rules_fire_regardless_of_score() {
        let snapshot = BiometricSnapshot {
            total_steps: 11_000,
            total_sleep_hours: 8.0,
            total_hydration_liters: 2.6,
            stress_score: 20,
            oxygen_saturation: vec![OxygenReading { percentage: 93.0 }],
            body_temperature: vec![TemperatureReading { temperature: 38.5 }],
            ..Default::default()
        };

        let recommendations = generate(&snapshot);
        assert!(recommendations.iter().any(|r| r.contains("low blood oxygen")));
        assert!(recommendations
            .iter()
            .any(|r| r.contains("monitor your temperature")));
    }

    #[test]
    fn test_output_is_capped_at_ten() {
        let snapshot = BiometricSnapshot {
            total_steps: 800,
            avg_heart_rate: 115,
            min_heart_rate: 100,
            max_heart_rate: 160,
            total_sleep_hours: 4.0,
            total_hydration_liters: 0.4,
            stress_score: 95,
            oxygen_saturation: vec![OxygenReading { percentage: 91.0 }],
            body_temperature: vec![TemperatureReading { temperature: 38.9 }],
            blood_pressure: vec![BloodPressureReading {
                systolic: 160,
                diastolic: 100,
            }],
            ..Default::default()
        };

        let recommendations = generate(&snapshot);
        assert!(recommendations.len() <= MAX_RECOMMENDATIONS);
        assert!(!recommendations.is_empty());
    }
}
