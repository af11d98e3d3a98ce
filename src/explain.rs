//! Rule-based explanation text for a completed analysis.
//!
//! Produces a short narrative keyed on the score band, naming the weakest
//! category and the day's headline numbers.

use crate::anomaly::RiskLevel;
use crate::models::BiometricSnapshot;
use crate::scoring::HealthScore;

/// Narrative generator for analysis results
#[derive(Debug, Clone, Copy, Default)]
pub struct Explainer;

impl Explainer {
    pub fn new() -> Self {
        Explainer
    }

    /// Build the explanation paragraph for one scored snapshot
    pub fn explain(
        &self,
        snapshot: &BiometricSnapshot,
        score: &HealthScore,
        risk_level: RiskLevel,
    ) -> String {
        let total = score.total_score;

        if total >= 80.0 {
            format!(
                "Excellent overall health (score: {:.1}/100). Your cardiovascular and \
                 activity metrics are optimal. Your average heart rate of {} bpm is within \
                 the normal range, and your {}h of sleep is satisfactory. Maintain these \
                 habits to preserve your long-term well-being.",
                total, snapshot.avg_heart_rate, snapshot.total_sleep_hours
            )
        } else if total >= 60.0 {
            let weakest = score.breakdown.weakest_category();
            format!(
                "Decent overall health (score: {:.1}/100), with room for improvement. \
                 Your {} needs particular attention. With {} steps today and {}h of \
                 sleep, focus on the priority recommendations to raise your health score.",
                total,
                weakest.description(),
                snapshot.total_steps,
                snapshot.total_sleep_hours
            )
        } else {
            format!(
                "Health score of {:.1}/100 indicating {} risk. Several parameters need \
                 immediate attention: activity at {} steps (target: 10000), sleep at {}h, \
                 stress at {}/100. Consult a health professional for personalized follow-up.",
                total,
                risk_level.label().to_lowercase(),
                snapshot.total_steps,
                snapshot.total_sleep_hours,
                snapshot.stress_score
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::{AnomalyDetector, RiskLevel};
    use crate::scoring::HealthScorer;

    fn explain(snapshot: &BiometricSnapshot) -> String {
        let score = HealthScorer::new().calculate(snapshot);
        let anomalies = AnomalyDetector::new().detect(snapshot);
        let risk = RiskLevel::classify(score.total_score, &anomalies);
        Explainer::new().explain(snapshot, &score, risk)
    }

    #[test]
    fn test_high_score_narrative() {
        let snapshot = BiometricSnapshot {
            total_steps: 11_000,
            total_sleep_hours: 8.0,
            total_hydration_liters: 2.6,
            stress_score: 20,
            blood_pressure: vec![crate::models::BloodPressureReading {
                systolic: 118,
                diastolic: 76,
            }],
            oxygen_saturation: vec![crate::models::OxygenReading { percentage: 98.0 }],
            body_temperature: vec![crate::models::TemperatureReading { temperature: 36.7 }],
            ..Default::default()
        };

        let text = explain(&snapshot);
        assert!(text.starts_with("Excellent overall health"));
        assert!(text.contains("70 bpm"));
    }

    #[test]
    fn test_mid_score_names_weakest_category() {
        let snapshot = BiometricSnapshot {
            total_steps: 9_000,
            total_sleep_hours: 7.5,
            total_hydration_liters: 2.5,
            stress_score: 90,
            oxygen_saturation: vec![crate::models::OxygenReading { percentage: 97.0 }],
            body_temperature: vec![crate::models::TemperatureReading { temperature: 36.8 }],
            ..Default::default()
        };

        let text = explain(&snapshot);
        assert!(text.contains("room for improvement"));
        assert!(text.contains("stress management"));
    }

    #[test]
    fn test_low_score_urges_followup() {
        let snapshot = BiometricSnapshot {
            total_steps: 500,
            total_sleep_hours: 4.0,
            total_hydration_liters: 0.5,
            stress_score: 95,
            ..Default::default()
        };

        let text = explain(&snapshot);
        assert!(text.contains("immediate attention"));
        assert!(text.contains("500 steps"));
    }
}
