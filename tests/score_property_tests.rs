//! Property tests for the composite scorer: every sub-score stays inside
//! its cap and the total is their sum, for arbitrary snapshots.

use proptest::prelude::*;

use healthrs::models::{
    BiometricSnapshot, BloodPressureReading, ExerciseSession, OxygenReading, TemperatureReading,
    WeightReading,
};
use healthrs::scoring::{HealthScorer, ScoreCategory};

prop_compose! {
    fn arb_snapshot()(
        total_steps in 0u32..40_000,
        avg_heart_rate in 30u16..200,
        min_heart_rate in 30u16..120,
        hr_spread in 0u16..120,
        total_distance_km in 0.0f64..60.0,
        total_sleep_hours in 0.0f64..20.0,
        total_hydration_liters in 0.0f64..6.0,
        stress_score in 0u8..=100,
        spo2 in proptest::option::of(70.0f64..=100.0),
        temperature in proptest::option::of(34.0f64..41.0),
        blood_pressure in proptest::option::of((70u16..220, 40u16..140)),
        weight in proptest::option::of(40.0f64..150.0),
        exercise_minutes in proptest::collection::vec(0.0f64..120.0, 0..4),
    ) -> BiometricSnapshot {
        BiometricSnapshot {
            total_steps,
            avg_heart_rate,
            min_heart_rate,
            max_heart_rate: min_heart_rate.saturating_add(hr_spread),
            total_distance_km,
            total_sleep_hours,
            total_hydration_liters,
            stress_level: "Moderate".to_string(),
            stress_score,
            daily_total_calories: 0,
            oxygen_saturation: spo2
                .map(|percentage| vec![OxygenReading { percentage }])
                .unwrap_or_default(),
            body_temperature: temperature
                .map(|temperature| vec![TemperatureReading { temperature }])
                .unwrap_or_default(),
            blood_pressure: blood_pressure
                .map(|(systolic, diastolic)| vec![BloodPressureReading { systolic, diastolic }])
                .unwrap_or_default(),
            weight: weight.map(|weight| vec![WeightReading { weight }]).unwrap_or_default(),
            height: Vec::new(),
            exercise: exercise_minutes
                .into_iter()
                .map(|duration_minutes| ExerciseSession { duration_minutes })
                .collect(),
        }
    }
}

proptest! {
    #[test]
    fn sub_scores_stay_within_caps(snapshot in arb_snapshot()) {
        let score = HealthScorer::new().calculate(&snapshot);
        for category in ScoreCategory::ALL {
            let value = score.breakdown.get(category);
            prop_assert!(value >= 0.0, "{category} went negative: {value}");
            prop_assert!(
                value <= category.max_points(),
                "{category} exceeded its cap: {value}"
            );
        }
    }

    #[test]
    fn total_is_the_sum_of_sub_scores(snapshot in arb_snapshot()) {
        let score = HealthScorer::new().calculate(&snapshot);
        let sum = score.breakdown.total();
        prop_assert!((score.total_score - sum).abs() <= 0.05 + f64::EPSILON);
        prop_assert!(score.total_score >= 0.0);
        prop_assert!(score.total_score <= 100.0);
    }

    #[test]
    fn scorer_is_deterministic(snapshot in arb_snapshot()) {
        let scorer = HealthScorer::new();
        prop_assert_eq!(scorer.calculate(&snapshot), scorer.calculate(&snapshot));
    }
}
