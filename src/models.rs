use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single oxygen-saturation reading (pulse oximetry)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OxygenReading {
    /// Blood oxygen saturation in percent (SpO2)
    pub percentage: f64,
}

/// A single body-temperature reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    /// Body temperature in degrees Celsius
    pub temperature: f64,
}

/// A single blood-pressure reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureReading {
    /// Systolic pressure in mmHg
    pub systolic: u16,

    /// Diastolic pressure in mmHg
    pub diastolic: u16,
}

/// A single body-weight reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightReading {
    /// Body weight in kilograms
    pub weight: f64,
}

/// A single height reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightReading {
    /// Height in meters
    pub height: f64,
}

/// One recorded exercise session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSession {
    /// Session duration in minutes
    #[serde(alias = "durationMinutes")]
    pub duration_minutes: f64,
}

/// One subject's biometric data for a single day.
///
/// Scalar fields carry neutral defaults so that a record missing upstream
/// fields still scores without division-by-zero or missing-data branches;
/// the defaults are applied once at deserialization, never re-checked inside
/// the scoring functions. Field aliases accept the raw upstream camelCase
/// names as they arrive from the ingestion pipeline.
///
/// The optional sequences are time-ordered within the day. Whenever a
/// sequence is non-empty, only its last element feeds scoring and anomaly
/// logic: latest observation wins. The sequences are never averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiometricSnapshot {
    /// Total step count for the day
    #[serde(alias = "totalSteps")]
    pub total_steps: u32,

    /// Average heart rate in bpm
    #[serde(alias = "avgHeartRate")]
    pub avg_heart_rate: u16,

    /// Minimum heart rate in bpm
    #[serde(alias = "minHeartRate")]
    pub min_heart_rate: u16,

    /// Maximum heart rate in bpm
    #[serde(alias = "maxHeartRate")]
    pub max_heart_rate: u16,

    /// Total distance covered in kilometers
    #[serde(alias = "totalDistanceKm")]
    pub total_distance_km: f64,

    /// Total sleep duration in hours
    #[serde(alias = "totalSleepHours")]
    pub total_sleep_hours: f64,

    /// Total water intake in liters
    #[serde(alias = "totalHydrationLiters")]
    pub total_hydration_liters: f64,

    /// Qualitative stress label reported upstream
    #[serde(alias = "stressLevel")]
    pub stress_level: String,

    /// Stress score on a 0-100 scale
    #[serde(alias = "stressScore")]
    pub stress_score: u8,

    /// Total calories logged for the day
    #[serde(alias = "dailyTotalCalories")]
    pub daily_total_calories: u32,

    /// Oxygen-saturation readings, time-ordered
    #[serde(alias = "oxygenSaturation")]
    pub oxygen_saturation: Vec<OxygenReading>,

    /// Body-temperature readings, time-ordered
    #[serde(alias = "bodyTemperature")]
    pub body_temperature: Vec<TemperatureReading>,

    /// Blood-pressure readings, time-ordered
    #[serde(alias = "bloodPressure")]
    pub blood_pressure: Vec<BloodPressureReading>,

    /// Body-weight readings, time-ordered
    pub weight: Vec<WeightReading>,

    /// Height readings, time-ordered
    pub height: Vec<HeightReading>,

    /// Exercise sessions recorded during the day
    pub exercise: Vec<ExerciseSession>,
}

impl Default for BiometricSnapshot {
    fn default() -> Self {
        BiometricSnapshot {
            total_steps: 0,
            avg_heart_rate: 70,
            min_heart_rate: 60,
            max_heart_rate: 90,
            total_distance_km: 0.0,
            total_sleep_hours: 7.0,
            total_hydration_liters: 2.0,
            stress_level: "Moderate".to_string(),
            stress_score: 50,
            daily_total_calories: 0,
            oxygen_saturation: Vec::new(),
            body_temperature: Vec::new(),
            blood_pressure: Vec::new(),
            weight: Vec::new(),
            height: Vec::new(),
            exercise: Vec::new(),
        }
    }
}

impl BiometricSnapshot {
    /// Latest oxygen-saturation reading, if any
    pub fn latest_spo2(&self) -> Option<f64> {
        self.oxygen_saturation.last().map(|r| r.percentage)
    }

    /// Latest body-temperature reading, if any
    pub fn latest_temperature(&self) -> Option<f64> {
        self.body_temperature.last().map(|r| r.temperature)
    }

    /// Latest blood-pressure reading, if any
    pub fn latest_blood_pressure(&self) -> Option<BloodPressureReading> {
        self.blood_pressure.last().copied()
    }

    /// Latest body-weight reading, if any
    pub fn latest_weight(&self) -> Option<f64> {
        self.weight.last().map(|r| r.weight)
    }

    /// Total exercise duration across all sessions, in minutes
    pub fn total_exercise_minutes(&self) -> f64 {
        self.exercise.iter().map(|e| e.duration_minutes).sum()
    }

    /// Heart-rate variability proxy: max minus min heart rate
    pub fn heart_rate_spread(&self) -> u16 {
        self.max_heart_rate.saturating_sub(self.min_heart_rate)
    }

    /// Validate that the snapshot is physiologically plausible.
    ///
    /// Rejects non-finite floats and values far outside any plausible band.
    /// Callers aggregating over many records treat a failure here as a
    /// degraded record, not a fatal error.
    pub fn validate(&self) -> Result<(), SnapshotValidationError> {
        for (field, value) in [
            ("totalDistanceKm", self.total_distance_km),
            ("totalSleepHours", self.total_sleep_hours),
            ("totalHydrationLiters", self.total_hydration_liters),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SnapshotValidationError::NonFinite {
                    field: field.to_string(),
                });
            }
        }

        if self.total_sleep_hours > 48.0 {
            return Err(SnapshotValidationError::OutOfRange {
                field: "totalSleepHours".to_string(),
                value: self.total_sleep_hours,
            });
        }
        if self.total_hydration_liters > 20.0 {
            return Err(SnapshotValidationError::OutOfRange {
                field: "totalHydrationLiters".to_string(),
                value: self.total_hydration_liters,
            });
        }
        for reading in &self.body_temperature {
            if !reading.temperature.is_finite()
                || reading.temperature < 25.0
                || reading.temperature > 45.0
            {
                return Err(SnapshotValidationError::OutOfRange {
                    field: "bodyTemperature".to_string(),
                    value: reading.temperature,
                });
            }
        }
        for reading in &self.oxygen_saturation {
            if !reading.percentage.is_finite()
                || reading.percentage < 0.0
                || reading.percentage > 100.0
            {
                return Err(SnapshotValidationError::OutOfRange {
                    field: "oxygenSaturation".to_string(),
                    value: reading.percentage,
                });
            }
        }

        Ok(())
    }
}

/// Snapshot validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotValidationError {
    /// A float field is NaN, infinite, or negative
    #[error("non-finite or negative value in {field}")]
    NonFinite { field: String },

    /// A value is outside any physiologically plausible band
    #[error("implausible value in {field}: {value}")]
    OutOfRange { field: String, value: f64 },
}

/// One stored record: a dated snapshot for a subject.
///
/// A window is an ordered, de-duplicated-by-date sequence of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar day the snapshot covers
    pub date: NaiveDate,

    /// Subject identifier (upstream uses the account email)
    pub subject: String,

    /// The day's biometric snapshot
    pub snapshot: BiometricSnapshot,
}

/// De-duplicate a window by calendar date, keeping the first record seen
/// for each date, and return it sorted ascending.
///
/// Upstream pipelines occasionally deliver several documents for the same
/// day; every multi-day aggregation counts a date exactly once.
pub fn dedupe_by_date(records: &[DailyRecord]) -> Vec<DailyRecord> {
    let mut seen = std::collections::BTreeMap::new();
    for record in records {
        seen.entry(record.date).or_insert_with(|| record.clone());
    }
    seen.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults_are_neutral() {
        let snapshot = BiometricSnapshot::default();

        assert_eq!(snapshot.avg_heart_rate, 70);
        assert_eq!(snapshot.min_heart_rate, 60);
        assert_eq!(snapshot.max_heart_rate, 90);
        assert_eq!(snapshot.total_sleep_hours, 7.0);
        assert_eq!(snapshot.total_hydration_liters, 2.0);
        assert_eq!(snapshot.stress_score, 50);
        assert!(snapshot.oxygen_saturation.is_empty());
        assert!(snapshot.exercise.is_empty());
    }

    #[test]
    fn test_upstream_field_aliases() {
        let json = r#"{
            "totalSteps": 8500,
            "avgHeartRate": 72,
            "minHeartRate": 55,
            "maxHeartRate": 130,
            "totalDistanceKm": 6.2,
            "totalSleepHours": 7.5,
            "totalHydrationLiters": 2.1,
            "stressLevel": "Low",
            "stressScore": 30,
            "oxygenSaturation": [{"percentage": 97.0}, {"percentage": 98.0}],
            "bloodPressure": [{"systolic": 118, "diastolic": 76}],
            "exercise": [{"durationMinutes": 25.0}]
        }"#;

        let snapshot: BiometricSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.total_steps, 8500);
        assert_eq!(snapshot.avg_heart_rate, 72);
        assert_eq!(snapshot.latest_spo2(), Some(98.0));
        assert_eq!(
            snapshot.latest_blood_pressure(),
            Some(BloodPressureReading {
                systolic: 118,
                diastolic: 76
            })
        );
        assert_eq!(snapshot.total_exercise_minutes(), 25.0);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let snapshot: BiometricSnapshot = serde_json::from_str(r#"{"totalSteps": 400}"#).unwrap();

        assert_eq!(snapshot.total_steps, 400);
        assert_eq!(snapshot.avg_heart_rate, 70);
        assert_eq!(snapshot.total_sleep_hours, 7.0);
        assert_eq!(snapshot.latest_temperature(), None);
    }

    #[test]
    fn test_latest_observation_wins() {
        let snapshot = BiometricSnapshot {
            body_temperature: vec![
                TemperatureReading { temperature: 38.4 },
                TemperatureReading { temperature: 36.8 },
            ],
            ..Default::default()
        };

        // Only the final reading counts, earlier readings are history
        assert_eq!(snapshot.latest_temperature(), Some(36.8));
    }

    #[test]
    fn test_heart_rate_spread_saturates() {
        let snapshot = BiometricSnapshot {
            min_heart_rate: 90,
            max_heart_rate: 60,
            ..Default::default()
        };
        assert_eq!(snapshot.heart_rate_spread(), 0);
    }

    #[test]
    fn test_validation_rejects_nan_sleep() {
        let snapshot = BiometricSnapshot {
            total_sleep_hours: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotValidationError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_implausible_temperature() {
        let snapshot = BiometricSnapshot {
            body_temperature: vec![TemperatureReading { temperature: 98.6 }],
            ..Default::default()
        };
        assert!(matches!(
            snapshot.validate(),
            Err(SnapshotValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validation_accepts_typical_day() {
        let snapshot = BiometricSnapshot {
            total_steps: 9000,
            total_sleep_hours: 7.8,
            body_temperature: vec![TemperatureReading { temperature: 36.6 }],
            ..Default::default()
        };
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_dedupe_keeps_first_record_per_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let first = DailyRecord {
            date,
            subject: "user@example.com".to_string(),
            snapshot: BiometricSnapshot {
                total_steps: 4_000,
                ..Default::default()
            },
        };
        let duplicate = DailyRecord {
            date,
            subject: "user@example.com".to_string(),
            snapshot: BiometricSnapshot {
                total_steps: 9_999,
                ..Default::default()
            },
        };
        let next_day = DailyRecord {
            date: date.succ_opt().unwrap(),
            subject: "user@example.com".to_string(),
            snapshot: BiometricSnapshot::default(),
        };

        let deduped = dedupe_by_date(&[next_day.clone(), first.clone(), duplicate]);
        assert_eq!(deduped, vec![first, next_day]);
    }

    #[test]
    fn test_daily_record_serialization() {
        let record = DailyRecord {
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            subject: "user@example.com".to_string(),
            snapshot: BiometricSnapshot::default(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: DailyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, record);
    }
}
