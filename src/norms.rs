//! Medical reference thresholds (WHO/CDC derived).
//!
//! Pure data. Every scorer, detector, and analyzer band boundary that has a
//! clinical meaning lives here; hand-tuned analysis constants that do not
//! (goal target tables, probability weights) stay with their component.

/// Daily step-count reference points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepNorms {
    /// Optimal daily step count
    pub optimal: u32,
    /// Minimum recommended daily step count
    pub minimum: u32,
    /// Below this the day counts as low activity
    pub low: u32,
}

/// Resting/average heart-rate reference band in bpm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateNorms {
    /// Lower bound of the normal band
    pub min: u16,
    /// Upper bound of the normal band
    pub max: u16,
    /// Lower bound of the optimal band
    pub optimal_min: u16,
    /// Upper bound of the optimal band
    pub optimal_max: u16,
    /// Below this counts as bradycardia
    pub bradycardia: u16,
    /// Above this counts as tachycardia
    pub tachycardia: u16,
}

/// Sleep duration reference points in hours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepNorms {
    /// Optimal nightly sleep
    pub optimal: f64,
    /// Minimum recommended nightly sleep
    pub minimum: f64,
    /// Maximum recommended nightly sleep
    pub maximum: f64,
}

/// Hydration reference points in liters per day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydrationNorms {
    /// Optimal daily intake
    pub optimal: f64,
    /// Minimum recommended daily intake
    pub minimum: f64,
}

/// Oxygen-saturation reference points in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spo2Norms {
    /// Lower bound of normal saturation
    pub normal_min: f64,
    /// Below this saturation is critically low
    pub low: f64,
}

/// Body-temperature reference points in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureNorms {
    /// Lower bound of the normal band
    pub normal_min: f64,
    /// Upper bound of the normal band
    pub normal_max: f64,
    /// At or above this counts as fever
    pub fever: f64,
    /// Below this counts as hypothermia
    pub hypothermia: f64,
}

/// Blood-pressure reference points in mmHg, per component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureNorms {
    /// Upper bound of normal pressure
    pub normal_max: u16,
    /// Upper bound of elevated pressure
    pub elevated: u16,
    /// At or above this counts as hypertension
    pub high: u16,
}

/// Blood-pressure reference thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodPressureNorms {
    pub systolic: PressureNorms,
    pub diastolic: PressureNorms,
    /// Systolic at or above this is a hypertensive crisis
    pub crisis_systolic: u16,
    /// Diastolic at or above this is a hypertensive crisis
    pub crisis_diastolic: u16,
    /// Systolic below this counts as hypotension
    pub low_systolic: u16,
    /// Diastolic below this counts as hypotension
    pub low_diastolic: u16,
}

/// The full reference table used across the analysis engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthNorms {
    pub steps: StepNorms,
    pub heart_rate: HeartRateNorms,
    pub sleep: SleepNorms,
    pub hydration: HydrationNorms,
    pub spo2: Spo2Norms,
    pub temperature: TemperatureNorms,
    pub blood_pressure: BloodPressureNorms,
}

/// The standard reference table
pub const NORMS: HealthNorms = HealthNorms {
    steps: StepNorms {
        optimal: 10_000,
        minimum: 5_000,
        low: 2_000,
    },
    heart_rate: HeartRateNorms {
        min: 60,
        max: 100,
        optimal_min: 60,
        optimal_max: 80,
        bradycardia: 50,
        tachycardia: 110,
    },
    sleep: SleepNorms {
        optimal: 8.0,
        minimum: 7.0,
        maximum: 9.0,
    },
    hydration: HydrationNorms {
        optimal: 2.5,
        minimum: 1.5,
    },
    spo2: Spo2Norms {
        normal_min: 95.0,
        low: 90.0,
    },
    temperature: TemperatureNorms {
        normal_min: 36.1,
        normal_max: 37.2,
        fever: 38.0,
        hypothermia: 36.0,
    },
    blood_pressure: BloodPressureNorms {
        systolic: PressureNorms {
            normal_max: 120,
            elevated: 130,
            high: 140,
        },
        diastolic: PressureNorms {
            normal_max: 80,
            elevated: 85,
            high: 90,
        },
        crisis_systolic: 180,
        crisis_diastolic: 120,
        low_systolic: 90,
        low_diastolic: 60,
    },
};

impl Default for HealthNorms {
    fn default() -> Self {
        NORMS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norms_are_internally_consistent() {
        let norms = HealthNorms::default();

        assert!(norms.steps.low < norms.steps.minimum);
        assert!(norms.steps.minimum < norms.steps.optimal);
        assert!(norms.heart_rate.bradycardia < norms.heart_rate.optimal_min);
        assert!(norms.heart_rate.optimal_max < norms.heart_rate.tachycardia);
        assert!(norms.sleep.minimum < norms.sleep.maximum);
        assert!(norms.hydration.minimum < norms.hydration.optimal);
        assert!(norms.spo2.low < norms.spo2.normal_min);
        assert!(norms.temperature.hypothermia < norms.temperature.fever);
        assert!(norms.blood_pressure.systolic.normal_max < norms.blood_pressure.crisis_systolic);
    }
}
