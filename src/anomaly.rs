//! Single-day anomaly detection and risk classification.
//!
//! Every rule is evaluated independently against fixed medical thresholds;
//! rules are not mutually exclusive across categories. Emission order is
//! fixed (heart rate, sleep, hydration, stress, SpO2, temperature, blood
//! pressure, steps) so output is deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::BiometricSnapshot;
use crate::norms::HealthNorms;

/// How severe a detected anomaly is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    /// Out of range, worth attention
    Warning,
    /// Medically urgent
    Critical,
}

/// Fixed anomaly categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Bradycardia,
    Tachycardia,
    SleepDeprivation,
    Hypersomnia,
    Dehydration,
    CriticalStress,
    SevereHypoxia,
    LowOxygenation,
    Fever,
    Hypothermia,
    HypertensiveCrisis,
    Hypertension,
    Hypotension,
    ExtremeSedentarism,
}

/// One detected anomaly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Anomaly category
    pub kind: AnomalyKind,

    /// Severity marker; critical anomalies force the Critical risk level
    pub severity: AnomalySeverity,

    /// Human-readable description with the measured value
    pub message: String,
}

impl Anomaly {
    pub fn is_critical(&self) -> bool {
        self.severity == AnomalySeverity::Critical
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Threshold-based anomaly detector
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    norms: HealthNorms,
}

impl AnomalyDetector {
    /// Create a detector with the standard reference norms
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom reference norms
    pub fn with_norms(norms: HealthNorms) -> Self {
        AnomalyDetector { norms }
    }

    /// Evaluate all rules against one snapshot, in fixed category order
    pub fn detect(&self, snapshot: &BiometricSnapshot) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        // Heart rate
        let hr = snapshot.avg_heart_rate;
        if hr < self.norms.heart_rate.bradycardia {
            anomalies.push(warning(
                AnomalyKind::Bradycardia,
                format!("Bradycardia detected (heart rate < {} bpm)", self.norms.heart_rate.bradycardia),
            ));
        } else if hr > self.norms.heart_rate.tachycardia {
            anomalies.push(warning(
                AnomalyKind::Tachycardia,
                format!("Tachycardia detected (heart rate > {} bpm)", self.norms.heart_rate.tachycardia),
            ));
        }

        // Sleep
        let sleep = snapshot.total_sleep_hours;
        if sleep < 5.0 {
            anomalies.push(warning(
                AnomalyKind::SleepDeprivation,
                "Severe sleep deprivation (< 5h)".to_string(),
            ));
        } else if sleep > 12.0 {
            anomalies.push(warning(
                AnomalyKind::Hypersomnia,
                "Hypersomnia detected (> 12h)".to_string(),
            ));
        }

        // Hydration
        if snapshot.total_hydration_liters < 1.0 {
            anomalies.push(warning(
                AnomalyKind::Dehydration,
                "Possible dehydration (< 1L)".to_string(),
            ));
        }

        // Stress
        if snapshot.stress_score >= 80 {
            anomalies.push(warning(
                AnomalyKind::CriticalStress,
                "Critical stress level (>= 80/100)".to_string(),
            ));
        }

        // Oxygen saturation, latest reading only
        if let Some(spo2) = snapshot.latest_spo2() {
            if spo2 < self.norms.spo2.low {
                anomalies.push(critical(
                    AnomalyKind::SevereHypoxia,
                    format!("ALERT: severe hypoxia (SpO2 < {}%)", self.norms.spo2.low),
                ));
            } else if spo2 < self.norms.spo2.normal_min {
                anomalies.push(warning(
                    AnomalyKind::LowOxygenation,
                    format!("Suboptimal oxygenation (SpO2 < {}%)", self.norms.spo2.normal_min),
                ));
            }
        }

        // Temperature, latest reading only
        if let Some(temp) = snapshot.latest_temperature() {
            if temp >= self.norms.temperature.fever {
                anomalies.push(warning(
                    AnomalyKind::Fever,
                    format!("Fever detected ({temp:.1}°C)"),
                ));
            } else if temp < self.norms.temperature.hypothermia {
                anomalies.push(warning(
                    AnomalyKind::Hypothermia,
                    format!("Hypothermia ({temp:.1}°C)"),
                ));
            }
        }

        // Blood pressure, latest reading only
        if let Some(bp) = snapshot.latest_blood_pressure() {
            let norms = self.norms.blood_pressure;
            if bp.systolic >= norms.crisis_systolic || bp.diastolic >= norms.crisis_diastolic {
                anomalies.push(critical(
                    AnomalyKind::HypertensiveCrisis,
                    format!(
                        "EMERGENCY: hypertensive crisis (BP >= {}/{})",
                        norms.crisis_systolic, norms.crisis_diastolic
                    ),
                ));
            } else if bp.systolic >= norms.systolic.high || bp.diastolic >= norms.diastolic.high {
                anomalies.push(warning(
                    AnomalyKind::Hypertension,
                    format!("Hypertension ({}/{})", bp.systolic, bp.diastolic),
                ));
            } else if bp.systolic < norms.low_systolic || bp.diastolic < norms.low_diastolic {
                anomalies.push(warning(
                    AnomalyKind::Hypotension,
                    format!("Hypotension ({}/{})", bp.systolic, bp.diastolic),
                ));
            }
        }

        // Activity
        if snapshot.total_steps < 1000 {
            anomalies.push(warning(
                AnomalyKind::ExtremeSedentarism,
                "Extreme sedentarism (< 1000 steps)".to_string(),
            ));
        }

        anomalies
    }
}

fn warning(kind: AnomalyKind, message: String) -> Anomaly {
    Anomaly {
        kind,
        severity: AnomalySeverity::Warning,
        message,
    }
}

fn critical(kind: AnomalyKind, message: String) -> Anomaly {
    Anomaly {
        kind,
        severity: AnomalySeverity::Critical,
        message,
    }
}

/// Overall risk level for a single-day analysis.
///
/// Display labels are the product's user-facing French strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Classify from composite score and detected anomalies.
    ///
    /// Any critical anomaly forces Critical regardless of score.
    pub fn classify(health_score: f64, anomalies: &[Anomaly]) -> Self {
        if anomalies.iter().any(Anomaly::is_critical) || health_score < 40.0 {
            RiskLevel::Critical
        } else if health_score < 60.0 {
            RiskLevel::High
        } else if health_score < 75.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    /// Product-facing label
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "Critique",
            RiskLevel::High => "Élevé",
            RiskLevel::Moderate => "Modéré",
            RiskLevel::Low => "Faible",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
