//! Risk alert analysis over a record window.
//!
//! Unlike the single-day anomaly detector, which reads only the latest
//! values, this analyzer evaluates thresholds against metrics averaged over
//! a de-duplicated multi-day window (or a single specific day). The two
//! input modes are kept distinct on purpose; merging them would silently
//! change behavior.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HealthRsError, Result};
use crate::models::{dedupe_by_date, DailyRecord};
use crate::norms::HealthNorms;

/// Severity marker on an emitted alert line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Requires prompt action
    Critical,
    /// Worth attention
    Warning,
    /// Informational, emitted when nothing else fired
    Info,
}

/// One emitted alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
}

impl Alert {
    pub fn is_critical(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}

/// Severity of a structured risk factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Fixed risk-factor categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactorKind {
    SleepDeprivation,
    SleepInsufficient,
    SevereInactivity,
    LowActivity,
    HighStress,
    ModerateStress,
    Dehydration,
    CriticalOxygen,
    HighFever,
}

/// Structured risk factor with probability weight and suggested actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Risk category
    pub kind: RiskFactorKind,

    /// How severe the factor is
    pub severity: RiskSeverity,

    /// Human-readable description with the measured value
    pub description: String,

    /// Probability weight on a 0-100 scale
    pub probability: f64,

    /// Suggested mitigating actions
    pub actions: Vec<String>,
}

/// Urgency of an action, ordered by rank (critical first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    High,
    Medium,
    Low,
}

impl Urgency {
    /// Fixed sort rank: critical 0, high 1, medium 2, low 3
    pub fn rank(&self) -> u8 {
        match self {
            Urgency::Critical => 0,
            Urgency::High => 1,
            Urgency::Medium => 2,
            Urgency::Low => 3,
        }
    }
}

/// One prioritized action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPriority {
    /// What to do
    pub action: String,

    /// Risk category the action addresses
    pub category: RiskFactorKind,

    /// Sort urgency
    pub urgency: Urgency,

    /// Expected impact
    pub impact: String,
}

/// Global alert level for a window.
///
/// Display labels are the product's user-facing French strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl AlertLevel {
    /// Product-facing label
    pub fn label(&self) -> &'static str {
        match self {
            AlertLevel::Critical => "Critique",
            AlertLevel::High => "Élevé",
            AlertLevel::Moderate => "Modéré",
            AlertLevel::Low => "Faible",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How the window was selected and how its values are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum AnalysisMode {
    /// One specific deduplicated day; values are used directly
    SpecificDate { date: NaiveDate },

    /// Rolling window of `days` ending at the reference date; tracked
    /// metrics are averaged across the deduplicated window
    PeriodAverage { days: u32 },
}

/// Tracked-metric values the thresholds were evaluated against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAverages {
    pub steps: u32,
    pub sleep_hours: f64,
    pub heart_rate: u16,
    pub stress_score: u8,
    pub hydration_liters: f64,
}

/// Complete alert analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertReport {
    /// Subject the analysis covers
    pub subject: String,

    /// Global alert level
    pub alert_level: AlertLevel,

    /// Date range covered, for display
    pub analysis_period: String,

    /// "Averages over N days" or "Single day data"
    pub analysis_type: String,

    /// Number of deduplicated records analyzed
    pub data_points_analyzed: usize,

    /// Values the thresholds were evaluated against
    pub averages_computed: MetricAverages,

    /// Emitted alerts, in rule order
    pub alerts: Vec<Alert>,

    /// Structured risk factors, in rule order
    pub risk_factors: Vec<RiskFactor>,

    /// Actions sorted by urgency, critical-oxygen pinned first
    pub action_priorities: Vec<ActionPriority>,

    /// Recommended date for the next checkup
    pub next_checkup_recommended: NaiveDate,
}

/// Window-based risk alert analyzer
#[derive(Debug, Clone, Default)]
pub struct RiskAlertAnalyzer {
    norms: HealthNorms,
}

impl RiskAlertAnalyzer {
    /// Create an analyzer with the standard reference norms
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with custom reference norms
    pub fn with_norms(norms: HealthNorms) -> Self {
        RiskAlertAnalyzer { norms }
    }

    /// Analyze a fetched record window.
    ///
    /// `as_of` is the reference date the window ends at; checkup dates are
    /// computed relative to it. Fails with NotFound when the window is
    /// empty after de-duplication.
    pub fn analyze(
        &self,
        subject: &str,
        records: &[DailyRecord],
        mode: AnalysisMode,
        as_of: NaiveDate,
    ) -> Result<AlertReport> {
        let records = dedupe_by_date(records);

        let (period_start, period_end) = match mode {
            AnalysisMode::SpecificDate { date } => (date, date),
            AnalysisMode::PeriodAverage { days } => (
                as_of
                    .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
                    .unwrap_or(as_of),
                as_of,
            ),
        };

        if records.is_empty() {
            return Err(HealthRsError::not_found(subject, period_start, period_end));
        }

        // Scalar metrics: averaged over the window in period mode, read
        // directly from the single record otherwise.
        let (averages, analysis_type) = if records.len() > 1
            && matches!(mode, AnalysisMode::PeriodAverage { .. })
        {
            let n = records.len() as f64;
            let mean = |f: &dyn Fn(&DailyRecord) -> f64| -> f64 {
                records.iter().map(|r| f(r)).sum::<f64>() / n
            };
            (
                MetricAverages {
                    steps: mean(&|r| f64::from(r.snapshot.total_steps)).round() as u32,
                    sleep_hours: round1(mean(&|r| r.snapshot.total_sleep_hours)),
                    heart_rate: mean(&|r| f64::from(r.snapshot.avg_heart_rate)).round() as u16,
                    stress_score: mean(&|r| f64::from(r.snapshot.stress_score)).round() as u8,
                    hydration_liters: round1(mean(&|r| r.snapshot.total_hydration_liters)),
                },
                format!("Averages over {} days", records.len()),
            )
        } else {
            let single = &records[records.len() - 1].snapshot;
            (
                MetricAverages {
                    steps: single.total_steps,
                    sleep_hours: round1(single.total_sleep_hours),
                    heart_rate: single.avg_heart_rate,
                    stress_score: single.stress_score,
                    hydration_liters: round1(single.total_hydration_liters),
                },
                "Single day data".to_string(),
            )
        };

        let mut alerts = Vec::new();
        let mut risk_factors = Vec::new();
        let mut action_priorities = Vec::new();

        self.check_sleep(&averages, &mut alerts, &mut risk_factors, &mut action_priorities);
        self.check_activity(&averages, &mut alerts, &mut risk_factors, &mut action_priorities);
        self.check_stress(&averages, &mut alerts, &mut risk_factors, &mut action_priorities);
        self.check_hydration(&averages, &mut alerts, &mut risk_factors, &mut action_priorities);

        // Vital signs always read a single record: the most recent day of
        // the window, latest reading within it.
        let latest = &records[records.len() - 1].snapshot;
        self.check_vitals(latest, &mut alerts, &mut risk_factors, &mut action_priorities);

        let critical_count = alerts.iter().filter(|a| a.is_critical()).count();
        let alert_level = if critical_count > 0 {
            AlertLevel::Critical
        } else if alerts.len() >= 3 {
            AlertLevel::High
        } else if !alerts.is_empty() {
            AlertLevel::Moderate
        } else {
            alerts.push(Alert {
                severity: AlertSeverity::Info,
                message: "No critical alerts".to_string(),
            });
            AlertLevel::Low
        };

        // Deterministic ordering: stable sort by urgency rank, then pin any
        // critical-oxygen action to the front regardless of insertion order.
        action_priorities.sort_by_key(|a| a.urgency.rank());
        let (pinned, rest): (Vec<ActionPriority>, Vec<ActionPriority>) = action_priorities
            .into_iter()
            .partition(|a| a.category == RiskFactorKind::CriticalOxygen);
        let mut action_priorities = pinned;
        action_priorities.extend(rest);

        let checkup_days = if critical_count > 0 { 3 } else { 7 };
        let next_checkup_recommended = as_of
            .checked_add_days(Days::new(checkup_days))
            .unwrap_or(as_of);

        let analysis_period = match mode {
            AnalysisMode::SpecificDate { date } => format!("Date: {}", date),
            AnalysisMode::PeriodAverage { .. } => {
                format!("{} to {}", period_start, period_end)
            }
        };

        Ok(AlertReport {
            subject: subject.to_string(),
            alert_level,
            analysis_period,
            analysis_type,
            data_points_analyzed: records.len(),
            averages_computed: averages,
            alerts,
            risk_factors,
            action_priorities,
            next_checkup_recommended,
        })
    }

    fn check_sleep(
        &self,
        averages: &MetricAverages,
        alerts: &mut Vec<Alert>,
        risk_factors: &mut Vec<RiskFactor>,
        action_priorities: &mut Vec<ActionPriority>,
    ) {
        let sleep = averages.sleep_hours;
        if sleep < 6.0 {
            alerts.push(Alert {
                severity: AlertSeverity::Critical,
                message: "CRITICAL: Insufficient sleep (< 6h)".to_string(),
            });
            risk_factors.push(RiskFactor {
                kind: RiskFactorKind::SleepDeprivation,
                severity: RiskSeverity::High,
                description: format!("Sleeping {sleep}h (recommended: 7-9h)"),
                probability: 90.0,
                actions: vec![
                    "Go to bed one hour earlier".to_string(),
                    "Avoid screens after 10pm".to_string(),
                    "Build a bedtime routine".to_string(),
                ],
            });
            action_priorities.push(ActionPriority {
                action: "Increase sleep to 7-8h per night".to_string(),
                category: RiskFactorKind::SleepDeprivation,
                urgency: Urgency::High,
                impact: "90% risk reduction".to_string(),
            });
        } else if sleep < 7.0 {
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: "WARNING: Suboptimal sleep".to_string(),
            });
            risk_factors.push(RiskFactor {
                kind: RiskFactorKind::SleepInsufficient,
                severity: RiskSeverity::Medium,
                description: format!("Sleeping {sleep}h"),
                probability: 60.0,
                actions: vec!["Aim for 7-9h of sleep".to_string()],
            });
            action_priorities.push(ActionPriority {
                action: "Increase sleep to 7.5h".to_string(),
                category: RiskFactorKind::SleepInsufficient,
                urgency: Urgency::Medium,
                impact: "60% improvement".to_string(),
            });
        }
    }

    fn check_activity(
        &self,
        averages: &MetricAverages,
        alerts: &mut Vec<Alert>,
        risk_factors: &mut Vec<RiskFactor>,
        action_priorities: &mut Vec<ActionPriority>,
    ) {
        let steps = averages.steps;
        if steps < self.norms.steps.low {
            alerts.push(Alert {
                severity: AlertSeverity::Critical,
                message: "CRITICAL: Extreme sedentary behavior".to_string(),
            });
            risk_factors.push(RiskFactor {
                kind: RiskFactorKind::SevereInactivity,
                severity: RiskSeverity::High,
                description: format!(
                    "{steps} steps (recommended: {})",
                    self.norms.steps.optimal
                ),
                probability: 85.0,
                actions: vec![
                    "Walk 15 minutes after each meal".to_string(),
                    "Take the stairs".to_string(),
                    "Schedule a daily walk".to_string(),
                ],
            });
            action_priorities.push(ActionPriority {
                action: "Increase activity to 5000 steps/day".to_string(),
                category: RiskFactorKind::SevereInactivity,
                urgency: Urgency::High,
                impact: "85% risk reduction".to_string(),
            });
        } else if steps < self.norms.steps.minimum {
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: "WARNING: Insufficient activity".to_string(),
            });
            risk_factors.push(RiskFactor {
                kind: RiskFactorKind::LowActivity,
                severity: RiskSeverity::Medium,
                description: format!("{steps} steps (target: {})", self.norms.steps.optimal),
                probability: 65.0,
                actions: vec!["Build up gradually to 10000 steps".to_string()],
            });
            action_priorities.push(ActionPriority {
                action: "Increase to 8000 steps/day".to_string(),
                category: RiskFactorKind::LowActivity,
                urgency: Urgency::Medium,
                impact: "40% improvement".to_string(),
            });
        }
    }

    fn check_stress(
        &self,
        averages: &MetricAverages,
        alerts: &mut Vec<Alert>,
        risk_factors: &mut Vec<RiskFactor>,
        action_priorities: &mut Vec<ActionPriority>,
    ) {
        let stress = averages.stress_score;
        if stress >= 80 {
            alerts.push(Alert {
                severity: AlertSeverity::Critical,
                message: "CRITICAL: Very high stress".to_string(),
            });
            risk_factors.push(RiskFactor {
                kind: RiskFactorKind::HighStress,
                severity: RiskSeverity::High,
                description: format!("Stress at {stress}/100"),
                probability: 80.0,
                actions: vec![
                    "Practice deep breathing".to_string(),
                    "Meditate 10 minutes a day".to_string(),
                    "See a professional".to_string(),
                ],
            });
            action_priorities.push(ActionPriority {
                action: "Reduce stress below 60/100".to_string(),
                category: RiskFactorKind::HighStress,
                urgency: Urgency::High,
                impact: "80% risk reduction".to_string(),
            });
        } else if stress >= 60 {
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: "Moderate to high stress".to_string(),
            });
            risk_factors.push(RiskFactor {
                kind: RiskFactorKind::ModerateStress,
                severity: RiskSeverity::Medium,
                description: format!("Stress at {stress}/100"),
                probability: 60.0,
                actions: vec![
                    "Relaxation exercises".to_string(),
                    "Daily meditation".to_string(),
                ],
            });
            action_priorities.push(ActionPriority {
                action: "Daily stress-management techniques".to_string(),
                category: RiskFactorKind::ModerateStress,
                urgency: Urgency::Medium,
                impact: "60% risk reduction".to_string(),
            });
        }
    }

    fn check_hydration(
        &self,
        averages: &MetricAverages,
        alerts: &mut Vec<Alert>,
        risk_factors: &mut Vec<RiskFactor>,
        action_priorities: &mut Vec<ActionPriority>,
    ) {
        let hydration = averages.hydration_liters;
        if hydration < 1.0 {
            alerts.push(Alert {
                severity: AlertSeverity::Warning,
                message: "Probable dehydration".to_string(),
            });
            risk_factors.push(RiskFactor {
                kind: RiskFactorKind::Dehydration,
                severity: RiskSeverity::Medium,
                description: format!(
                    "{hydration}L (recommended: {}L)",
                    self.norms.hydration.optimal
                ),
                probability: 70.0,
                actions: vec!["Drink 2.5L of water per day".to_string()],
            });
            action_priorities.push(ActionPriority {
                action: "Increase hydration to 2.5L/day".to_string(),
                category: RiskFactorKind::Dehydration,
                urgency: Urgency::Medium,
                impact: "70% risk reduction".to_string(),
            });
        }
    }

    fn check_vitals(
        &self,
        latest: &crate::models::BiometricSnapshot,
        alerts: &mut Vec<Alert>,
        risk_factors: &mut Vec<RiskFactor>,
        action_priorities: &mut Vec<ActionPriority>,
    ) {
        if let Some(spo2) = latest.latest_spo2() {
            if spo2 < self.norms.spo2.low {
                alerts.push(Alert {
                    severity: AlertSeverity::Critical,
                    message: "EMERGENCY: Critical SpO2 (< 90%)".to_string(),
                });
                risk_factors.push(RiskFactor {
                    kind: RiskFactorKind::CriticalOxygen,
                    severity: RiskSeverity::Critical,
                    description: format!("SpO2 at {spo2}%"),
                    probability: 100.0,
                    actions: vec!["CALL EMERGENCY SERVICES IMMEDIATELY".to_string()],
                });
                // Medical emergency: this entry outranks everything and is
                // re-pinned to the front even if a later sort reorders it.
                action_priorities.insert(
                    0,
                    ActionPriority {
                        action: "See a doctor IMMEDIATELY".to_string(),
                        category: RiskFactorKind::CriticalOxygen,
                        urgency: Urgency::Critical,
                        impact: "Vital".to_string(),
                    },
                );
            }
        }

        if let Some(temp) = latest.latest_temperature() {
            if temp >= 39.0 {
                alerts.push(Alert {
                    severity: AlertSeverity::Critical,
                    message: "High fever detected".to_string(),
                });
                risk_factors.push(RiskFactor {
                    kind: RiskFactorKind::HighFever,
                    severity: RiskSeverity::High,
                    description: format!("Temperature at {temp}°C"),
                    probability: 80.0,
                    actions: vec![
                        "See a doctor within 24h".to_string(),
                        "Antipyretics as prescribed".to_string(),
                        "Drink plenty of fluids".to_string(),
                    ],
                });
                action_priorities.push(ActionPriority {
                    action: "Medical consultation and fever treatment".to_string(),
                    category: RiskFactorKind::HighFever,
                    urgency: Urgency::High,
                    impact: "80% risk reduction".to_string(),
                });
            }
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
