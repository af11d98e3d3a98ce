//! Single-day analysis composition.
//!
//! Ties the scorer, anomaly detector, risk classifier, recommendation engine
//! and explainer together into the report shape callers consume, and builds
//! the dashboard summary from a subject's latest record plus a short score
//! history.

use serde::{Deserialize, Serialize};

use crate::anomaly::{Anomaly, AnomalyDetector, RiskLevel};
use crate::explain::Explainer;
use crate::models::{BiometricSnapshot, DailyRecord};
use crate::recommendations::RecommendationEngine;
use crate::scoring::{HealthScorer, ScoreBreakdown};

/// Activity details surfaced in the insights block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInsights {
    pub steps: u32,
    pub distance_km: f64,
    pub exercise_count: usize,
}

/// Cardiovascular details surfaced in the insights block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardiovascularInsights {
    pub avg_heart_rate: u16,
    pub hr_variability: u16,
}

/// Sleep details surfaced in the insights block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepInsights {
    pub hours: f64,
    pub quality: String,
}

/// Stress details surfaced in the insights block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressInsights {
    pub level: String,
    pub score: u8,
}

/// Structured detail block accompanying a single-day analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInsights {
    pub score_breakdown: ScoreBreakdown,
    pub activity_details: ActivityInsights,
    pub cardiovascular_details: CardiovascularInsights,
    pub sleep_details: SleepInsights,
    pub stress_details: StressInsights,
}

/// Complete single-day analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAnalysis {
    /// Composite 0-100 score
    pub health_score: f64,

    /// Overall risk classification
    pub risk_level: RiskLevel,

    /// Detected anomalies in fixed category order
    pub anomalies: Vec<Anomaly>,

    /// Up to ten prioritized recommendations
    pub recommendations: Vec<String>,

    /// Structured details backing the score
    pub insights: HealthInsights,

    /// Narrative explanation of the result
    pub explanation: String,
}

/// Direction of a subject's recent score evolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDirection {
    Improving,
    Declining,
    Stable,
    InsufficientData,
}

/// Recent score evolution for the dashboard summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvolution {
    /// First-to-last score change over the history window
    pub score_change: f64,

    /// Classified direction of the change
    pub direction: ScoreDirection,
}

/// Dashboard summary built from the latest record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub score: f64,
    pub risk_level: RiskLevel,
    pub breakdown: ScoreBreakdown,
    pub evolution: ScoreEvolution,
    pub top_recommendations: Vec<String>,
    pub anomaly_count: usize,
}

/// Facade over the single-day analysis pipeline
#[derive(Debug, Clone, Default)]
pub struct DailyAnalyzer {
    scorer: HealthScorer,
    detector: AnomalyDetector,
    recommender: RecommendationEngine,
    explainer: Explainer,
}

impl DailyAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the full single-day pipeline on one snapshot
    pub fn analyze(&self, snapshot: &BiometricSnapshot) -> HealthAnalysis {
        let score = self.scorer.calculate(snapshot);
        let anomalies = self.detector.detect(snapshot);
        let risk_level = RiskLevel::classify(score.total_score, &anomalies);
        let recommendations = self.recommender.generate(snapshot, &score.breakdown);
        let explanation = self.explainer.explain(snapshot, &score, risk_level);

        let sleep_quality = if snapshot.total_sleep_hours >= 7.0 && snapshot.total_sleep_hours <= 9.0
        {
            "Optimal"
        } else {
            "Needs improvement"
        };

        HealthAnalysis {
            health_score: score.total_score,
            risk_level,
            anomalies,
            recommendations,
            insights: HealthInsights {
                score_breakdown: score.breakdown,
                activity_details: ActivityInsights {
                    steps: snapshot.total_steps,
                    distance_km: snapshot.total_distance_km,
                    exercise_count: snapshot.exercise.len(),
                },
                cardiovascular_details: CardiovascularInsights {
                    avg_heart_rate: snapshot.avg_heart_rate,
                    hr_variability: snapshot.heart_rate_spread(),
                },
                sleep_details: SleepInsights {
                    hours: snapshot.total_sleep_hours,
                    quality: sleep_quality.to_string(),
                },
                stress_details: StressInsights {
                    level: snapshot.stress_level.clone(),
                    score: snapshot.stress_score,
                },
            },
            explanation,
        }
    }

    /// Build the dashboard summary from the latest record and a recent score
    /// history (typically the last seven days, oldest first).
    pub fn summarize(&self, latest: &DailyRecord, score_history: &[f64]) -> HealthSummary {
        let analysis = self.analyze(&latest.snapshot);

        let evolution = if score_history.len() >= 2 {
            let change = score_history[score_history.len() - 1] - score_history[0];
            let direction = if change > 2.0 {
                ScoreDirection::Improving
            } else if change < -2.0 {
                ScoreDirection::Declining
            } else {
                ScoreDirection::Stable
            };
            ScoreEvolution {
                score_change: (change * 10.0).round() / 10.0,
                direction,
            }
        } else {
            ScoreEvolution {
                score_change: 0.0,
                direction: ScoreDirection::InsufficientData,
            }
        };

        let mut top_recommendations = analysis.recommendations;
        top_recommendations.truncate(5);

        HealthSummary {
            score: analysis.health_score,
            risk_level: analysis.risk_level,
            breakdown: analysis.insights.score_breakdown,
            evolution,
            top_recommendations,
            anomaly_count: analysis.anomalies.len(),
        }
    }
}
