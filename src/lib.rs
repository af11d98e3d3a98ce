// Library interface for the healthrs analysis engine
// Allows integration tests and service binaries to access core functionality

pub mod alerts;
pub mod analysis;
pub mod anomaly;
pub mod classifier;
pub mod config;
pub mod database;
pub mod error;
pub mod explain;
pub mod goals;
pub mod import;
pub mod logging;
pub mod models;
pub mod norms;
pub mod recommendations;
pub mod scoring;
pub mod trends;

// Re-export commonly used types for convenience
pub use alerts::{AlertLevel, AlertReport, AnalysisMode, RiskAlertAnalyzer};
pub use analysis::{DailyAnalyzer, HealthAnalysis, HealthSummary};
pub use anomaly::{Anomaly, AnomalyDetector, RiskLevel};
pub use error::{HealthRsError, Result};
pub use goals::{Difficulty, GoalGenerator, GoalPlan, GoalPreferences};
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use models::{BiometricSnapshot, DailyRecord};
pub use norms::HealthNorms;
pub use scoring::{HealthScore, HealthScorer, ScoreBreakdown};
pub use trends::{TrendAnalyzer, TrendDirection, TrendReport};
