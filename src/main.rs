use anyhow::{anyhow, Context, Result};
use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use healthrs::alerts::{AnalysisMode, RiskAlertAnalyzer};
use healthrs::analysis::DailyAnalyzer;
use healthrs::config::AppConfig;
use healthrs::database::{Database, SnapshotStore};
use healthrs::goals::{Difficulty, GoalCategory, GoalGenerator, GoalPreferences};
use healthrs::import::RecordImporter;
use healthrs::logging::{init_logging, LogLevel};
use healthrs::scoring::ScoreCategory;
use healthrs::trends::TrendAnalyzer;

/// HealthRS - Biometric Health Analysis CLI
///
/// Analyzes per-day biometric records to produce composite health scores,
/// anomaly and risk alerts, multi-day trends, and personalized goals.
#[derive(Parser)]
#[command(name = "healthrs")]
#[command(author = "HealthRS Contributors")]
#[command(version)]
#[command(about = "Biometric Health Analysis CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subject identifier; falls back to the configured default
    #[arg(short, long)]
    subject: Option<String>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import daily records from a JSON or CSV file
    Import {
        /// Input file path
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Run the single-day analysis (score, risk, anomalies, recommendations)
    Analyze {
        /// Day to analyze (YYYY-MM-DD); defaults to the latest record
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Analyze multi-day trends
    Trends {
        /// History window in days
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Generate risk alerts over a period or for one day
    Alerts {
        /// Rolling window in days, ending today
        #[arg(short, long)]
        period_days: Option<u32>,

        /// Analyze one specific day instead of a period
        #[arg(long, conflicts_with = "period_days")]
        date: Option<NaiveDate>,
    },

    /// Generate personalized SMART goals
    Goals {
        /// Goal categories (activity, sleep, hydration, stress, cardiovascular)
        #[arg(short, long, value_delimiter = ',')]
        goals: Vec<GoalCategory>,

        /// Days to reach the targets (2-90)
        #[arg(short, long)]
        timeframe: Option<u32>,

        /// Difficulty: easy, moderate, challenging
        #[arg(short = 'D', long, default_value = "moderate")]
        difficulty: Difficulty,
    },

    /// Dashboard summary from the latest record
    Summary,
}

#[derive(Tabled)]
struct BreakdownRow {
    category: ScoreCategory,
    score: f64,
    max: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };

    let mut log_config = config.logging.clone();
    log_config.level = match cli.verbose {
        0 => log_config.level,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    init_logging(&log_config)?;

    std::fs::create_dir_all(&config.settings.data_dir)
        .with_context(|| format!("Failed to create {}", config.settings.data_dir.display()))?;
    let db = Database::new(config.database_path())?;

    let today = Local::now().date_naive();

    match cli.command {
        Commands::Import { file } => {
            println!("{}", "Importing daily records...".green().bold());
            let summary = RecordImporter::new(&db).import_file(&file)?;
            println!(
                "{}",
                format!(
                    "✓ Imported {} records ({} skipped)",
                    summary.imported, summary.skipped
                )
                .green()
            );
        }

        Commands::Analyze { date } => {
            let subject = resolve_subject(&cli.subject, &config)?;
            let record = match date {
                Some(date) => db
                    .daily_window(&subject, date, date)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow!("No record for {} on {}", subject, date))?,
                None => db
                    .latest(&subject)?
                    .ok_or_else(|| anyhow!("No records for {}", subject))?,
            };

            let analysis = DailyAnalyzer::new().analyze(&record.snapshot);

            println!(
                "{}",
                format!("Health analysis for {} on {}", subject, record.date)
                    .blue()
                    .bold()
            );
            println!(
                "  Score: {}  Risk: {}",
                format!("{:.1}/100", analysis.health_score).bold(),
                analysis.risk_level.label().bold()
            );

            let rows: Vec<BreakdownRow> = ScoreCategory::ALL
                .iter()
                .map(|category| BreakdownRow {
                    category: *category,
                    score: analysis.insights.score_breakdown.get(*category),
                    max: category.max_points(),
                })
                .collect();
            println!("{}", Table::new(rows));

            if !analysis.anomalies.is_empty() {
                println!("{}", "Anomalies:".yellow().bold());
                for anomaly in &analysis.anomalies {
                    println!("  - {}", anomaly.message);
                }
            }
            println!("{}", "Recommendations:".cyan().bold());
            for recommendation in &analysis.recommendations {
                println!("  - {}", recommendation);
            }
            println!("\n{}", analysis.explanation);
        }

        Commands::Trends { days } => {
            let subject = resolve_subject(&cli.subject, &config)?;
            let days = days.unwrap_or(config.analysis.trend_days);

            // cover exactly `days` complete days, ending yesterday
            let end = today.pred_opt().unwrap_or(today);
            let start = today
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(today);
            let records = db.daily_window(&subject, start, end)?;

            let report = TrendAnalyzer::new().analyze(&subject, &records, days)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Alerts { period_days, date } => {
            let subject = resolve_subject(&cli.subject, &config)?;
            let (mode, records) = match date {
                Some(date) => (
                    AnalysisMode::SpecificDate { date },
                    db.daily_window(&subject, date, date)?,
                ),
                None => {
                    let days = period_days.unwrap_or(config.analysis.alert_period_days);
                    let start = today
                        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
                        .unwrap_or(today);
                    (
                        AnalysisMode::PeriodAverage { days },
                        db.daily_window(&subject, start, today)?,
                    )
                }
            };

            let report = RiskAlertAnalyzer::new().analyze(&subject, &records, mode, today)?;
            println!(
                "{}",
                format!("Alert level: {}", report.alert_level.label())
                    .yellow()
                    .bold()
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Goals {
            goals,
            timeframe,
            difficulty,
        } => {
            let subject = resolve_subject(&cli.subject, &config)?;
            let preferences = GoalPreferences {
                goals: if goals.is_empty() {
                    GoalPreferences::default().goals
                } else {
                    goals
                },
                timeframe_days: timeframe.unwrap_or(config.analysis.goal_timeframe_days),
                difficulty,
            };

            let start = today
                .checked_sub_days(Days::new(u64::from(preferences.timeframe_days)))
                .unwrap_or(today);
            let records = db.daily_window(&subject, start, today)?;

            let plan = GoalGenerator::new().generate(&subject, &records, &preferences)?;
            println!(
                "{}",
                format!(
                    "{} goals, projected score {:.1}",
                    plan.total_goals, plan.projected_health_score
                )
                .green()
                .bold()
            );
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }

        Commands::Summary => {
            let subject = resolve_subject(&cli.subject, &config)?;
            let latest = db
                .latest(&subject)?
                .ok_or_else(|| anyhow!("No records for {}", subject))?;

            // seven complete days of history for the evolution direction
            let end = today.pred_opt().unwrap_or(today);
            let start = today.checked_sub_days(Days::new(7)).unwrap_or(today);
            let history = db.daily_window(&subject, start, end)?;
            let scorer = healthrs::scoring::HealthScorer::new();
            let score_history: Vec<f64> = history
                .iter()
                .map(|r| scorer.calculate(&r.snapshot).total_score)
                .collect();

            let summary = DailyAnalyzer::new().summarize(&latest, &score_history);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn resolve_subject(cli_subject: &Option<String>, config: &AppConfig) -> Result<String> {
    cli_subject
        .clone()
        .or_else(|| config.settings.default_subject.clone())
        .ok_or_else(|| anyhow!("No subject given; pass --subject or set default_subject"))
}
