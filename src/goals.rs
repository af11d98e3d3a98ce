//! SMART goal generation.
//!
//! Derives personalized targets from window averages, a difficulty
//! multiplier and a timeframe. Target tables are fixed product constants;
//! the band boundaries are reproduced exactly and are not tunable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HealthRsError, Result};
use crate::models::{dedupe_by_date, DailyRecord};
use crate::scoring::HealthScorer;

/// Goal difficulty and its target multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Challenging,
}

impl Difficulty {
    /// Multiplier applied to the current value when deriving a target
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.1,
            Difficulty::Moderate => 1.25,
            Difficulty::Challenging => 1.5,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Moderate => "moderate",
            Difficulty::Challenging => "challenging",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "moderate" => Ok(Difficulty::Moderate),
            "challenging" => Ok(Difficulty::Challenging),
            _ => Err(format!("Invalid difficulty: {}", s)),
        }
    }
}

/// Goal categories a subject can opt into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Activity,
    Sleep,
    Hydration,
    Stress,
    Cardiovascular,
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GoalCategory::Activity => "activity",
            GoalCategory::Sleep => "sleep",
            GoalCategory::Hydration => "hydration",
            GoalCategory::Stress => "stress",
            GoalCategory::Cardiovascular => "cardiovascular",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for GoalCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "activity" => Ok(GoalCategory::Activity),
            "sleep" => Ok(GoalCategory::Sleep),
            "hydration" => Ok(GoalCategory::Hydration),
            "stress" => Ok(GoalCategory::Stress),
            "cardiovascular" => Ok(GoalCategory::Cardiovascular),
            _ => Err(format!("Invalid goal category: {}", s)),
        }
    }
}

/// Goal priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    High,
    Medium,
    Low,
}

/// Subject preferences for goal generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPreferences {
    /// Requested goal categories, generated in request order
    pub goals: Vec<GoalCategory>,

    /// Days to reach the targets, 2-90
    pub timeframe_days: u32,

    /// Target difficulty
    pub difficulty: Difficulty,
}

impl Default for GoalPreferences {
    fn default() -> Self {
        GoalPreferences {
            goals: vec![
                GoalCategory::Activity,
                GoalCategory::Sleep,
                GoalCategory::Hydration,
            ],
            timeframe_days: 7,
            difficulty: Difficulty::Moderate,
        }
    }
}

/// Intermediate checkpoint on the way to a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Day offset from the start of the plan
    pub day: u32,

    /// Interpolated target value at that day
    pub target: f64,

    /// Checkpoint description
    pub description: String,
}

/// One generated SMART goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub category: GoalCategory,
    pub title: String,

    /// Current value (window mean)
    pub current: f64,

    /// Target value at the end of the timeframe
    pub target: f64,

    /// Days allotted to reach the target
    pub timeframe_days: u32,

    pub priority: GoalPriority,
    pub tips: Vec<String>,
    pub milestones: Vec<Milestone>,

    /// Health-score points the goal is expected to add once reached
    pub expected_improvement: f64,
}

/// Complete goal-generation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPlan {
    pub subject: String,
    pub total_goals: usize,
    pub high_priority_count: usize,
    pub timeframe_days: u32,
    pub difficulty: Difficulty,

    /// Sum of expected improvements across goals
    pub estimated_improvement: f64,

    /// Mean historical health score over the window
    pub average_current_health_score: f64,

    /// Average score plus estimated improvement, capped at 100
    pub projected_health_score: f64,

    pub goals: Vec<Goal>,
}

/// Expected score improvements per category, fixed product constants
const ACTIVITY_IMPROVEMENT: f64 = 15.0;
const SLEEP_IMPROVEMENT: f64 = 12.0;
const HYDRATION_IMPROVEMENT: f64 = 5.0;
const STRESS_IMPROVEMENT: f64 = 8.0;
const CARDIO_IMPROVEMENT: f64 = 10.0;

/// Window-average goal generator
#[derive(Debug, Clone, Default)]
pub struct GoalGenerator {
    scorer: HealthScorer,
}

impl GoalGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a goal plan from a fetched record window.
    ///
    /// Fails with InvalidArgument when the timeframe is under two days and
    /// NotFound when the window is empty after de-duplication.
    pub fn generate(
        &self,
        subject: &str,
        records: &[DailyRecord],
        preferences: &GoalPreferences,
    ) -> Result<GoalPlan> {
        if preferences.timeframe_days < 2 {
            return Err(HealthRsError::invalid_argument(
                "timeframe_days",
                "must be at least 2",
            ));
        }
        if preferences.timeframe_days > 90 {
            return Err(HealthRsError::invalid_argument(
                "timeframe_days",
                "must be at most 90",
            ));
        }

        let records = dedupe_by_date(records);
        if records.is_empty() {
            return Err(HealthRsError::not_found(subject, "-", "-"));
        }

        let n = records.len() as f64;
        let avg_steps =
            records.iter().map(|r| f64::from(r.snapshot.total_steps)).sum::<f64>() / n;
        let avg_sleep =
            records.iter().map(|r| r.snapshot.total_sleep_hours).sum::<f64>() / n;
        let avg_hydration =
            records.iter().map(|r| r.snapshot.total_hydration_liters).sum::<f64>() / n;
        let avg_stress =
            records.iter().map(|r| f64::from(r.snapshot.stress_score)).sum::<f64>() / n;
        let avg_hr =
            records.iter().map(|r| f64::from(r.snapshot.avg_heart_rate)).sum::<f64>() / n;

        let days = preferences.timeframe_days;
        let multiplier = preferences.difficulty.multiplier();

        let mut goals = Vec::new();
        for category in &preferences.goals {
            let goal = match category {
                GoalCategory::Activity => self.activity_goal(avg_steps, multiplier, days),
                GoalCategory::Sleep => self.sleep_goal(avg_sleep, days),
                GoalCategory::Hydration => self.hydration_goal(avg_hydration, days),
                GoalCategory::Stress => self.stress_goal(avg_stress, days),
                GoalCategory::Cardiovascular => self.cardiovascular_goal(avg_hr, days),
            };
            goals.push(goal);
        }

        let estimated_improvement: f64 = goals.iter().map(|g| g.expected_improvement).sum();
        let high_priority_count = goals
            .iter()
            .filter(|g| g.priority == GoalPriority::High)
            .count();

        let average_current_health_score = records
            .iter()
            .map(|r| self.scorer.calculate(&r.snapshot).total_score)
            .sum::<f64>()
            / n;
        let average_current_health_score = round1(average_current_health_score);
        let projected_health_score =
            round1((average_current_health_score + estimated_improvement).min(100.0));

        Ok(GoalPlan {
            subject: subject.to_string(),
            total_goals: goals.len(),
            high_priority_count,
            timeframe_days: days,
            difficulty: preferences.difficulty,
            estimated_improvement: round1(estimated_improvement),
            average_current_health_score,
            projected_health_score,
            goals,
        })
    }

    /// Step target: multiplier applied to the current average, capped by
    /// the band ceiling (5000 / 10000 / 12000 depending on the start)
    fn activity_goal(&self, avg_steps: f64, multiplier: f64, days: u32) -> Goal {
        let current = avg_steps.round();
        let cap = if current < 5_000.0 {
            5_000.0
        } else if current < 8_000.0 {
            10_000.0
        } else {
            12_000.0
        };
        let target = (current * multiplier).min(cap).floor();

        let milestones = [days / 3, 2 * days / 3, days]
            .into_iter()
            .filter(|day| *day > 0)
            .map(|day| {
                let value = interpolate(current, target, day, days).round();
                Milestone {
                    day,
                    target: value,
                    description: format!("Reach {} steps", value as i64),
                }
            })
            .collect();

        Goal {
            category: GoalCategory::Activity,
            title: format!("Reach {} steps per day", target as i64),
            current,
            target,
            timeframe_days: days,
            priority: if current < 5_000.0 {
                GoalPriority::High
            } else {
                GoalPriority::Medium
            },
            tips: vec![
                "Walk 10 minutes after each meal".to_string(),
                "Take the stairs instead of the elevator".to_string(),
                "Get off the bus one stop early".to_string(),
                "Take a morning or evening walk".to_string(),
            ],
            milestones,
            expected_improvement: ACTIVITY_IMPROVEMENT,
        }
    }

    /// Sleep target from fixed bands: short sleepers aim for 7.5h, long
    /// sleepers come back to 8.5h, everyone else consolidates at 8h
    fn sleep_goal(&self, avg_sleep: f64, days: u32) -> Goal {
        let current = round1(avg_sleep);
        let (target, priority) = if current < 7.0 {
            (7.5, GoalPriority::High)
        } else if current > 9.0 {
            (8.5, GoalPriority::Medium)
        } else {
            (8.0, GoalPriority::Low)
        };

        let midpoint = round1((current + target) / 2.0);
        let milestones = vec![
            Milestone {
                day: days / 2,
                target: midpoint,
                description: format!("Reach {midpoint:.1}h"),
            },
            Milestone {
                day: days,
                target,
                description: format!("Reach {target:.1}h"),
            },
        ];

        Goal {
            category: GoalCategory::Sleep,
            title: format!("Sleep {target:.1}h per night"),
            current,
            target,
            timeframe_days: days,
            priority,
            tips: vec![
                "Go to bed at a fixed time (10-11pm)".to_string(),
                "Avoid screens for an hour before bed".to_string(),
                "Keep the bedroom cool (18-20°C)".to_string(),
                "No caffeine after 4pm".to_string(),
                "Relaxing routine: reading, meditation".to_string(),
            ],
            milestones,
            expected_improvement: SLEEP_IMPROVEMENT,
        }
    }

    /// Hydration target is always 2.5L; only the priority depends on the
    /// starting point
    fn hydration_goal(&self, avg_hydration: f64, days: u32) -> Goal {
        let current = round1(avg_hydration);
        let target = 2.5;
        let priority = if current < 1.5 {
            GoalPriority::High
        } else if current < 2.0 {
            GoalPriority::Medium
        } else {
            GoalPriority::Low
        };

        let milestones = vec![
            Milestone {
                day: days / 3,
                target: round1(current + (target - current) / 3.0),
                description: "First checkpoint".to_string(),
            },
            Milestone {
                day: days,
                target,
                description: format!("Reach {target}L per day"),
            },
        ];

        Goal {
            category: GoalCategory::Hydration,
            title: format!("Drink {target}L of water per day"),
            current,
            target,
            timeframe_days: days,
            priority,
            tips: vec![
                "Drink a glass when you wake up".to_string(),
                "Keep a bottle with you".to_string(),
                "Drink before every meal".to_string(),
                "One glass every 2 hours".to_string(),
                "Herbal teas count".to_string(),
            ],
            milestones,
            expected_improvement: HYDRATION_IMPROVEMENT,
        }
    }

    /// Stress target from fixed bands keyed on the current score
    fn stress_goal(&self, avg_stress: f64, days: u32) -> Goal {
        let current = avg_stress.round();
        let (target, priority) = if current >= 70.0 {
            (50.0, GoalPriority::High)
        } else if current >= 50.0 {
            (40.0, GoalPriority::Medium)
        } else {
            (30.0, GoalPriority::Low)
        };

        let midpoint = ((current + target) / 2.0).round();
        let milestones = vec![
            Milestone {
                day: days / 2,
                target: midpoint,
                description: format!("Reduce to {}/100", midpoint as i64),
            },
            Milestone {
                day: days,
                target,
                description: format!("Reach {}/100", target as i64),
            },
        ];

        Goal {
            category: GoalCategory::Stress,
            title: format!("Reduce stress to {}/100", target as i64),
            current,
            target,
            timeframe_days: days,
            priority,
            tips: vec![
                "Guided meditation (10 min/day)".to_string(),
                "Deep-breathing exercises".to_string(),
                "Yoga or stretching".to_string(),
                "Regular physical activity".to_string(),
                "Limit screen time".to_string(),
                "Make time for relaxing hobbies".to_string(),
            ],
            milestones,
            expected_improvement: STRESS_IMPROVEMENT,
        }
    }

    /// Heart-rate target from fixed bands; unusually low resting rates get
    /// a conservative target and a consult recommendation
    fn cardiovascular_goal(&self, avg_hr: f64, days: u32) -> Goal {
        let current = avg_hr.round();
        let (target, priority, tips) = if current > 85.0 {
            (
                75.0,
                GoalPriority::High,
                vec![
                    "Cardio sessions 3x per week (30 min)".to_string(),
                    "Daily brisk walking".to_string(),
                    "Swimming or cycling".to_string(),
                    "Cut back on caffeine and stress".to_string(),
                ],
            )
        } else if current < 55.0 {
            (
                65.0,
                GoalPriority::Medium,
                vec![
                    "See a doctor".to_string(),
                    "Regular moderate exercise".to_string(),
                ],
            )
        } else {
            (
                70.0,
                GoalPriority::Low,
                vec![
                    "Keep exercising regularly".to_string(),
                    "Balanced diet".to_string(),
                ],
            )
        };

        Goal {
            category: GoalCategory::Cardiovascular,
            title: format!("Stabilize average heart rate at {} bpm", target as i64),
            current,
            target,
            timeframe_days: days,
            priority,
            tips,
            milestones: vec![Milestone {
                day: days,
                target,
                description: format!("Heart rate steady at {} bpm", target as i64),
            }],
            expected_improvement: CARDIO_IMPROVEMENT,
        }
    }
}

/// Linear interpolation from current to target at `day` of `days`
fn interpolate(current: f64, target: f64, day: u32, days: u32) -> f64 {
    current + (target - current) * f64::from(day) / f64::from(days)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BiometricSnapshot;
    use chrono::{Days, NaiveDate};

    fn window(snapshots: Vec<BiometricSnapshot>) -> Vec<DailyRecord> {
        let start = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        snapshots
            .into_iter()
            .enumerate()
            .map(|(i, snapshot)| DailyRecord {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                subject: "user@example.com".to_string(),
                snapshot,
            })
            .collect()
    }

    fn steps_window(steps: u32) -> Vec<DailyRecord> {
        window(vec![
            BiometricSnapshot {
                total_steps: steps,
                ..Default::default()
            };
            3
        ])
    }

    fn preferences(categories: Vec<GoalCategory>) -> GoalPreferences {
        GoalPreferences {
            goals: categories,
            timeframe_days: 7,
            difficulty: Difficulty::Moderate,
        }
    }

    #[test]
    fn test_timeframe_below_two_days_is_invalid() {
        let prefs = GoalPreferences {
            timeframe_days: 1,
            ..Default::default()
        };
        let result = GoalGenerator::new().generate("user@example.com", &steps_window(5_000), &prefs);
        assert!(matches!(
            result,
            Err(HealthRsError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_empty_window_is_not_found() {
        let result = GoalGenerator::new().generate(
            "user@example.com",
            &[],
            &GoalPreferences::default(),
        );
        assert!(matches!(result, Err(HealthRsError::NotFound { .. })));
    }

    #[test]
    fn test_moderate_step_target_is_capped_by_band() {
        let plan = GoalGenerator::new()
            .generate(
                "user@example.com",
                &steps_window(3_000),
                &preferences(vec![GoalCategory::Activity]),
            )
            .unwrap();

        let goal = &plan.goals[0];
        // 3000 * 1.25 = 3750, below the 5000 cap for the low band
        assert_eq!(goal.target, 3_750.0);
        assert_eq!(goal.priority, GoalPriority::High);
    }

    #[test]
    fn test_high_step_band_caps_at_12000() {
        let plan = GoalGenerator::new()
            .generate(
                "user@example.com",
                &steps_window(11_000),
                &preferences(vec![GoalCategory::Activity]),
            )
            .unwrap();

        // 11000 * 1.25 = 13750, capped to the top band ceiling
        assert_eq!(plan.goals[0].target, 12_000.0);
        assert_eq!(plan.goals[0].priority, GoalPriority::Medium);
    }

    #[test]
    fn test_activity_milestones_interpolate_linearly() {
        let plan = GoalGenerator::new()
            .generate(
                "user@example.com",
                &steps_window(4_000),
                &preferences(vec![GoalCategory::Activity]),
            )
            .unwrap();

        let goal = &plan.goals[0];
        assert_eq!(goal.target, 5_000.0);
        let days: Vec<u32> = goal.milestones.iter().map(|m| m.day).collect();
        assert_eq!(days, vec![2, 4, 7]);

        let last = goal.milestones.last().unwrap();
        assert_eq!(last.target, goal.target);

        // checkpoints rise monotonically toward the target
        assert!(goal.milestones.windows(2).all(|w| w[0].target <= w[1].target));
    }

    #[test]
    fn test_sleep_bands() {
        let short = window(vec![
            BiometricSnapshot {
                total_sleep_hours: 5.8,
                ..Default::default()
            };
            2
        ]);
        let plan = GoalGenerator::new()
            .generate("user@example.com", &short, &preferences(vec![GoalCategory::Sleep]))
            .unwrap();
        assert_eq!(plan.goals[0].target, 7.5);
        assert_eq!(plan.goals[0].priority, GoalPriority::High);

        let long = window(vec![
            BiometricSnapshot {
                total_sleep_hours: 10.0,
                ..Default::default()
            };
            2
        ]);
        let plan = GoalGenerator::new()
            .generate("user@example.com", &long, &preferences(vec![GoalCategory::Sleep]))
            .unwrap();
        assert_eq!(plan.goals[0].target, 8.5);
        assert_eq!(plan.goals[0].priority, GoalPriority::Medium);
    }

    #[test]
    fn test_stress_and_cardio_bands() {
        let stressed = window(vec![
            BiometricSnapshot {
                stress_score: 75,
                avg_heart_rate: 90,
                ..Default::default()
            };
            2
        ]);
        let plan = GoalGenerator::new()
            .generate(
                "user@example.com",
                &stressed,
                &preferences(vec![GoalCategory::Stress, GoalCategory::Cardiovascular]),
            )
            .unwrap();

        assert_eq!(plan.goals[0].target, 50.0);
        assert_eq!(plan.goals[0].priority, GoalPriority::High);
        assert_eq!(plan.goals[1].target, 75.0);
        assert_eq!(plan.goals[1].priority, GoalPriority::High);
        assert_eq!(plan.high_priority_count, 2);
    }

    #[test]
    fn test_projected_score_adds_improvements_capped_at_100() {
        let plan = GoalGenerator::new()
            .generate(
                "user@example.com",
                &steps_window(3_000),
                &GoalPreferences::default(),
            )
            .unwrap();

        // activity 15 + sleep 12 + hydration 5
        assert_eq!(plan.estimated_improvement, 32.0);
        assert!(
            (plan.projected_health_score
                - (plan.average_current_health_score + 32.0).min(100.0))
            .abs()
                < 0.11
        );
        assert!(plan.projected_health_score <= 100.0);
    }

    #[test]
    fn test_goal_order_follows_preferences() {
        let plan = GoalGenerator::new()
            .generate(
                "user@example.com",
                &steps_window(6_000),
                &preferences(vec![GoalCategory::Hydration, GoalCategory::Activity]),
            )
            .unwrap();

        assert_eq!(plan.goals[0].category, GoalCategory::Hydration);
        assert_eq!(plan.goals[1].category, GoalCategory::Activity);
        assert_eq!(plan.total_goals, 2);
    }
}
