use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use healthrs::models::{BiometricSnapshot, BloodPressureReading, DailyRecord, OxygenReading};
use healthrs::scoring::HealthScorer;
use healthrs::trends::TrendAnalyzer;

fn sample_snapshot(seed: u32) -> BiometricSnapshot {
    BiometricSnapshot {
        total_steps: 2_000 + (seed * 137) % 12_000,
        avg_heart_rate: 55 + (seed % 60) as u16,
        min_heart_rate: 50,
        max_heart_rate: 120 + (seed % 40) as u16,
        total_sleep_hours: 4.0 + f64::from(seed % 7),
        total_hydration_liters: 0.5 + f64::from(seed % 4) * 0.7,
        stress_score: (seed % 100) as u8,
        blood_pressure: vec![BloodPressureReading {
            systolic: 100 + (seed % 60) as u16,
            diastolic: 60 + (seed % 40) as u16,
        }],
        oxygen_saturation: vec![OxygenReading {
            percentage: 90.0 + f64::from(seed % 10),
        }],
        ..Default::default()
    }
}

fn sample_window(days: u32) -> Vec<DailyRecord> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    (0..days)
        .map(|i| DailyRecord {
            date: start.checked_add_days(Days::new(u64::from(i))).unwrap(),
            subject: "bench@example.com".to_string(),
            snapshot: sample_snapshot(i),
        })
        .collect()
}

fn bench_scorer(c: &mut Criterion) {
    let scorer = HealthScorer::new();
    let snapshot = sample_snapshot(17);

    c.bench_function("health_score_single_day", |b| {
        b.iter(|| scorer.calculate(black_box(&snapshot)))
    });
}

fn bench_trends(c: &mut Criterion) {
    let analyzer = TrendAnalyzer::new();
    let window = sample_window(90);

    c.bench_function("trend_analysis_90_days", |b| {
        b.iter(|| {
            analyzer
                .analyze("bench@example.com", black_box(&window), 90)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_scorer, bench_trends);
criterion_main!(benches);
