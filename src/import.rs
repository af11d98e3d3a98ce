//! Daily-record importers.
//!
//! Upstream pipelines hand the store either JSON documents with the raw
//! camelCase field names, or flat CSV exports of the scalar metrics. Both
//! land as [`DailyRecord`]s; invalid rows are skipped and reported rather
//! than aborting the batch.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::database::Database;
use crate::models::{BiometricSnapshot, DailyRecord};

/// Supported import formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Detect format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(ImportFormat::Json),
            "csv" => Some(ImportFormat::Csv),
            _ => None,
        }
    }
}

/// Result of an import run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    /// Records stored
    pub imported: usize,

    /// Rows rejected by validation
    pub skipped: usize,
}

/// One upstream JSON document: a dated snapshot plus routing fields
#[derive(Debug, Deserialize)]
struct UpstreamDocument {
    #[serde(alias = "email", alias = "userId")]
    subject: String,

    date: NaiveDate,

    #[serde(flatten)]
    snapshot: BiometricSnapshot,
}

/// One flat CSV row of scalar metrics
#[derive(Debug, Deserialize)]
struct CsvRow {
    subject: String,
    date: NaiveDate,
    total_steps: u32,
    avg_heart_rate: u16,
    min_heart_rate: u16,
    max_heart_rate: u16,
    total_distance_km: f64,
    total_sleep_hours: f64,
    total_hydration_liters: f64,
    stress_level: String,
    stress_score: u8,
}

/// File importer feeding the record store
pub struct RecordImporter<'a> {
    db: &'a Database,
}

impl<'a> RecordImporter<'a> {
    pub fn new(db: &'a Database) -> Self {
        RecordImporter { db }
    }

    /// Import a file, auto-detecting the format from its extension
    pub fn import_file(&self, path: &Path) -> Result<ImportSummary> {
        let format = ImportFormat::from_path(path)
            .with_context(|| format!("Unsupported file format: {}", path.display()))?;
        match format {
            ImportFormat::Json => self.import_json(path),
            ImportFormat::Csv => self.import_csv(path),
        }
    }

    /// Import a JSON array of upstream documents
    pub fn import_json(&self, path: &Path) -> Result<ImportSummary> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let documents: Vec<UpstreamDocument> =
            serde_json::from_str(&content).context("Failed to parse JSON records")?;

        let records = documents
            .into_iter()
            .map(|doc| DailyRecord {
                date: doc.date,
                subject: doc.subject,
                snapshot: doc.snapshot,
            })
            .collect::<Vec<_>>();

        self.store_batch(records)
    }

    /// Import a CSV export of scalar metrics (sequences arrive empty)
    pub fn import_csv(&self, path: &Path) -> Result<ImportSummary> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut records = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.context("Failed to parse CSV row")?;
            records.push(DailyRecord {
                date: row.date,
                subject: row.subject,
                snapshot: BiometricSnapshot {
                    total_steps: row.total_steps,
                    avg_heart_rate: row.avg_heart_rate,
                    min_heart_rate: row.min_heart_rate,
                    max_heart_rate: row.max_heart_rate,
                    total_distance_km: row.total_distance_km,
                    total_sleep_hours: row.total_sleep_hours,
                    total_hydration_liters: row.total_hydration_liters,
                    stress_level: row.stress_level,
                    stress_score: row.stress_score,
                    ..Default::default()
                },
            });
        }

        self.store_batch(records)
    }

    fn store_batch(&self, records: Vec<DailyRecord>) -> Result<ImportSummary> {
        let progress = ProgressBar::new(records.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} records")
                .expect("static progress template"),
        );

        let mut imported = 0;
        let mut skipped = 0;
        for record in records {
            match record.snapshot.validate() {
                Ok(()) => {
                    self.db.store_record(&record)?;
                    imported += 1;
                }
                Err(err) => {
                    warn!(
                        subject = record.subject,
                        date = %record.date,
                        error = %err,
                        "skipping invalid record"
                    );
                    skipped += 1;
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(imported, skipped, "import finished");
        Ok(ImportSummary { imported, skipped })
    }
}
