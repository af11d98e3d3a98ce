use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::{
    BiometricSnapshot, BloodPressureReading, DailyRecord, ExerciseSession, HeightReading,
    OxygenReading, TemperatureReading, WeightReading,
};

/// Database error types
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

/// Per-subject, per-day record store.
///
/// Multiple documents may be stored for the same subject and date (upstream
/// re-delivers); queries de-duplicate by calendar date, keeping the first
/// stored document per day, and return records sorted ascending.
pub trait SnapshotStore {
    /// Deduplicated, ascending records for an inclusive date range
    fn daily_window(
        &self,
        subject: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, DatabaseError>;

    /// Most recent record for a subject, if any
    fn latest(&self, subject: &str) -> Result<Option<DailyRecord>, DatabaseError>;
}

/// SQLite-backed record store
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create or open a database at the specified path
    pub fn new<P: AsRef<std::path::Path>>(db_path: P) -> Result<Self, DatabaseError> {
        let conn = Connection::open(db_path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// In-memory database, used by tests and dry runs
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema with tables and indexes
    fn init_schema(&self) -> Result<(), DatabaseError> {
        // WAL mode for concurrent readers while the importer writes
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;

        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS daily_records (
                id TEXT PRIMARY KEY,
                subject TEXT NOT NULL,
                date TEXT NOT NULL,

                -- Scalar metrics
                total_steps INTEGER NOT NULL,
                avg_heart_rate INTEGER NOT NULL,
                min_heart_rate INTEGER NOT NULL,
                max_heart_rate INTEGER NOT NULL,
                total_distance_km REAL NOT NULL,
                total_sleep_hours REAL NOT NULL,
                total_hydration_liters REAL NOT NULL,
                stress_level TEXT NOT NULL,
                stress_score INTEGER NOT NULL,
                daily_total_calories INTEGER NOT NULL,

                -- Time-ordered reading sequences, stored as JSON
                oxygen_saturation TEXT NOT NULL,
                body_temperature TEXT NOT NULL,
                blood_pressure TEXT NOT NULL,
                weight TEXT NOT NULL,
                height TEXT NOT NULL,
                exercise TEXT NOT NULL,

                received_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_daily_records_subject_date
             ON daily_records (subject, date)",
            [],
        )?;

        Ok(())
    }

    /// Store one record. Re-deliveries for an existing date are kept; the
    /// query side ignores everything but the first document per day.
    pub fn store_record(&self, record: &DailyRecord) -> Result<String, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        let snapshot = &record.snapshot;

        self.conn.execute(
            r#"
            INSERT INTO daily_records (
                id, subject, date,
                total_steps, avg_heart_rate, min_heart_rate, max_heart_rate,
                total_distance_km, total_sleep_hours, total_hydration_liters,
                stress_level, stress_score, daily_total_calories,
                oxygen_saturation, body_temperature, blood_pressure,
                weight, height, exercise
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19
            )
            "#,
            params![
                id,
                record.subject,
                record.date.to_string(),
                snapshot.total_steps,
                snapshot.avg_heart_rate,
                snapshot.min_heart_rate,
                snapshot.max_heart_rate,
                snapshot.total_distance_km,
                snapshot.total_sleep_hours,
                snapshot.total_hydration_liters,
                snapshot.stress_level,
                snapshot.stress_score,
                snapshot.daily_total_calories,
                to_json(&snapshot.oxygen_saturation)?,
                to_json(&snapshot.body_temperature)?,
                to_json(&snapshot.blood_pressure)?,
                to_json(&snapshot.weight)?,
                to_json(&snapshot.height)?,
                to_json(&snapshot.exercise)?,
            ],
        )?;

        Ok(id)
    }

    /// Count stored documents (before de-duplication)
    pub fn record_count(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM daily_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    const RECORD_COLUMNS: &'static str = r#"
        subject, date,
        total_steps, avg_heart_rate, min_heart_rate, max_heart_rate,
        total_distance_km, total_sleep_hours, total_hydration_liters,
        stress_level, stress_score, daily_total_calories,
        oxygen_saturation, body_temperature, blood_pressure,
        weight, height, exercise
    "#;

    fn record_from_row(row: &Row) -> rusqlite::Result<(DailyRecord, Result<(), DatabaseError>)> {
        let date_str: String = row.get("date")?;
        let mut decode_status = Ok(());

        let date = match NaiveDate::parse_from_str(&date_str, "%Y-%m-%d") {
            Ok(date) => date,
            Err(err) => {
                decode_status = Err(DatabaseError::InvalidValue(format!(
                    "date {date_str}: {err}"
                )));
                NaiveDate::default()
            }
        };

        let parse_seq = |column: &str| -> rusqlite::Result<String> { row.get(column) };

        let snapshot = BiometricSnapshot {
            total_steps: row.get("total_steps")?,
            avg_heart_rate: row.get("avg_heart_rate")?,
            min_heart_rate: row.get("min_heart_rate")?,
            max_heart_rate: row.get("max_heart_rate")?,
            total_distance_km: row.get("total_distance_km")?,
            total_sleep_hours: row.get("total_sleep_hours")?,
            total_hydration_liters: row.get("total_hydration_liters")?,
            stress_level: row.get("stress_level")?,
            stress_score: row.get("stress_score")?,
            daily_total_calories: row.get("daily_total_calories")?,
            oxygen_saturation: from_json::<Vec<OxygenReading>>(
                &parse_seq("oxygen_saturation")?,
                &mut decode_status,
            ),
            body_temperature: from_json::<Vec<TemperatureReading>>(
                &parse_seq("body_temperature")?,
                &mut decode_status,
            ),
            blood_pressure: from_json::<Vec<BloodPressureReading>>(
                &parse_seq("blood_pressure")?,
                &mut decode_status,
            ),
            weight: from_json::<Vec<WeightReading>>(&parse_seq("weight")?, &mut decode_status),
            height: from_json::<Vec<HeightReading>>(&parse_seq("height")?, &mut decode_status),
            exercise: from_json::<Vec<ExerciseSession>>(
                &parse_seq("exercise")?,
                &mut decode_status,
            ),
        };

        Ok((
            DailyRecord {
                date,
                subject: row.get("subject")?,
                snapshot,
            },
            decode_status,
        ))
    }
}

impl SnapshotStore for Database {
    fn daily_window(
        &self,
        subject: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM daily_records
             WHERE subject = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC, received_at ASC, rowid ASC",
            Self::RECORD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let rows = stmt.query_map(
            params![subject, start.to_string(), end.to_string()],
            Database::record_from_row,
        )?;

        // first stored document per date wins
        let mut records: Vec<DailyRecord> = Vec::new();
        for row in rows {
            let (record, decode_status) = row?;
            decode_status?;
            if records.last().map(|r| r.date) != Some(record.date) {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn latest(&self, subject: &str) -> Result<Option<DailyRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM daily_records
             WHERE subject = ?1
             ORDER BY date DESC, received_at ASC, rowid ASC
             LIMIT 1",
            Self::RECORD_COLUMNS
        );
        let result = self
            .conn
            .query_row(&sql, params![subject], Database::record_from_row)
            .optional()?;

        match result {
            Some((record, decode_status)) => {
                decode_status?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

/// Decode a JSON sequence column, recording the first failure instead of
/// panicking; an unreadable column decodes as empty and fails the query.
fn from_json<T: Default + serde::de::DeserializeOwned>(
    raw: &str,
    status: &mut Result<(), DatabaseError>,
) -> T {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            if status.is_ok() {
                *status = Err(DatabaseError::Serialization(err.to_string()));
            }
            T::default()
        }
    }
}
