//! SQLite output
//!
//! Each crawl opens a run row (with the config hash) and writes one
//! `vacancies` row per emitted posting.

use crate::crawler::PostingDetail;
use crate::output::traits::{OutputResult, RecordSink};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// SQL schema for the output database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL
);

-- One row per emitted posting; the same posting may appear more than once
CREATE TABLE IF NOT EXISTS vacancies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    posting_id TEXT NOT NULL,
    name TEXT,
    salary TEXT,
    published_at TEXT,
    description TEXT,
    experience TEXT,
    employment TEXT,
    schedule TEXT,
    key_skills TEXT NOT NULL,
    city TEXT,
    employer TEXT,
    fetched_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_vacancies_posting ON vacancies(posting_id);
CREATE INDEX IF NOT EXISTS idx_vacancies_run ON vacancies(run_id);
"#;

pub struct SqliteSink {
    conn: Mutex<Connection>,
    run_id: i64,
}

impl SqliteSink {
    /// Opens (or creates) the database at `path` and starts a new run
    pub fn open(path: &Path, config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::with_connection(conn, config_hash)
    }

    /// Creates an in-memory database
    pub fn open_in_memory(config_hash: &str) -> OutputResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, config_hash)
    }

    fn with_connection(conn: Connection, config_hash: &str) -> OutputResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute(
            "INSERT INTO runs (started_at, config_hash) VALUES (?1, ?2)",
            params![Utc::now().to_rfc3339(), config_hash],
        )?;
        let run_id = conn.last_insert_rowid();

        Ok(Self {
            conn: Mutex::new(conn),
            run_id,
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Number of postings written in this run
    pub fn count_records(&self) -> OutputResult<u64> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM vacancies WHERE run_id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordSink for SqliteSink {
    fn write_record(&self, record: &PostingDetail) -> OutputResult<()> {
        let salary = record
            .salary
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let key_skills = serde_json::to_string(&record.key_skills)?;

        self.lock().execute(
            "INSERT INTO vacancies (
                run_id, posting_id, name, salary, published_at, description,
                experience, employment, schedule, key_skills, city, employer, fetched_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                self.run_id,
                record.id,
                record.name,
                salary,
                record.published_at,
                record.description,
                record.experience,
                record.employment,
                record.schedule,
                key_skills,
                record.city,
                record.employer,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Stamps the run's finish time
    fn flush(&self) -> OutputResult<()> {
        self.lock().execute(
            "UPDATE runs SET finished_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), self.run_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Salary;

    fn record(id: &str) -> PostingDetail {
        PostingDetail {
            id: id.to_string(),
            name: Some("Водитель".to_string()),
            salary: Some(Salary {
                from: Some(60000.into()),
                to: None,
                currency: Some("RUR".to_string()),
                gross: Some(true),
            }),
            published_at: None,
            description: None,
            experience: Some("Нет опыта".to_string()),
            employment: None,
            schedule: None,
            key_skills: vec!["Категория C".to_string(), "Категория E".to_string()],
            city: Some("Усть-Илимск".to_string()),
            employer: None,
        }
    }

    #[test]
    fn test_write_records() {
        let sink = SqliteSink::open_in_memory("abc123").unwrap();

        sink.write_record(&record("1")).unwrap();
        sink.write_record(&record("2")).unwrap();
        // Repeats are kept
        sink.write_record(&record("1")).unwrap();

        assert_eq!(sink.count_records().unwrap(), 3);
    }

    #[test]
    fn test_stored_columns() {
        let sink = SqliteSink::open_in_memory("abc123").unwrap();
        sink.write_record(&record("42")).unwrap();

        let conn = sink.lock();
        let (posting_id, salary, key_skills, city): (String, Option<String>, String, String) = conn
            .query_row(
                "SELECT posting_id, salary, key_skills, city FROM vacancies",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();

        assert_eq!(posting_id, "42");
        let salary: Salary = serde_json::from_str(&salary.unwrap()).unwrap();
        assert_eq!(salary.currency.as_deref(), Some("RUR"));
        let skills: Vec<String> = serde_json::from_str(&key_skills).unwrap();
        assert_eq!(skills.len(), 2);
        assert_eq!(city, "Усть-Илимск");
    }

    #[test]
    fn test_run_records_hash_and_finish() {
        let sink = SqliteSink::open_in_memory("abc123").unwrap();
        sink.flush().unwrap();

        let conn = sink.lock();
        let (hash, finished): (String, Option<String>) = conn
            .query_row(
                "SELECT config_hash, finished_at FROM runs WHERE id = ?1",
                params![sink.run_id()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();

        assert_eq!(hash, "abc123");
        assert!(finished.is_some());
    }

    #[test]
    fn test_reopen_starts_new_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vacancies.db");

        let first = SqliteSink::open(&path, "h1").unwrap();
        first.write_record(&record("1")).unwrap();
        let first_run = first.run_id();
        drop(first);

        let second = SqliteSink::open(&path, "h2").unwrap();
        assert_ne!(second.run_id(), first_run);
        assert_eq!(second.count_records().unwrap(), 0);
    }
}
