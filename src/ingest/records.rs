//! Ingestion record storage.
//!
//! One record per (video id, language) remembers the fingerprint of the last
//! successfully indexed content version. The uniqueness constraint on the
//! pair is what makes the dedup check trustworthy.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, instrument};

/// The last successfully indexed content version for a (video id, language).
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionRecord {
    /// Video this record belongs to.
    pub video_id: String,
    /// Resolved transcript language.
    pub language: String,
    /// Fingerprint of the normalized transcript, lowercase hex.
    pub transcript_hash: String,
    /// When this content version was indexed.
    pub ingested_at: DateTime<Utc>,
}

/// Trait for ingestion record storage backends.
#[async_trait]
pub trait IngestionStore: Send + Sync {
    /// Look up the record for a (video id, language) pair.
    async fn get(&self, video_id: &str, language: &str) -> Result<Option<IngestionRecord>>;

    /// Create or replace the record for a (video id, language) pair.
    async fn upsert(
        &self,
        video_id: &str,
        language: &str,
        transcript_hash: &str,
    ) -> Result<IngestionRecord>;
}

/// SQLite-backed ingestion record store.
pub struct SqliteIngestionStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ingestions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    video_id TEXT NOT NULL,
    language TEXT NOT NULL DEFAULT 'en',
    transcript_hash TEXT NOT NULL,
    ingested_at TEXT NOT NULL,
    UNIQUE(video_id, language)
);

CREATE INDEX IF NOT EXISTS idx_ingestions_video_id ON ingestions(video_id);
"#;

impl SqliteIngestionStore {
    /// Open (or create) the record store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized ingestion record store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory record store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl IngestionStore for SqliteIngestionStore {
    async fn get(&self, video_id: &str, language: &str) -> Result<Option<IngestionRecord>> {
        let conn = self.conn.lock().unwrap();

        let record = conn
            .query_row(
                "SELECT video_id, language, transcript_hash, ingested_at
                 FROM ingestions WHERE video_id = ?1 AND language = ?2",
                params![video_id, language],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        Ok(record.map(|(video_id, language, transcript_hash, ingested_at)| {
            IngestionRecord {
                video_id,
                language,
                transcript_hash,
                ingested_at: parse_timestamp(&ingested_at),
            }
        }))
    }

    async fn upsert(
        &self,
        video_id: &str,
        language: &str,
        transcript_hash: &str,
    ) -> Result<IngestionRecord> {
        let ingested_at = Utc::now();
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO ingestions (video_id, language, transcript_hash, ingested_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(video_id, language) DO UPDATE SET
                 transcript_hash = excluded.transcript_hash,
                 ingested_at = excluded.ingested_at",
            params![video_id, language, transcript_hash, ingested_at.to_rfc3339()],
        )?;

        Ok(IngestionRecord {
            video_id: video_id.to_string(),
            language: language.to_string(),
            transcript_hash: transcript_hash.to_string(),
            ingested_at,
        })
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
