// 🗄️ Local document store - SQLite + WAL
// Same payloads as the REST store, kept on disk with an audit trail.

use crate::sink::{HealthTestRecord, PedigreeRecord, PersistenceSink};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Event for audit trail ("every write is an event")
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

const ACTOR: &str = "verification_sink";

fn sha256_hex(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    format!("{:x}", hasher.finalize())
}

/// Dedup key for a health row: same dog, test, result and notes
pub fn health_idempotency_hash(record: &HealthTestRecord) -> String {
    sha256_hex(&[
        &record.dog_id,
        record.test_type.as_str(),
        &record.result,
        &record.notes,
    ])
}

/// Dedup key for a pedigree row: same dog, same extracted content
pub fn pedigree_idempotency_hash(record: &PedigreeRecord, content_hash: &str) -> String {
    sha256_hex(&[&record.dog_id, content_hash])
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Health records
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS health_records (
            id TEXT PRIMARY KEY,
            idempotency_hash TEXT UNIQUE NOT NULL,
            dog_id TEXT NOT NULL,
            test_type TEXT NOT NULL,
            result TEXT NOT NULL,
            test_date TEXT,
            verification_source TEXT NOT NULL,
            verification_status TEXT NOT NULL,
            notes TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Pedigrees
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS pedigrees (
            id TEXT PRIMARY KEY,
            idempotency_hash TEXT UNIQUE NOT NULL,
            dog_id TEXT NOT NULL,
            sire_name TEXT,
            dam_name TEXT,
            lineage TEXT NOT NULL,
            verification_source TEXT NOT NULL,
            verification_status TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Events Table (audit trail)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_health_dog ON health_records(dog_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_pedigrees_dog ON pedigrees(dog_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Insert health rows; rows already stored are returned as they were stored
pub fn insert_health_records(conn: &Connection, records: &[HealthTestRecord]) -> Result<Vec<serde_json::Value>> {
    let mut stored = Vec::with_capacity(records.len());
    let mut duplicates = 0;

    for record in records {
        let hash = health_idempotency_hash(record);
        let id = uuid::Uuid::new_v4().to_string();

        let result = conn.execute(
            "INSERT INTO health_records (
                id, idempotency_hash, dog_id, test_type, result, test_date,
                verification_source, verification_status, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                hash,
                record.dog_id,
                record.test_type.as_str(),
                record.result,
                record.test_date,
                record.verification_source,
                record.verification_status,
                record.notes,
                Utc::now().to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => {
                let event = Event::new(
                    "health_record_added",
                    "health_record",
                    &id,
                    serde_json::json!({
                        "dog_id": record.dog_id,
                        "test_type": record.test_type.as_str(),
                        "result": record.result,
                    }),
                    ACTOR,
                );
                insert_event(conn, &event)?;
            }
            Err(e) if is_constraint_violation(&e) => duplicates += 1,
            Err(e) => return Err(e.into()),
        }

        if let Some(row) = health_record_by_hash(conn, &hash)? {
            stored.push(row);
        }
    }

    info!(inserted = records.len() - duplicates, duplicates, "health records stored");
    Ok(stored)
}

/// Insert the pedigree row; a repeat of the same content returns the stored row
pub fn insert_pedigree(conn: &Connection, record: &PedigreeRecord, content_hash: &str) -> Result<serde_json::Value> {
    let hash = pedigree_idempotency_hash(record, content_hash);
    let id = uuid::Uuid::new_v4().to_string();

    let result = conn.execute(
        "INSERT INTO pedigrees (
            id, idempotency_hash, dog_id, sire_name, dam_name, lineage,
            verification_source, verification_status, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            hash,
            record.dog_id,
            record.sire_name,
            record.dam_name,
            record.lineage,
            record.verification_source,
            record.verification_status,
            Utc::now().to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => {
            let event = Event::new(
                "pedigree_added",
                "pedigree",
                &id,
                serde_json::json!({
                    "dog_id": record.dog_id,
                    "sire_name": record.sire_name,
                    "dam_name": record.dam_name,
                }),
                ACTOR,
            );
            insert_event(conn, &event)?;
        }
        Err(e) if is_constraint_violation(&e) => {
            debug!(dog_id = %record.dog_id, "pedigree already stored");
        }
        Err(e) => return Err(e.into()),
    }

    pedigree_by_hash(conn, &hash)?.ok_or_else(|| anyhow!("pedigree row missing after insert"))
}

fn health_row_to_json(row: &rusqlite::Row<'_>) -> rusqlite::Result<serde_json::Value> {
    Ok(serde_json::json!({
        "id": row.get::<_, String>(0)?,
        "dog_id": row.get::<_, String>(1)?,
        "test_type": row.get::<_, String>(2)?,
        "result": row.get::<_, String>(3)?,
        "test_date": row.get::<_, Option<String>>(4)?,
        "verification_source": row.get::<_, String>(5)?,
        "verification_status": row.get::<_, String>(6)?,
        "notes": row.get::<_, String>(7)?,
        "created_at": row.get::<_, String>(8)?,
    }))
}

fn pedigree_row_to_json(row: &rusqlite::Row<'_>) -> rusqlite::Result<serde_json::Value> {
    Ok(serde_json::json!({
        "id": row.get::<_, String>(0)?,
        "dog_id": row.get::<_, String>(1)?,
        "sire_name": row.get::<_, Option<String>>(2)?,
        "dam_name": row.get::<_, Option<String>>(3)?,
        "lineage": row.get::<_, String>(4)?,
        "verification_source": row.get::<_, String>(5)?,
        "verification_status": row.get::<_, String>(6)?,
        "created_at": row.get::<_, String>(7)?,
    }))
}

const HEALTH_COLUMNS: &str = "id, dog_id, test_type, result, test_date, verification_source, verification_status, notes, created_at";
const PEDIGREE_COLUMNS: &str = "id, dog_id, sire_name, dam_name, lineage, verification_source, verification_status, created_at";

fn health_record_by_hash(conn: &Connection, hash: &str) -> Result<Option<serde_json::Value>> {
    let sql = format!("SELECT {} FROM health_records WHERE idempotency_hash = ?1", HEALTH_COLUMNS);
    Ok(conn.query_row(&sql, [hash], health_row_to_json).optional()?)
}

fn pedigree_by_hash(conn: &Connection, hash: &str) -> Result<Option<serde_json::Value>> {
    let sql = format!("SELECT {} FROM pedigrees WHERE idempotency_hash = ?1", PEDIGREE_COLUMNS);
    Ok(conn.query_row(&sql, [hash], pedigree_row_to_json).optional()?)
}

/// All health rows stored for a dog, oldest first
pub fn get_health_records_for_dog(conn: &Connection, dog_id: &str) -> Result<Vec<serde_json::Value>> {
    let sql = format!(
        "SELECT {} FROM health_records WHERE dog_id = ?1 ORDER BY rowid ASC",
        HEALTH_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([dog_id], health_row_to_json)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// All pedigree rows stored for a dog, oldest first
pub fn get_pedigrees_for_dog(conn: &Connection, dog_id: &str) -> Result<Vec<serde_json::Value>> {
    let sql = format!(
        "SELECT {} FROM pedigrees WHERE dog_id = ?1 ORDER BY rowid ASC",
        PEDIGREE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([dog_id], pedigree_row_to_json)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (event_id, timestamp, event_type, entity_type, entity_id, data, actor)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    let timestamp: String = row.get(1)?;
    let data: String = row.get(5)?;
    Ok(Event {
        event_id: row.get(0)?,
        timestamp: DateTime::parse_from_rfc3339(&timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        event_type: row.get(2)?,
        entity_type: row.get(3)?,
        entity_id: row.get(4)?,
        data: serde_json::from_str(&data).unwrap_or(serde_json::Value::Null),
        actor: row.get(6)?,
    })
}

const EVENT_COLUMNS: &str = "event_id, timestamp, event_type, entity_type, entity_id, data, actor";

/// Audit events of one stored row (`health_record` or `pedigree`), in write order
pub fn get_events_for_entity(conn: &Connection, entity_type: &str, entity_id: &str) -> Result<Vec<Event>> {
    let sql = format!(
        "SELECT {} FROM events WHERE entity_type = ?1 AND entity_id = ?2 ORDER BY id ASC",
        EVENT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let events = stmt
        .query_map(params![entity_type, entity_id], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(events)
}

/// Every audit event written for a dog, in write order
pub fn get_events_for_dog(conn: &Connection, dog_id: &str) -> Result<Vec<Event>> {
    let sql = format!(
        "SELECT {} FROM events WHERE json_extract(data, '$.dog_id') = ?1 ORDER BY id ASC",
        EVENT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let events = stmt
        .query_map([dog_id], event_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(events)
}

/// What the local store holds for one dog
#[derive(Debug, Clone, Serialize)]
pub struct DogHistory {
    pub dog_id: String,
    pub health_records: Vec<serde_json::Value>,
    pub pedigrees: Vec<serde_json::Value>,
    pub events: Vec<Event>,
}

/// Row count of a table (health_records | pedigrees | events)
pub fn verify_count(conn: &Connection, table: &str) -> Result<i64> {
    if !matches!(table, "health_records" | "pedigrees" | "events") {
        return Err(anyhow!("unknown table: {}", table));
    }
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// SINK
// ============================================================================

/// `PersistenceSink` over one SQLite connection
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteSink {
            conn: Mutex::new(conn),
        })
    }

    pub fn history(&self, dog_id: &str) -> Result<DogHistory> {
        self.with_conn(|conn| {
            Ok(DogHistory {
                dog_id: dog_id.to_string(),
                health_records: get_health_records_for_dog(conn, dog_id)?,
                pedigrees: get_pedigrees_for_dog(conn, dog_id)?,
                events: get_events_for_dog(conn, dog_id)?,
            })
        })
    }

    /// Run `f` with the locked connection
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database lock poisoned"))?;
        f(&conn)
    }
}

impl PersistenceSink for SqliteSink {
    fn insert_health_records(&self, records: &[HealthTestRecord]) -> Result<Vec<serde_json::Value>> {
        self.with_conn(|conn| insert_health_records(conn, records))
    }

    fn insert_pedigree(&self, record: &PedigreeRecord, content_hash: &str) -> Result<serde_json::Value> {
        self.with_conn(|conn| insert_pedigree(conn, record, content_hash))
    }
}
