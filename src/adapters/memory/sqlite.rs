//! SQLite-backed `Memory` adapter. Grounded in the teacher's
//! `adapters/sqlite/memory_repository.rs` (row mapping, `sqlx::query`
//! style) and `adapters/sqlite/migrations.rs` (embedded, version-tracked
//! migrations) — WAL mode, busy timeout, a small embedded migration set
//! applied once at construction.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{MemoryEvent, MemoryFilter};
use crate::domain::ports::Memory;

const MIGRATIONS: &[&str] = &[
    r"CREATE TABLE IF NOT EXISTS memory_events (
        id TEXT PRIMARY KEY,
        timestamp TEXT NOT NULL,
        agent_id TEXT NOT NULL,
        process_name TEXT NOT NULL,
        data TEXT NOT NULL,
        tags TEXT NOT NULL,
        parent_id TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_memory_events_agent ON memory_events(agent_id, timestamp)",
    r"CREATE TABLE IF NOT EXISTS memory_snapshots (
        agent_id TEXT PRIMARY KEY,
        blob TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
];

/// Append-only event log plus belief snapshots, persisted through `sqlx`.
pub struct SqliteMemory {
    pool: SqlitePool,
}

impl SqliteMemory {
    /// Connect (creating the file if missing) and apply embedded migrations.
    pub async fn connect(database_url: &str) -> DomainResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(10)
            .idle_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let memory = Self { pool };
        memory.migrate().await?;
        Ok(memory)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn migrate(&self) -> DomainResult<()> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> DomainResult<MemoryEvent> {
    let id: String = row.try_get("id").map_err(|e| DomainError::Database(e.to_string()))?;
    let timestamp: String = row.try_get("timestamp").map_err(|e| DomainError::Database(e.to_string()))?;
    let agent_id: String = row.try_get("agent_id").map_err(|e| DomainError::Database(e.to_string()))?;
    let process_name: String = row.try_get("process_name").map_err(|e| DomainError::Database(e.to_string()))?;
    let data: String = row.try_get("data").map_err(|e| DomainError::Database(e.to_string()))?;
    let tags: String = row.try_get("tags").map_err(|e| DomainError::Database(e.to_string()))?;
    let parent_id: Option<String> = row.try_get("parent_id").map_err(|e| DomainError::Database(e.to_string()))?;

    Ok(MemoryEvent {
        id: Uuid::parse_str(&id).map_err(|e| DomainError::Serialization(e.to_string()))?,
        timestamp: chrono::DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| DomainError::Serialization(e.to_string()))?
            .with_timezone(&chrono::Utc),
        agent_id,
        process_name,
        data: serde_json::from_str(&data)?,
        tags: serde_json::from_str(&tags)?,
        parent_id: parent_id.map(|p| Uuid::parse_str(&p)).transpose().map_err(|e| DomainError::Serialization(e.to_string()))?,
    })
}

#[async_trait::async_trait]
impl Memory for SqliteMemory {
    async fn append(&self, event: MemoryEvent) -> DomainResult<()> {
        let tags = serde_json::to_string(&event.tags)?;
        let data = serde_json::to_string(&event.data)?;
        sqlx::query(
            "INSERT INTO memory_events (id, timestamp, agent_id, process_name, data, tags, parent_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(event.timestamp.to_rfc3339())
        .bind(&event.agent_id)
        .bind(&event.process_name)
        .bind(data)
        .bind(tags)
        .bind(event.parent_id.map(|p| p.to_string()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn query(&self, filter: MemoryFilter) -> DomainResult<Vec<MemoryEvent>> {
        // Fetch broadly and filter in-process: the filter combinations are
        // small and this keeps the query shape simple, matching the
        // teacher's preference for explicit row mapping over a dynamic
        // query builder.
        let rows = sqlx::query("SELECT * FROM memory_events ORDER BY timestamp ASC")
            .fetch_all(&self.pool)
            .await?;
        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            events.push(row_to_event(row)?);
        }
        Ok(events
            .into_iter()
            .filter(|e| filter.agent_id.as_ref().is_none_or(|a| &e.agent_id == a))
            .filter(|e| filter.process_name.as_ref().is_none_or(|p| &e.process_name == p))
            .filter(|e| filter.tag.as_ref().is_none_or(|t| e.tags.contains(t)))
            .filter(|e| filter.since.is_none_or(|since| e.timestamp >= since))
            .collect())
    }

    async fn snapshot(&self, agent_id: &str) -> DomainResult<Option<serde_json::Value>> {
        let row = sqlx::query("SELECT blob FROM memory_snapshots WHERE agent_id = ?")
            .bind(agent_id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            None => Ok(None),
            Some(row) => {
                let blob: String = row.try_get("blob").map_err(|e| DomainError::Database(e.to_string()))?;
                Ok(Some(serde_json::from_str(&blob)?))
            }
        }
    }

    async fn save_snapshot(&self, agent_id: &str, blob: serde_json::Value) -> DomainResult<()> {
        let serialized = serde_json::to_string(&blob)?;
        sqlx::query(
            "INSERT INTO memory_snapshots (agent_id, blob, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(agent_id) DO UPDATE SET blob = excluded.blob, updated_at = excluded.updated_at",
        )
        .bind(agent_id)
        .bind(serialized)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn events_since(&self, agent_id: &str, since: Option<Uuid>) -> DomainResult<Vec<MemoryEvent>> {
        let cursor_timestamp = match since {
            None => None,
            Some(id) => {
                let row = sqlx::query("SELECT timestamp FROM memory_events WHERE id = ?")
                    .bind(id.to_string())
                    .fetch_optional(&self.pool)
                    .await?;
                row.map(|r| r.try_get::<String, _>("timestamp")).transpose().map_err(|e| DomainError::Database(e.to_string()))?
            }
        };

        let rows = match &cursor_timestamp {
            Some(ts) => {
                sqlx::query("SELECT * FROM memory_events WHERE agent_id = ? AND timestamp > ? ORDER BY timestamp ASC")
                    .bind(agent_id)
                    .bind(ts)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM memory_events WHERE agent_id = ? ORDER BY timestamp ASC")
                    .bind(agent_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(row_to_event).collect()
    }
}
