//! SQLite audit store implementation.

use crate::{AuditEvent, Outcome, Result};
use chrono::{DateTime, Utc};
use policy::Permissions;
use rusqlite::{Connection, params};
use std::path::Path;
use uuid::Uuid;

/// Per-actor totals over the whole audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorSummary {
    pub actor: String,
    pub checks: usize,
    pub denied: usize,
    pub last_seen: DateTime<Utc>,
}

/// SQLite-backed audit store.
pub struct AuditStore {
    conn: Connection,
}

impl AuditStore {
    /// Open or create an audit store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory audit store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS checks (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                actor TEXT NOT NULL,
                scope TEXT NOT NULL,
                required INTEGER NOT NULL,
                allowed INTEGER NOT NULL,
                outcome TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_checks_time
                ON checks(timestamp);
            CREATE INDEX IF NOT EXISTS idx_checks_actor
                ON checks(actor, timestamp);
            "#,
        )?;
        Ok(())
    }

    /// Append a check to the store.
    pub fn append(&self, event: &AuditEvent) -> Result<()> {
        self.conn.execute(
            "INSERT INTO checks (id, timestamp, actor, scope, required, allowed, outcome)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                event.id.to_string(),
                event.timestamp.to_rfc3339(),
                event.actor,
                event.scope,
                event.required.mask(),
                event.outcome.is_allowed(),
                serde_json::to_string(&event.outcome)?,
            ],
        )?;
        Ok(())
    }

    /// Most recent checks first.
    pub fn recent(&self, limit: usize, denied_only: bool) -> Result<Vec<AuditEvent>> {
        let sql = if denied_only {
            "SELECT id, timestamp, actor, scope, required, outcome FROM checks
             WHERE allowed = 0 ORDER BY timestamp DESC LIMIT ?1"
        } else {
            "SELECT id, timestamp, actor, scope, required, outcome FROM checks
             ORDER BY timestamp DESC LIMIT ?1"
        };
        self.query(sql, params![limit as i64])
    }

    /// Most recent checks for one actor, optionally only denials.
    pub fn for_actor(
        &self,
        actor: &str,
        limit: usize,
        denied_only: bool,
    ) -> Result<Vec<AuditEvent>> {
        let sql = if denied_only {
            "SELECT id, timestamp, actor, scope, required, outcome FROM checks
             WHERE actor = ?1 AND allowed = 0 ORDER BY timestamp DESC LIMIT ?2"
        } else {
            "SELECT id, timestamp, actor, scope, required, outcome FROM checks
             WHERE actor = ?1 ORDER BY timestamp DESC LIMIT ?2"
        };
        self.query(sql, params![actor, limit as i64])
    }

    /// Totals per actor, most recently active first.
    pub fn summarize(&self) -> Result<Vec<ActorSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT actor, COUNT(*), SUM(CASE WHEN allowed = 0 THEN 1 ELSE 0 END), MAX(timestamp)
             FROM checks GROUP BY actor ORDER BY MAX(timestamp) DESC",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                let actor: String = row.get(0)?;
                let checks: i64 = row.get(1)?;
                let denied: i64 = row.get(2)?;
                let last_seen: String = row.get(3)?;
                Ok((actor, checks, denied, last_seen))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(actor, checks, denied, last_seen)| {
                Some(ActorSummary {
                    actor,
                    checks: checks as usize,
                    denied: denied as usize,
                    last_seen: last_seen.parse().ok()?,
                })
            })
            .collect();

        Ok(summaries)
    }

    fn query(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<AuditEvent>> {
        let mut stmt = self.conn.prepare(sql)?;

        let events = stmt
            .query_map(args, |row| {
                let id: String = row.get(0)?;
                let timestamp: String = row.get(1)?;
                let actor: String = row.get(2)?;
                let scope: String = row.get(3)?;
                let required: u32 = row.get(4)?;
                let outcome: String = row.get(5)?;
                Ok((id, timestamp, actor, scope, required, outcome))
            })?
            .filter_map(|r| r.ok())
            .filter_map(|(id, timestamp, actor, scope, required, outcome)| {
                Some(AuditEvent {
                    id: id.parse::<Uuid>().ok()?,
                    timestamp: timestamp.parse().ok()?,
                    actor,
                    scope,
                    required: Permissions::from_mask(required),
                    outcome: serde_json::from_str::<Outcome>(&outcome).ok()?,
                })
            })
            .collect();

        Ok(events)
    }
}
