//! Database model for sync log entries.

use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::warn;

use lumen_core::content::{EntityKind, SyncAction};
use lumen_core::sync::{SyncLogEntry, SyncOutcome};

use crate::schema::sync_logs;

fn outcome_to_str(outcome: SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Synced => "SYNCED",
        SyncOutcome::Failed => "FAILED",
    }
}

fn parse_outcome(value: &str) -> SyncOutcome {
    match value {
        "SYNCED" => SyncOutcome::Synced,
        "FAILED" => SyncOutcome::Failed,
        other => {
            warn!("Unknown sync outcome '{}' in log, treating as FAILED", other);
            SyncOutcome::Failed
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = sync_logs)]
pub struct SyncLogDB {
    pub id: String,
    pub entity_kind: String,
    pub entity_id: i64,
    pub action: String,
    pub status: String,
    pub secondary_id: Option<String>,
    pub error_message: Option<String>,
    pub actor: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<SyncLogEntry> for SyncLogDB {
    fn from(entry: SyncLogEntry) -> Self {
        Self {
            id: entry.id,
            entity_kind: entry.entity_kind.as_str().to_string(),
            entity_id: entry.entity_id,
            action: entry.action.as_str().to_string(),
            status: outcome_to_str(entry.status).to_string(),
            secondary_id: entry.secondary_id,
            error_message: entry.error_message,
            actor: entry.actor,
            created_at: entry.created_at.naive_utc(),
        }
    }
}

impl TryFrom<SyncLogDB> for SyncLogEntry {
    type Error = lumen_core::Error;

    fn try_from(db: SyncLogDB) -> Result<Self, Self::Error> {
        Ok(Self {
            entity_kind: EntityKind::from_str(&db.entity_kind)?,
            action: SyncAction::from_str(&db.action)?,
            status: parse_outcome(&db.status),
            id: db.id,
            entity_id: db.entity_id,
            secondary_id: db.secondary_id,
            error_message: db.error_message,
            actor: db.actor,
            created_at: db.created_at.and_utc(),
        })
    }
}
