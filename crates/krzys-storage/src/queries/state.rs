// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queries on the singleton status row.

use krzys_core::time::{next_timestamp, now_timestamp};
use krzys_core::types::{EntryKind, HistoryContent, STATUS_ROW_ID, StateChange};
use krzys_core::{KrzysError, StatusChanges, StatusRecord};
use rusqlite::{OptionalExtension, params};
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::queries::history::insert_row;

const SELECT_STATUS: &str = "SELECT energy, heart_rate, temperature, mood, last_updated
     FROM state WHERE id = ?1";

fn row_to_status(row: &rusqlite::Row<'_>) -> rusqlite::Result<StatusRecord> {
    Ok(StatusRecord {
        energy: row.get(0)?,
        heart_rate: row.get(1)?,
        temperature: row.get(2)?,
        mood: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn read_status(conn: &rusqlite::Connection) -> rusqlite::Result<Option<StatusRecord>> {
    conn.query_row(SELECT_STATUS, params![STATUS_ROW_ID], row_to_status)
        .optional()
}

/// Inserts the default record if the row does not exist yet.
///
/// Returns `true` when a row was inserted.
pub async fn seed_status(db: &Database) -> Result<bool, KrzysError> {
    let seed = StatusRecord::seed(now_timestamp());
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO state
                     (id, energy, heart_rate, temperature, mood, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    STATUS_ROW_ID,
                    seed.energy,
                    seed.heart_rate,
                    seed.temperature,
                    seed.mood,
                    seed.updated_at,
                ],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Reads the status record. `None` if the row is missing.
pub async fn get_status(db: &Database) -> Result<Option<StatusRecord>, KrzysError> {
    db.connection()
        .call(|conn| read_status(conn))
        .await
        .map_err(map_tr_err)
}

/// Merges `changes` into the stored record and appends the matching `state`
/// history entry, in one transaction.
///
/// `changes` must already be validated. Returns `None` if the row is missing.
pub async fn apply_update(
    db: &Database,
    changes: StatusChanges,
) -> Result<Option<StatusRecord>, KrzysError> {
    let updated = db
        .connection()
        .call(move |conn| -> Result<Option<StatusRecord>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let Some(current) = read_status(&tx)? else {
                return Ok(None);
            };

            let updated = changes.apply_to(&current, next_timestamp(&current.updated_at));
            tx.execute(
                "UPDATE state
                 SET energy = ?1, heart_rate = ?2, temperature = ?3, mood = ?4, last_updated = ?5
                 WHERE id = ?6",
                params![
                    updated.energy,
                    updated.heart_rate,
                    updated.temperature,
                    updated.mood,
                    updated.updated_at,
                    STATUS_ROW_ID,
                ],
            )?;

            let content = HistoryContent::State(StateChange {
                changed: changes,
                state: updated.clone(),
            })
            .encode()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            insert_row(&tx, EntryKind::State, None, &content, &updated.updated_at)?;

            tx.commit()?;
            Ok(Some(updated))
        })
        .await
        .map_err(map_tr_err)?;

    if let Some(record) = &updated {
        debug!(updated_at = %record.updated_at, "status updated");
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::config_in;
    use crate::queries::history;
    use crate::schema::ensure_schema;
    use krzys_core::HistoryQuery;

    async fn setup(dir: &tempfile::TempDir) -> Database {
        let db = Database::open(&config_in(dir, "state.db")).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    #[tokio::test]
    async fn missing_row_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup(&dir).await;
        assert!(get_status(&db).await.unwrap().is_none());

        let changes = StatusChanges {
            energy: Some(1),
            ..Default::default()
        };
        assert!(apply_update(&db, changes).await.unwrap().is_none());
        assert!(history::query(&db, &HistoryQuery::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn seed_only_inserts_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup(&dir).await;

        assert!(seed_status(&db).await.unwrap());
        let first = get_status(&db).await.unwrap().unwrap();
        assert!(!seed_status(&db).await.unwrap());
        assert_eq!(get_status(&db).await.unwrap().unwrap(), first);
        assert_eq!(first.mood, "neutral");
    }

    #[tokio::test]
    async fn update_writes_record_and_history_together() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup(&dir).await;
        seed_status(&db).await.unwrap();
        let before = get_status(&db).await.unwrap().unwrap();

        let changes = StatusChanges {
            mood: Some("happy".to_string()),
            ..Default::default()
        };
        let updated = apply_update(&db, changes.clone()).await.unwrap().unwrap();
        assert_eq!(updated.mood, "happy");
        assert_eq!(updated.energy, before.energy);
        assert!(updated.updated_at >= before.updated_at);
        assert_eq!(get_status(&db).await.unwrap().unwrap(), updated);

        let entries = history::query(&db, &HistoryQuery::all()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::State);
        assert_eq!(entries[0].who, None);
        assert_eq!(entries[0].ts, updated.updated_at);
        assert_eq!(
            entries[0].content,
            HistoryContent::State(StateChange {
                changed: changes,
                state: updated,
            })
        );
    }
}
