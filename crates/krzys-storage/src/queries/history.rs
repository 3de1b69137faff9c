// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append and query operations on the history log.
//!
//! Rows are never updated or deleted. Decoding happens outside the database
//! thread so a malformed row degrades to a warning instead of failing the
//! whole query.

use krzys_core::time::now_timestamp;
use krzys_core::types::{EntryKind, HistoryContent, HistoryEntry, HistoryQuery, Speaker};
use krzys_core::KrzysError;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter};
use tracing::{debug, warn};

use crate::database::{Database, map_tr_err};

/// A history row as stored, before decoding.
#[derive(Debug)]
struct StoredRow {
    id: i64,
    kind: String,
    who: Option<String>,
    content: String,
    ts: String,
}

/// Inserts one history row on `conn` and returns its id.
///
/// Shared by [`append`] and the status update transaction.
pub(crate) fn insert_row(
    conn: &rusqlite::Connection,
    kind: EntryKind,
    who: Option<Speaker>,
    content: &str,
    ts: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO history (type, who, content, ts) VALUES (?1, ?2, ?3, ?4)",
        params![kind.as_str(), who.map(|w| w.as_str()), content, ts],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Appends an entry stamped with the current time.
///
/// Returns the new row id and its timestamp.
pub async fn append(
    db: &Database,
    kind: EntryKind,
    who: Option<Speaker>,
    content: &HistoryContent,
) -> Result<(i64, String), KrzysError> {
    let encoded = content.encode().map_err(KrzysError::storage)?;
    let ts = now_timestamp();
    let stamp = ts.clone();

    let id = db
        .connection()
        .call(move |conn| insert_row(conn, kind, who, &encoded, &stamp))
        .await
        .map_err(map_tr_err)?;

    debug!(id, kind = %kind, "history entry appended");
    Ok((id, ts))
}

/// Returns entries matching `query`, newest (highest id) first.
pub async fn query(db: &Database, query: &HistoryQuery) -> Result<Vec<HistoryEntry>, KrzysError> {
    let mut sql = String::from("SELECT id, type, who, content, ts FROM history");
    let mut values: Vec<Value> = Vec::new();

    if !query.kinds.is_empty() {
        let placeholders = vec!["?"; query.kinds.len()].join(", ");
        sql.push_str(&format!(" WHERE type IN ({placeholders})"));
        values.extend(
            query
                .kinds
                .iter()
                .map(|kind| Value::Text(kind.as_str().to_string())),
        );
    }
    sql.push_str(" ORDER BY id DESC");
    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        values.push(Value::Integer(limit));
    }

    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<StoredRow>, rusqlite::Error> {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(values.iter()), |row| {
                    Ok(StoredRow {
                        id: row.get(0)?,
                        kind: lossy_text(row.get_ref(1)?).unwrap_or_default(),
                        who: lossy_text(row.get_ref(2)?),
                        content: lossy_text(row.get_ref(3)?).unwrap_or_default(),
                        ts: lossy_text(row.get_ref(4)?).unwrap_or_default(),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;

    Ok(rows.into_iter().filter_map(decode_row).collect())
}

/// Reads any SQLite value as text. Blobs and invalid UTF-8 are decoded lossily.
fn lossy_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Turns a stored row into an entry. Rows with an unknown type are skipped.
fn decode_row(row: StoredRow) -> Option<HistoryEntry> {
    let Ok(kind) = row.kind.parse::<EntryKind>() else {
        warn!(id = row.id, kind = %row.kind, "skipping history row with unknown type");
        return None;
    };

    let who = row.who.as_deref().and_then(|label| match label.parse::<Speaker>() {
        Ok(speaker) => Some(speaker),
        Err(_) => {
            warn!(id = row.id, who = label, "unknown speaker label in history row");
            None
        }
    });

    let content = HistoryContent::decode(kind, &row.content);
    if matches!(content, HistoryContent::Raw { .. }) {
        warn!(id = row.id, "history content is not valid JSON for its type");
    }

    Some(HistoryEntry {
        id: row.id,
        kind,
        who,
        content,
        ts: row.ts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::config_in;
    use crate::schema::ensure_schema;

    async fn setup(dir: &tempfile::TempDir) -> Database {
        let db = Database::open(&config_in(dir, "history.db")).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    async fn insert_raw(db: &Database, kind: &'static str, who: Option<&'static str>, content: &'static str) {
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO history (type, who, content, ts) VALUES (?1, ?2, ?3, ?4)",
                    params![kind, who, content, "2026-01-01T00:00:00.000000Z"],
                )
            })
            .await
            .map_err(map_tr_err)
            .unwrap();
    }

    fn ids(entries: &[HistoryEntry]) -> Vec<i64> {
        entries.iter().map(|e| e.id).collect()
    }

    /// Ids 1..=5 alternating state, comm, state, comm, state.
    async fn seed_alternating(db: &Database) {
        for kind in ["state", "comm", "state", "comm", "state"] {
            if kind == "comm" {
                insert_raw(db, kind, Some("user"), r#"{"message":"hi"}"#).await;
            } else {
                insert_raw(db, kind, None, "{}").await;
            }
        }
    }

    #[tokio::test]
    async fn newest_first_with_limit_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup(&dir).await;
        seed_alternating(&db).await;

        let all = query(&db, &HistoryQuery::all()).await.unwrap();
        assert_eq!(ids(&all), vec![5, 4, 3, 2, 1]);

        let comm = query(&db, &HistoryQuery::all().with_kind(EntryKind::Comm))
            .await
            .unwrap();
        assert_eq!(ids(&comm), vec![4, 2]);

        let limited = query(&db, &HistoryQuery::all().with_limit(2)).await.unwrap();
        assert_eq!(ids(&limited), vec![5, 4]);

        let both = HistoryQuery::all()
            .with_kind(EntryKind::State)
            .with_kind(EntryKind::Comm)
            .with_limit(3);
        assert_eq!(ids(&query(&db, &both).await.unwrap()), vec![5, 4, 3]);
    }

    #[tokio::test]
    async fn append_returns_timestamp_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup(&dir).await;

        let (id, ts) = append(
            &db,
            EntryKind::Comm,
            Some(Speaker::Krzys),
            &HistoryContent::message("hello"),
        )
        .await
        .unwrap();
        assert_eq!(id, 1);
        assert!(ts.ends_with('Z'));

        let entries = query(&db, &HistoryQuery::all()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].who, Some(Speaker::Krzys));
        assert_eq!(entries[0].ts, ts);
        assert_eq!(entries[0].content, HistoryContent::message("hello"));
    }

    #[tokio::test]
    async fn corrupt_content_degrades_to_raw() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup(&dir).await;
        insert_raw(&db, "comm", Some("user"), "not json").await;

        let entries = query(&db, &HistoryQuery::all()).await.unwrap();
        assert_eq!(
            entries[0].content,
            HistoryContent::Raw {
                raw: "not json".to_string()
            }
        );
        let json = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(json["content"], serde_json::json!({ "raw": "not json" }));
    }

    #[tokio::test]
    async fn non_utf8_and_blob_content_do_not_abort_query() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup(&dir).await;
        insert_raw(&db, "comm", Some("user"), r#"{"message":"first"}"#).await;
        db.connection()
            .call(|conn| {
                conn.execute_batch(
                    "INSERT INTO history (type, who, content, ts) \
                     VALUES ('comm', 'user', CAST(X'FF' AS TEXT), '2026-01-01T00:00:00.000000Z');\
                     INSERT INTO history (type, who, content, ts) \
                     VALUES ('comm', 'krzys', X'7B226D657373616765223A22626C6F62227D', \
                             '2026-01-01T00:00:00.000000Z');",
                )
            })
            .await
            .map_err(map_tr_err)
            .unwrap();
        insert_raw(&db, "comm", Some("user"), r#"{"message":"last"}"#).await;

        let entries = query(&db, &HistoryQuery::all()).await.unwrap();
        assert_eq!(ids(&entries), vec![4, 3, 2, 1]);
        assert_eq!(entries[0].content, HistoryContent::message("last"));
        assert_eq!(entries[1].content, HistoryContent::message("blob"));
        assert_eq!(
            entries[2].content,
            HistoryContent::Raw {
                raw: "\u{FFFD}".to_string()
            }
        );
        assert_eq!(entries[3].content, HistoryContent::message("first"));
    }

    #[tokio::test]
    async fn unknown_type_is_skipped_and_unknown_speaker_is_null() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup(&dir).await;
        insert_raw(&db, "note", None, "{}").await;
        insert_raw(&db, "comm", Some("robot"), r#"{"message":"beep"}"#).await;

        let entries = query(&db, &HistoryQuery::all()).await.unwrap();
        assert_eq!(ids(&entries), vec![2]);
        assert_eq!(entries[0].who, None);
    }
}
