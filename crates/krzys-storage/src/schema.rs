// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Table definitions.
//!
//! The schema is created with `IF NOT EXISTS` on every start; there is no
//! versioned migration history. Column names are kept compatible with
//! existing `krzys.db` files.

use krzys_core::KrzysError;

use crate::database::{Database, map_tr_err};

/// Singleton status table and append-only history table.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS state (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    energy INTEGER NOT NULL,
    heart_rate INTEGER NOT NULL,
    temperature REAL NOT NULL,
    mood TEXT NOT NULL,
    last_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    who TEXT,
    content TEXT NOT NULL,
    ts TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_history_type_id ON history (type, id);
";

/// Create any missing tables and indexes.
pub async fn ensure_schema(db: &Database) -> Result<(), KrzysError> {
    db.connection()
        .call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::config_in;

    async fn table_names(db: &Database) -> Vec<String> {
        db.connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('state', 'history')
                     ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(map_tr_err)
            .unwrap()
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&config_in(&dir, "schema.db")).await.unwrap();

        ensure_schema(&db).await.unwrap();
        ensure_schema(&db).await.unwrap();

        assert_eq!(table_names(&db).await, vec!["history", "state"]);
    }

    #[tokio::test]
    async fn state_table_rejects_second_row() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&config_in(&dir, "check.db")).await.unwrap();
        ensure_schema(&db).await.unwrap();

        let result = db
            .connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO state (id, energy, heart_rate, temperature, mood, last_updated)
                     VALUES (2, 1, 1, 1.0, 'x', 'now')",
                    [],
                )
            })
            .await;
        assert!(result.is_err(), "CHECK (id = 1) should reject other ids");
    }
}
