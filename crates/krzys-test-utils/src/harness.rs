// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full service (temp SQLite database, storage
//! adapter, axum router, optional front-end directory) and drives HTTP
//! requests through the router in-process, without binding a socket.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use krzys_config::model::StorageConfig;
use krzys_core::types::{EntryKind, HistoryContent, Speaker};
use krzys_core::{HistoryLog, KrzysError, StorageAdapter};
use krzys_gateway::{AppState, router};
use krzys_storage::SqliteStorage;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    frontend_files: Vec<(String, String)>,
    messages: Vec<(Speaker, String)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            frontend_files: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Add a file to the front-end directory. The directory is only created
    /// when at least one file is added.
    pub fn with_frontend_file(mut self, name: &str, contents: &str) -> Self {
        self.frontend_files
            .push((name.to_string(), contents.to_string()));
        self
    }

    /// Pre-populate the history log with a message.
    pub fn with_message(mut self, who: Speaker, text: &str) -> Self {
        self.messages.push((who, text.to_string()));
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, KrzysError> {
        let temp_dir = tempfile::TempDir::new().map_err(KrzysError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let frontend_dir = if self.frontend_files.is_empty() {
            None
        } else {
            let dir = temp_dir.path().join("frontend");
            std::fs::create_dir_all(&dir).map_err(KrzysError::storage)?;
            for (name, contents) in &self.frontend_files {
                std::fs::write(dir.join(name), contents).map_err(KrzysError::storage)?;
            }
            Some(dir)
        };

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        });
        storage.initialize().await?;
        let storage = Arc::new(storage);

        for (who, text) in self.messages {
            storage
                .append(EntryKind::Comm, Some(who), HistoryContent::message(text))
                .await?;
        }

        let app = router(AppState::new(storage.clone(), frontend_dir));

        Ok(TestHarness {
            storage,
            app,
            db_path,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment backed by a temp SQLite database.
pub struct TestHarness {
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// The application router, wired to `storage`.
    pub app: Router,
    /// Path of the temp database file.
    pub db_path: PathBuf,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send one request through the router and return status and raw body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));
        let Ok(request) = builder.body(body) else {
            panic!("invalid test request for {uri}");
        };

        let response = match self.app.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        (status, bytes.to_vec())
    }

    /// GET `uri` and parse the body as JSON.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, bytes) = self.request(Method::GET, uri, None).await;
        (status, parse(&bytes))
    }

    /// POST a JSON `body` to `uri` and parse the response as JSON.
    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let (status, bytes) = self
            .request(Method::POST, uri, Some(&body.to_string()))
            .await;
        (status, parse(&bytes))
    }

    /// GET `uri` and return the body as text.
    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let (status, bytes) = self.request(Method::GET, uri, None).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn parse(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or(Value::Null)
}
