// src/store/mod.rs

//! Document store seam.
//!
//! Records are JSON documents addressed by slash-separated paths. All
//! application data (profiles, results, share records, the email lookup
//! table and credentials) lives behind [`DocumentStore`], so the
//! synchronization logic never talks to a concrete database.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Key used by the server-timestamp sentinel: `{".sv": "timestamp"}`.
const SENTINEL_KEY: &str = ".sv";
const SENTINEL_VALUE: &str = "timestamp";

/// Buffer size for subscription channels.
pub const SUBSCRIPTION_BUFFER: usize = 16;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// How `put` treats an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the whole document.
    Replace,
    /// Deep-merge object fields into the existing document, creating it if absent.
    Merge,
}

/// Receiving half of a document subscription.
pub type DocumentStream = mpsc::Receiver<Value>;

/// Fully qualified document path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath(String);

impl DocPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the logical document paths under one application namespace.
#[derive(Debug, Clone)]
pub struct Paths {
    root: String,
}

impl Paths {
    pub fn new(app_id: &str) -> Self {
        Self {
            root: format!("artifacts/{}", app_id),
        }
    }

    fn join(&self, tail: String) -> DocPath {
        DocPath(format!("{}/{}", self.root, tail))
    }

    /// Private profile: `users/{uid}/profile/info`.
    pub fn profile(&self, uid: &str) -> DocPath {
        self.join(format!("users/{}/profile/info", uid))
    }

    /// Private classification result: `users/{uid}/data/testResults`.
    pub fn results(&self, uid: &str) -> DocPath {
        self.join(format!("users/{}/data/testResults", uid))
    }

    /// Public share record readable by a linked parent.
    pub fn share(&self, uid: &str) -> DocPath {
        self.join(format!("public/data/student_shares/{}", uid))
    }

    /// Public email -> uid lookup. `email` must already be normalized.
    pub fn user_map(&self, email: &str) -> DocPath {
        self.join(format!("public/data/user_map/{}", email))
    }

    /// Login credentials keyed by normalized email.
    pub fn credentials(&self, email: &str) -> DocPath {
        self.join(format!("auth/credentials/{}", email))
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read.
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError>;

    /// Full or merged upsert.
    async fn put(&self, path: &DocPath, doc: Value, mode: WriteMode) -> Result<(), StoreError>;

    /// Replaces top-level fields of an existing document.
    /// Fails with [`StoreError::NotFound`] when the document is absent.
    async fn update(&self, path: &DocPath, partial: Value) -> Result<(), StoreError>;

    /// Live updates for a single document. The current document, if any,
    /// is delivered first.
    async fn subscribe(&self, path: &DocPath) -> Result<DocumentStream, StoreError>;
}

/// Typed point read.
pub async fn get_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &DocPath,
) -> Result<Option<T>, StoreError> {
    match store.get(path).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

/// Sentinel asking the store to stamp the field with its own clock.
pub fn server_timestamp() -> Value {
    let mut map = Map::new();
    map.insert(
        SENTINEL_KEY.to_string(),
        Value::String(SENTINEL_VALUE.to_string()),
    );
    Value::Object(map)
}

fn is_sentinel(map: &Map<String, Value>) -> bool {
    map.len() == 1 && map.get(SENTINEL_KEY).and_then(Value::as_str) == Some(SENTINEL_VALUE)
}

/// Replaces every timestamp sentinel in `doc` with `now` (RFC 3339).
pub fn resolve_server_timestamps(doc: &mut Value, now: DateTime<Utc>) {
    if matches!(doc, Value::Object(map) if is_sentinel(map)) {
        *doc = Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true));
        return;
    }
    match doc {
        Value::Object(map) => {
            for value in map.values_mut() {
                resolve_server_timestamps(value, now);
            }
        }
        Value::Array(items) => {
            for value in items {
                resolve_server_timestamps(value, now);
            }
        }
        _ => {}
    }
}

/// Deep merge: nested objects are merged key by key, anything else is replaced.
pub fn merge_documents(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                let nested = value.is_object() && existing.get(&key).is_some_and(Value::is_object);
                match existing.get_mut(&key) {
                    Some(slot) if nested => merge_documents(slot, value),
                    _ => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Shallow update: each top-level field of `partial` replaces the stored one.
pub fn apply_update(target: &mut Value, partial: Value) -> Result<(), StoreError> {
    let Value::Object(fields) = partial else {
        return Err(StoreError::InvalidDocument(
            "update payload must be a JSON object".to_string(),
        ));
    };
    match target {
        Value::Object(existing) => {
            existing.extend(fields);
            Ok(())
        }
        _ => {
            *target = Value::Object(fields);
            Ok(())
        }
    }
}
