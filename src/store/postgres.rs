// src/store/postgres.rs

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{PgPool, postgres::PgListener, types::Json};
use tokio::sync::{broadcast, mpsc};

use super::{
    DocPath, DocumentStore, DocumentStream, StoreError, SUBSCRIPTION_BUFFER, WriteMode,
    apply_update, merge_documents, resolve_server_timestamps,
};

/// Channel the `documents` trigger notifies on, with the changed path as payload.
const NOTIFY_CHANNEL: &str = "documents";

/// Documents stored as JSONB rows in the `documents` table.
///
/// One `LISTEN` connection, opened outside the request pool, feeds a
/// broadcast channel of changed paths that every subscription filters.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    changes: broadcast::Sender<String>,
}

impl PgDocumentStore {
    pub async fn connect(pool: PgPool, database_url: &str) -> Result<Self, StoreError> {
        let mut listener = PgListener::connect(database_url).await?;
        listener.listen(NOTIFY_CHANNEL).await?;

        let (changes, _) = broadcast::channel(256);
        let forward = changes.clone();
        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        // No subscribers is fine.
                        let _ = forward.send(notification.payload().to_string());
                    }
                    Err(e) => {
                        // `recv` reconnects on the next call.
                        tracing::warn!("Document listener error: {:?}", e);
                        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Ok(Self { pool, changes })
    }

    async fn upsert(
        executor: impl sqlx::PgExecutor<'_>,
        path: &DocPath,
        doc: Value,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (path, data, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (path) DO UPDATE SET
                data = EXCLUDED.data,
                updated_at = NOW()
            "#,
        )
        .bind(path.as_str())
        .bind(Json(doc))
        .execute(executor)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, StoreError> {
        let row: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT data FROM documents WHERE path = $1")
                .bind(path.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to read document {}: {:?}", path, e);
                    StoreError::from(e)
                })?;

        Ok(row.map(|(Json(doc),)| doc))
    }

    async fn put(&self, path: &DocPath, mut doc: Value, mode: WriteMode) -> Result<(), StoreError> {
        resolve_server_timestamps(&mut doc, Utc::now());

        if mode == WriteMode::Replace {
            return Self::upsert(&self.pool, path, doc).await;
        }

        // Merge: make sure the row exists, then lock it so concurrent merges
        // on the same path serialize even when they create the document.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO documents (path, data, updated_at)
            VALUES ($1, '{}'::jsonb, NOW())
            ON CONFLICT (path) DO NOTHING
            "#,
        )
        .bind(path.as_str())
        .execute(&mut *tx)
        .await?;

        let existing: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT data FROM documents WHERE path = $1 FOR UPDATE")
                .bind(path.as_str())
                .fetch_optional(&mut *tx)
                .await?;

        let merged = match existing {
            Some((Json(mut current),)) => {
                merge_documents(&mut current, doc);
                current
            }
            None => doc,
        };

        Self::upsert(&mut *tx, path, merged).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn update(&self, path: &DocPath, mut partial: Value) -> Result<(), StoreError> {
        resolve_server_timestamps(&mut partial, Utc::now());

        let mut tx = self.pool.begin().await?;

        let existing: Option<(Json<Value>,)> =
            sqlx::query_as("SELECT data FROM documents WHERE path = $1 FOR UPDATE")
                .bind(path.as_str())
                .fetch_optional(&mut *tx)
                .await?;

        let Some((Json(mut current),)) = existing else {
            return Err(StoreError::NotFound(path.to_string()));
        };

        apply_update(&mut current, partial)?;

        sqlx::query("UPDATE documents SET data = $2, updated_at = NOW() WHERE path = $1")
            .bind(path.as_str())
            .bind(Json(current))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    async fn subscribe(&self, path: &DocPath) -> Result<DocumentStream, StoreError> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let mut changes = self.changes.subscribe();

        if let Some(current) = self.get(path).await? {
            let _ = tx.send(current).await;
        }

        let store = self.clone();
        let watched = path.clone();
        tokio::spawn(async move {
            loop {
                let changed = tokio::select! {
                    _ = tx.closed() => break,
                    change = changes.recv() => match change {
                        Ok(changed) => changed,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!("Subscription on {} lagged by {} changes", watched, skipped);
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                };
                if changed != watched.as_str() {
                    continue;
                }
                match store.get(&watched).await {
                    Ok(Some(doc)) => {
                        if tx.send(doc).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("Failed to refresh {} after notify: {:?}", watched, e);
                    }
                }
            }
        });

        Ok(rx)
    }
}
