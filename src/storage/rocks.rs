//! RocksDB-backed session store
//!
//! Each session lives under `mines:session:<uuid>` as JSON together with its
//! absolute expiry time. RocksDB calls are blocking and run on the blocking pool.

use crate::common::traits::SessionStore;
use crate::errors::StoreError;
use crate::games::types::{GameSession, SessionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{Options, WriteBatch, DB};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const SESSION_PREFIX: &str = "mines:session:";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    expires_at: DateTime<Utc>,
    session: GameSession,
}

fn session_key(id: &SessionId) -> Vec<u8> {
    format!("{}{}", SESSION_PREFIX, id).into_bytes()
}

#[derive(Clone)]
pub struct RocksSessionStore {
    db: Arc<DB>,
}

impl RocksSessionStore {
    /// Open (or create) the database at `path`. With `clear_on_start` any
    /// existing data is destroyed first.
    pub fn open<P: AsRef<Path>>(path: P, clear_on_start: bool) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if clear_on_start && path.exists() {
            DB::destroy(&Options::default(), path)?;
            info!(path = %path.display(), "Cleared session database");
        }

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DB::open(&opts, path)?;
        info!(path = %path.display(), "Opened session database");
        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&DB) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| StoreError::Unavailable(format!("Store task failed: {}", e)))?
    }
}

fn decode(key: &[u8], bytes: &[u8]) -> Result<StoredSession, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| {
        StoreError::Corrupted(format!(
            "Failed to decode {}: {}",
            String::from_utf8_lossy(key),
            e
        ))
    })
}

#[async_trait]
impl SessionStore for RocksSessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<GameSession>, StoreError> {
        let key = session_key(id);
        self.blocking(move |db| {
            let Some(bytes) = db.get(&key)? else {
                return Ok(None);
            };

            let stored = decode(&key, &bytes)?;
            if stored.expires_at <= Utc::now() {
                db.delete(&key)?;
                return Ok(None);
            }
            Ok(Some(stored.session))
        })
        .await
    }

    async fn set(&self, session: &GameSession, ttl: Duration) -> Result<(), StoreError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StoreError::Unavailable(format!("Invalid ttl: {}", e)))?;
        let record = StoredSession {
            expires_at: Utc::now() + ttl,
            session: session.clone(),
        };
        let key = session_key(&session.id);
        let bytes = serde_json::to_vec(&record).map_err(|e| {
            StoreError::Unavailable(format!("Failed to encode session {}: {}", session.id, e))
        })?;

        self.blocking(move |db| Ok(db.put(&key, &bytes)?)).await
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        self.blocking(|db| {
            let now = Utc::now();
            let mut batch = WriteBatch::default();
            let mut purged = 0;

            for item in db.prefix_iterator(SESSION_PREFIX.as_bytes()) {
                let (key, value) = item?;
                if !key.starts_with(SESSION_PREFIX.as_bytes()) {
                    break;
                }
                // unreadable records are dropped along with expired ones
                let expired = decode(&key, &value)
                    .map(|stored| stored.expires_at <= now)
                    .unwrap_or(true);
                if expired {
                    batch.delete(&key);
                    purged += 1;
                }
            }

            if purged > 0 {
                db.write(batch)?;
            }
            Ok(purged)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "rocksdb"
    }
}
