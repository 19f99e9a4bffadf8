//! Persistent HTTP response cache keyed by request URL.
//!
//! Entries carry an absolute expiry; an expired entry is removed on read and
//! reported as a miss. Only bodies of successful responses are stored.

use anyhow::{Result, anyhow};
use fjall::Keyspace;
use rand::RngExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    body: Vec<u8>,
    expires_at: u64, // Unix timestamp (seconds)
}

#[derive(Clone)]
pub struct ResponseCache {
    store: Keyspace,
    ttl: Duration,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

impl ResponseCache {
    pub fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("responses", fjall::KeyspaceCreateOptions::default)?;
        Ok(ResponseCache { store: items, ttl })
    }

    /// Stores a response body under `url` for the configured TTL, jittered by +/-10%.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, body))]
    pub async fn put(&self, url: &str, body: Vec<u8>) -> Result<()> {
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        self.put_with_ttl(url, body, self.ttl.mul_f64(jitter)).await
    }

    pub async fn put_with_ttl(&self, url: &str, body: Vec<u8>, ttl: Duration) -> Result<()> {
        let store = self.store.clone();
        let key = url.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { body, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Returns the cached body if present and not expired.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let store = self.store.clone();
        let key_bytes = url.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry = postcard::from_bytes(&bytes)?;
        if now_secs()? < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.body))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(url).await?;
            Ok(None)
        }
    }

    pub async fn remove(&self, url: &str) -> Result<()> {
        let key = url.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}
