//! String key-value persistence.
//!
//! The store only deals with raw strings; callers own the encoding. Two
//! backends are provided: [`SqliteStore`] for data that must survive a
//! restart and [`MemoryStore`] for ephemeral sessions.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, `None` if it was never written.
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Overwrite the value under `key`.
    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;

    async fn remove_item(&self, key: &str) -> anyhow::Result<()>;
}

/// Key-value table inside a sqlite database.
#[derive(Clone)]
pub struct SqliteStore {
    db_pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating when missing) the database at `addr` and make sure the
    /// table exists.
    pub async fn open(addr: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(addr)
            .with_context(|| format!("invalid database url {addr}"))?
            .create_if_missing(true);

        let db_pool = pool_options(addr)
            .connect_with(options)
            .await
            .with_context(|| format!("fail to open database {addr}"))?;

        Self::with_pool(db_pool).await
    }

    pub async fn with_pool(db_pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::query(
            r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)"#,
        )
        .execute(&db_pool)
        .await
        .with_context(|| "fail to create kv_store table")?;

        Ok(Self { db_pool })
    }
}

/// An in-memory database is shared between the pool's connections but is
/// gone once the last of them closes, so one connection is kept open for the
/// whole run.
fn pool_options(addr: &str) -> SqlitePoolOptions {
    if addr.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(4)
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db_pool)
            .await
            .with_context(|| format!("fail to read key {key}"))?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
INSERT INTO kv_store
    (key, value)
VALUES
    (?, ?)
ON CONFLICT(key) DO UPDATE SET value = excluded.value"#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db_pool)
        .await
        .with_context(|| format!("fail to write key {key}"))?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.db_pool)
            .await
            .with_context(|| format!("fail to remove key {key}"))?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        items.remove(key);
        Ok(())
    }
}
