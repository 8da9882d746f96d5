//! SQLite implementation of [`VectorIndex`]
//!
//! Vectors are stored as little-endian f32 blobs and scored in memory, which
//! is plenty for a collection of a few thousand hymns.
//!
//! ## Database Schema
//!
//! ```sql
//! CREATE TABLE collections (
//!     name TEXT PRIMARY KEY,
//!     dimension INTEGER NOT NULL,
//!     distance TEXT NOT NULL,          -- "cosine" | "dot"
//!     created_at TIMESTAMP NOT NULL
//! );
//!
//! CREATE TABLE points (
//!     collection TEXT NOT NULL REFERENCES collections(name) ON DELETE CASCADE,
//!     id INTEGER NOT NULL,
//!     vector BLOB NOT NULL,            -- f32 vector
//!     payload TEXT NOT NULL,           -- JSON PointPayload
//!     PRIMARY KEY (collection, id)
//! );
//! ```

use super::{
    CollectionConfig, CollectionInfo, Distance, IndexedPoint, PointId, PointPayload, ScoredPoint,
    VectorIndex,
};
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;

/// SQLite-backed vector index.
#[derive(Clone, Debug)]
pub struct SqliteVectorIndex {
    pool: SqlitePool,
}

impl SqliteVectorIndex {
    /// Open (or create) an index file. The parent directory must exist.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = SqlitePool::connect_with(
            SqliteConnectOptions::new()
                .filename(path)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .busy_timeout(std::time::Duration::from_secs(5))
                .foreign_keys(true)
                .create_if_missing(true)
                .page_size(1 << 16),
        )
        .await
        .with_context(|| format!("Failed to open vector index at {}", path.display()))?;
        Self::new_with_pool(pool).await
    }

    /// In-memory index for tests. A single connection, since every SQLite
    /// memory connection is a separate database.
    pub async fn open_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true))
            .await?;
        Self::new_with_pool(pool).await
    }

    async fn new_with_pool(pool: SqlitePool) -> Result<Self> {
        Self::create_tables(&pool).await?;
        Ok(Self { pool })
    }

    async fn create_tables(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                name TEXT PRIMARY KEY,
                dimension INTEGER NOT NULL,
                distance TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS points (
                collection TEXT NOT NULL,
                id INTEGER NOT NULL,
                vector BLOB NOT NULL,
                payload TEXT NOT NULL,
                PRIMARY KEY (collection, id),
                FOREIGN KEY (collection) REFERENCES collections(name) ON DELETE CASCADE
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn collection_config(&self, name: &str) -> Result<Option<CollectionConfig>> {
        let row = sqlx::query("SELECT dimension, distance FROM collections WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<CollectionConfig> {
            let dimension: i64 = row.try_get("dimension")?;
            let distance: String = row.try_get("distance")?;
            Ok(CollectionConfig {
                dimension: dimension as usize,
                distance: distance.parse()?,
            })
        })
        .transpose()
    }

    async fn require_collection(&self, name: &str) -> Result<CollectionConfig> {
        self.collection_config(name)
            .await?
            .ok_or_else(|| anyhow!("Collection not found: {name}"))
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collection_config(name).await?.is_some())
    }

    async fn delete_collection(&self, name: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM points WHERE collection = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM collections WHERE name = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_collection(&self, name: &str, config: CollectionConfig) -> Result<()> {
        if config.dimension == 0 {
            bail!("Collection {name} needs a non-zero dimension");
        }
        if self.collection_exists(name).await? {
            bail!("Collection already exists: {name}");
        }

        sqlx::query(
            "INSERT INTO collections (name, dimension, distance, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(name)
        .bind(config.dimension as i64)
        .bind(config.distance.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert(&self, name: &str, points: Vec<IndexedPoint>) -> Result<()> {
        let config = self.require_collection(name).await?;

        if let Some(bad) = points.iter().find(|p| p.vector.len() != config.dimension) {
            bail!(
                "Point {} has dimension {}, collection {} expects {}",
                bad.id,
                bad.vector.len(),
                name,
                config.dimension
            );
        }

        let mut tx = self.pool.begin().await?;
        for point in &points {
            let payload = serde_json::to_string(&point.payload)?;
            sqlx::query(
                r#"
                INSERT INTO points (collection, id, vector, payload)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(collection, id) DO UPDATE SET
                    vector = excluded.vector,
                    payload = excluded.payload
                "#,
            )
            .bind(name)
            .bind(point.id as i64)
            .bind(bytemuck::cast_slice::<f32, u8>(&point.vector))
            .bind(payload)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn search(&self, name: &str, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>> {
        let config = self.require_collection(name).await?;
        if vector.len() != config.dimension {
            bail!(
                "Query has dimension {}, collection {} expects {}",
                vector.len(),
                name,
                config.dimension
            );
        }

        let rows = sqlx::query("SELECT id, vector, payload FROM points WHERE collection = ?1 ORDER BY id")
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let bytes: Vec<u8> = row.try_get("vector")?;
            let payload: String = row.try_get("payload")?;

            let stored = bytemuck::pod_collect_to_vec::<u8, f32>(&bytes);
            let score = match config.distance {
                Distance::Cosine => cosine_similarity(vector, &stored),
                Distance::Dot => dot_product(vector, &stored),
            };
            let payload: PointPayload = serde_json::from_str(&payload)
                .with_context(|| format!("Corrupt payload for point {id} in {name}"))?;

            scored.push(ScoredPoint {
                id: id as PointId,
                score,
                payload,
            });
        }

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn count(&self, name: &str) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM points WHERE collection = ?1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>> {
        let row = sqlx::query(
            "SELECT dimension, distance, created_at FROM collections WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let dimension: i64 = row.try_get("dimension")?;
        let distance: String = row.try_get("distance")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(Some(CollectionInfo {
            name: name.to_string(),
            dimension: dimension as usize,
            distance: distance.parse()?,
            created_at,
            points_count: self.count(name).await?,
        }))
    }
}

fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product(a, b) / (norm_a * norm_b)
    }
}
