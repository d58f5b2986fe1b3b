// SQLite sample store. The probe worker appends rows; the report pass reads
// bucketed sums back out.

use crate::models::{MetricPoint, SampleBucket};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

pub struct SampleRepo {
    pool: SqlitePool,
    retention_ms: i64,
}

impl SampleRepo {
    pub async fn connect(path: &str, max_pool_size: u32, retention_days: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        let retention_ms = (retention_days as i64) * 24 * 60 * 60 * 1000;
        Ok(Self { pool, retention_ms })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS health_samples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resource TEXT NOT NULL,
                metric TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                value REAL NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_samples_resource_metric_created_at ON health_samples(resource, metric, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a batch of points in one transaction, all stamped with
    /// `timestamp_ms`.
    #[instrument(skip(self, points), fields(repo = "samples", operation = "record_points", points_count = points.len()))]
    pub async fn record_points(&self, points: &[MetricPoint], timestamp_ms: i64) -> anyhow::Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for p in points {
            sqlx::query(
                "INSERT INTO health_samples (resource, metric, created_at, value) VALUES ($1, $2, $3, $4)",
            )
            .bind(&p.resource)
            .bind(&p.metric)
            .bind(timestamp_ms)
            .bind(p.value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Sums of one (resource, metric) pair over `[start, end)`, grouped into
    /// `bucket_seconds`-wide buckets aligned to the epoch. Intervals with no
    /// rows produce no bucket; zero buckets is a valid result. Order:
    /// ascending by bucket start.
    #[instrument(
        skip(self),
        fields(repo = "samples", operation = "fetch_sum_samples")
    )]
    pub async fn fetch_sum_samples(
        &self,
        resource: &str,
        metric: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        bucket_seconds: u32,
    ) -> anyhow::Result<Vec<SampleBucket>> {
        let bucket_ms = (bucket_seconds as i64) * 1000;
        let rows = sqlx::query(
            r#"
            SELECT (created_at / $1) * $1 AS bucket_start, SUM(value) AS value_sum
            FROM health_samples
            WHERE resource = $2 AND metric = $3 AND created_at >= $4 AND created_at < $5
            GROUP BY bucket_start
            ORDER BY bucket_start ASC
            "#,
        )
        .bind(bucket_ms)
        .bind(resource)
        .bind(metric)
        .bind(start.timestamp_millis())
        .bind(end.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let bucket_start_ms: i64 = row.try_get("bucket_start")?;
            let sum: f64 = row.try_get("value_sum")?;
            let bucket_start = Utc
                .timestamp_millis_opt(bucket_start_ms)
                .single()
                .ok_or_else(|| anyhow::anyhow!("bucket start {} out of range", bucket_start_ms))?;
            out.push(SampleBucket { bucket_start, sum });
        }
        Ok(out)
    }

    /// Deletes samples older than the retention window. Returns rows removed.
    pub async fn prune_old_data(&self) -> anyhow::Result<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let cutoff = now_ms - self.retention_ms;
        let result = sqlx::query("DELETE FROM health_samples WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn vacuum(&self) -> anyhow::Result<()> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }
}
