//! Repository Implementation

use crate::model::{Observation, ObservationRecord};
use crate::StorageError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS weather_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    temperature_2m REAL NOT NULL,
    relative_humidity_2m REAL NOT NULL,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
)
"#;

// Window queries filter and sort on datetime(timestamp), so the indexes are on that expression.
const CREATE_INDEXES: [&str; 3] = [
    "DROP INDEX IF EXISTS idx_weather_data_timestamp",
    "CREATE INDEX IF NOT EXISTS idx_weather_data_time ON weather_data (datetime(timestamp))",
    "CREATE INDEX IF NOT EXISTS idx_weather_data_location_time \
     ON weather_data (latitude, longitude, datetime(timestamp))",
];

const INSERT_OBSERVATION: &str = r#"
INSERT INTO weather_data (timestamp, latitude, longitude, temperature_2m, relative_humidity_2m)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

// The window is anchored on the newest stored timestamp: (newest - window, newest].
const SELECT_RECENT: &str = r#"
SELECT id, timestamp, latitude, longitude, temperature_2m, relative_humidity_2m, created_at
FROM weather_data
WHERE datetime(timestamp) > datetime((SELECT MAX(datetime(timestamp)) FROM weather_data), ?1)
ORDER BY datetime(timestamp) ASC, id ASC
"#;

const SELECT_RECENT_AT: &str = r#"
SELECT id, timestamp, latitude, longitude, temperature_2m, relative_humidity_2m, created_at
FROM weather_data
WHERE latitude = ?2 AND longitude = ?3
  AND datetime(timestamp) > datetime(
        (SELECT MAX(datetime(timestamp)) FROM weather_data WHERE latitude = ?2 AND longitude = ?3),
        ?1)
ORDER BY datetime(timestamp) ASC, id ASC
"#;

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// SQLite URL, e.g. `sqlite://weather_data.db`
    pub url: String,
    /// Pool size
    pub max_connections: u32,
    /// Attempts made by [`Repository::connect_with_retry`]
    pub connect_retries: u32,
    /// Pause between connection attempts
    pub retry_delay: Duration,
    /// How long a writer waits on a locked database
    pub busy_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://weather_data.db".to_string(),
            max_connections: 5,
            connect_retries: 5,
            retry_delay: Duration::from_secs(1),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Repository for weather observations.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Open the database described by `config` and create the schema
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let repo = Self { pool };
        repo.init_schema().await?;
        info!("Opened SQLite repository at {}", config.url);
        Ok(repo)
    }

    /// Like [`Repository::connect`], retrying up to `connect_retries` times
    pub async fn connect_with_retry(config: &StorageConfig) -> Result<Self, StorageError> {
        let attempts = config.connect_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            info!("Attempting database connection ({}/{})", attempt, attempts);
            match Self::connect(config).await {
                Ok(repo) => {
                    repo.ping().await?;
                    return Ok(repo);
                }
                Err(e) => {
                    warn!("Database initialization failed: {}", e);
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(config.retry_delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            StorageError::Connection("no connection attempt was made".to_string())
        }))
    }

    /// Create a private in-memory repository (tests, ephemeral runs)
    pub async fn in_memory() -> Result<Self, StorageError> {
        // Every connection to :memory: is a separate database, so pin the pool to one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let repo = Self { pool };
        repo.init_schema().await?;
        debug!("Created in-memory repository");
        Ok(repo)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        for statement in CREATE_INDEXES {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Connectivity check
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Append observations in a single transaction; returns the number inserted
    pub async fn insert_batch(&self, rows: &[Observation]) -> Result<u64, StorageError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;
        for row in rows {
            let result = sqlx::query(INSERT_OBSERVATION)
                .bind(&row.timestamp)
                .bind(row.latitude)
                .bind(row.longitude)
                .bind(row.temperature_2m)
                .bind(row.relative_humidity_2m)
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;

        debug!("Inserted {} observations", inserted);
        Ok(inserted)
    }

    /// Rows within `window_hours` of the newest stored timestamp, oldest first
    pub async fn query_recent(
        &self,
        window_hours: u32,
    ) -> Result<Vec<ObservationRecord>, StorageError> {
        let modifier = window_modifier(window_hours)?;
        let rows = sqlx::query_as::<_, ObservationRecord>(SELECT_RECENT)
            .bind(modifier)
            .fetch_all(&self.pool)
            .await?;

        debug!("query_recent({}h) returned {} rows", window_hours, rows.len());
        Ok(rows)
    }

    /// Like [`Repository::query_recent`], restricted to one coordinate pair
    pub async fn query_recent_at(
        &self,
        latitude: f64,
        longitude: f64,
        window_hours: u32,
    ) -> Result<Vec<ObservationRecord>, StorageError> {
        let modifier = window_modifier(window_hours)?;
        let rows = sqlx::query_as::<_, ObservationRecord>(SELECT_RECENT_AT)
            .bind(modifier)
            .bind(latitude)
            .bind(longitude)
            .fetch_all(&self.pool)
            .await?;

        debug!(
            "query_recent_at({}, {}, {}h) returned {} rows",
            latitude,
            longitude,
            window_hours,
            rows.len()
        );
        Ok(rows)
    }

    /// Coordinates of the most recently inserted row
    pub async fn latest_location(&self) -> Result<Option<(f64, f64)>, StorageError> {
        let row = sqlx::query_as::<_, (f64, f64)>(
            "SELECT latitude, longitude FROM weather_data ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Total stored rows
    pub async fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weather_data")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn window_modifier(window_hours: u32) -> Result<String, StorageError> {
    if window_hours == 0 {
        return Err(StorageError::InvalidWindow(window_hours));
    }
    Ok(format!("-{} hours", window_hours))
}
