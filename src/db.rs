use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

use crate::models::{NewPaste, Paste};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS paste (
    id TEXT PRIMARY KEY NOT NULL,
    content TEXT NOT NULL,
    created_at BIGINT NOT NULL,
    ttl_seconds BIGINT,
    max_views BIGINT,
    views BIGINT NOT NULL DEFAULT 0
)";

const PASTE_COLUMNS: &str = "id, content, created_at, ttl_seconds, max_views, views";

/// How long a writer waits for another writer's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to a sqlite database by URL, creating the file if needed.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Create the paste table if it does not exist yet.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Issue a no-op query to check that the database is reachable.
    pub async fn ping(&self) -> crate::ApiResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Insert a paste.
    ///
    /// Returns `None` if a paste with the same id already exists. Nothing is stored unless the
    /// inserted row also reads back.
    pub async fn insert_paste(&self, paste: &NewPaste<'_>) -> crate::ApiResult<Option<Paste>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query_as::<_, Paste>(&format!(
            "INSERT INTO paste (id, content, created_at, ttl_seconds, max_views, views) \
             VALUES (?, ?, ?, ?, ?, 0) RETURNING {PASTE_COLUMNS}"
        ))
        .bind(paste.id)
        .bind(paste.content)
        .bind(paste.created_at)
        .bind(paste.ttl_seconds)
        .bind(paste.max_views)
        .fetch_one(&mut *tx)
        .await;

        match result {
            Ok(paste) => {
                tx.commit().await?;
                Ok(Some(paste))
            }
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Check out a connection for the duration of one request.
    pub async fn session(&self) -> crate::ApiResult<Session> {
        Ok(Session {
            conn: self.pool.acquire().await?,
        })
    }
}

/// A pooled connection held by one request.
///
/// Each statement commits on its own, so a lookup never holds a lock that a later write has
/// to upgrade.
pub struct Session {
    conn: PoolConnection<Sqlite>,
}

impl Session {
    /// Get a paste by id.
    pub async fn get_paste(&mut self, id: &str) -> crate::ApiResult<Option<Paste>> {
        let paste =
            sqlx::query_as::<_, Paste>(&format!("SELECT {PASTE_COLUMNS} FROM paste WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *self.conn)
                .await?;
        Ok(paste)
    }

    /// Add one to a paste's view count, returning the new count.
    pub async fn increment_views(&mut self, id: &str) -> crate::ApiResult<i64> {
        let views = sqlx::query_scalar::<_, i64>(
            "UPDATE paste SET views = views + 1 WHERE id = ? RETURNING views",
        )
        .bind(id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn new_paste(id: &str) -> NewPaste<'_> {
        NewPaste {
            id,
            content: "hello",
            created_at: 1_000,
            ttl_seconds: None,
            max_views: Some(3),
        }
    }

    #[tokio::test]
    async fn insert_then_get() {
        let db = testing::database().await;

        let inserted = db.insert_paste(&new_paste("abc")).await.unwrap().unwrap();
        assert_eq!(inserted.views, 0);
        assert_eq!(inserted.ttl_seconds, None);
        assert_eq!(inserted.max_views, Some(3));

        let mut session = db.session().await.unwrap();
        let fetched = session.get_paste("abc").await.unwrap();
        assert_eq!(fetched, Some(inserted));
    }

    #[tokio::test]
    async fn absent_limits_read_back_as_none() {
        let db = testing::database().await;
        let paste = NewPaste {
            max_views: None,
            ..new_paste("plain")
        };

        let inserted = db.insert_paste(&paste).await.unwrap().unwrap();
        assert_eq!(inserted.ttl_seconds, None);
        assert_eq!(inserted.max_views, None);

        let mut session = db.session().await.unwrap();
        let fetched = session.get_paste("plain").await.unwrap().unwrap();
        assert_eq!(fetched.ttl_seconds, None);
        assert_eq!(fetched.max_views, None);
    }

    #[tokio::test]
    async fn large_integers_survive_a_round_trip() {
        let db = testing::database().await;
        let created_at = 1_700_000_000_000;
        let ttl_seconds = i64::MAX / 1000;
        let paste = NewPaste {
            created_at,
            ttl_seconds: Some(ttl_seconds),
            ..new_paste("big")
        };

        db.insert_paste(&paste).await.unwrap().unwrap();

        let mut session = db.session().await.unwrap();
        let fetched = session.get_paste("big").await.unwrap().unwrap();
        assert!(fetched.created_at > i64::from(i32::MAX));
        assert_eq!(fetched.created_at, created_at);
        assert_eq!(fetched.ttl_seconds, Some(ttl_seconds));
    }

    #[tokio::test]
    async fn duplicate_id_is_reported() {
        let db = testing::database().await;

        assert!(db.insert_paste(&new_paste("dup")).await.unwrap().is_some());
        assert!(db.insert_paste(&new_paste("dup")).await.unwrap().is_none());

        let mut session = db.session().await.unwrap();
        assert_eq!(session.get_paste("dup").await.unwrap().unwrap().views, 0);
    }

    #[tokio::test]
    async fn increments_are_persisted() {
        let db = testing::database().await;
        db.insert_paste(&new_paste("abc")).await.unwrap();

        {
            let mut session = db.session().await.unwrap();
            assert_eq!(session.increment_views("abc").await.unwrap(), 1);
            assert_eq!(session.increment_views("abc").await.unwrap(), 2);
        }

        let mut session = db.session().await.unwrap();
        let paste = session.get_paste("abc").await.unwrap().unwrap();
        assert_eq!(paste.views, 2);
    }

    #[tokio::test]
    async fn increment_of_missing_paste_is_not_found() {
        let db = testing::database().await;
        let mut session = db.session().await.unwrap();
        let result = session.increment_views("missing").await;
        assert!(matches!(result, Err(crate::error::ApiError::NotFound)));
    }

    #[tokio::test]
    async fn file_database_is_created_on_connect() {
        let (dir, db) = testing::file_database(2).await;
        db.ping().await.unwrap();
        assert!(dir.path().join("pastes.db").exists());
    }

    #[tokio::test]
    async fn ping_succeeds() {
        testing::database().await.ping().await.unwrap();
    }
}
