use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::clock::Clock;
use crate::config::Config;
use crate::db::Database;
use crate::ids::IdGenerator;
use crate::App;

/// The time every test clock starts at.
pub const T0: i64 = 1_700_000_000_000;

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        FixedClock(AtomicI64::new(now_ms))
    }

    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Hands out a fixed list of identifiers in order, then `p1`, `p2`, ...
#[derive(Debug, Default)]
pub struct ScriptedIds {
    queue: Mutex<VecDeque<String>>,
    counter: AtomicUsize,
}

impl ScriptedIds {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedIds {
            queue: Mutex::new(ids.into_iter().map(Into::into).collect()),
            counter: AtomicUsize::new(0),
        }
    }
}

impl IdGenerator for ScriptedIds {
    fn generate(&self) -> String {
        if let Some(id) = self.queue.lock().unwrap().pop_front() {
            return id;
        }
        format!("p{}", self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// A fresh in-memory database with the schema applied.
pub async fn database() -> Database {
    let db = Database::connect("sqlite::memory:", 1).await.unwrap();
    db.migrate().await.unwrap();
    db
}

/// A database file in a fresh temporary directory, with the schema applied.
///
/// The directory is removed when the returned guard drops.
pub async fn file_database(max_connections: u32) -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("pastes.db").display());
    let db = Database::connect(&url, max_connections).await.unwrap();
    db.migrate().await.unwrap();
    (dir, db)
}

pub struct TestApp {
    pub app: App,
    pub clock: Arc<FixedClock>,
}

pub async fn app() -> TestApp {
    app_with_ids(ScriptedIds::default()).await
}

pub async fn app_with_ids(ids: impl IdGenerator + 'static) -> TestApp {
    app_with(database().await, ids)
}

pub fn app_with(database: Database, ids: impl IdGenerator + 'static) -> TestApp {
    let clock = Arc::new(FixedClock::new(T0));
    let app = App {
        config: Config::default(),
        database,
        ids: Arc::new(ids),
        clock: clock.clone(),
    };
    TestApp { app, clock }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_ids_drain_then_count() {
        let ids = ScriptedIds::new(["a", "a"]);
        assert_eq!(ids.generate(), "a");
        assert_eq!(ids.generate(), "a");
        assert_eq!(ids.generate(), "p1");
        assert_eq!(ids.generate(), "p2");
    }

    #[test]
    fn fixed_clock_holds_until_set() {
        let clock = FixedClock::new(5);
        assert_eq!(clock.now_ms(), 5);
        clock.set(10);
        assert_eq!(clock.now_ms(), 10);
    }
}
