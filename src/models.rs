use sqlx::FromRow;

/// A stored paste.
///
/// Timestamps are milliseconds since the Unix epoch. `ttl_seconds` and `max_views` are either
/// absent or strictly positive.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Paste {
    pub id: String,
    pub content: String,
    pub created_at: i64,
    pub ttl_seconds: Option<i64>,
    pub max_views: Option<i64>,
    pub views: i64,
}

impl Paste {
    /// The instant after which the time limit has passed, if there is one.
    pub fn expires_at(&self) -> Option<i64> {
        self.ttl_seconds
            .map(|ttl| self.created_at.saturating_add(ttl.saturating_mul(1000)))
    }
}

/// The fields of a paste supplied at creation time.
#[derive(Debug, Clone)]
pub struct NewPaste<'a> {
    pub id: &'a str,
    pub content: &'a str,
    pub created_at: i64,
    pub ttl_seconds: Option<i64>,
    pub max_views: Option<i64>,
}
