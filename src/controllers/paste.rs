use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::models::{NewPaste, Paste};
use crate::types::api::CreatePaste;
use crate::App;

/// How many fresh identifiers to try before giving up on a create.
const MAX_ID_ATTEMPTS: usize = 5;

/// Store a new paste, stamped with the app clock's current time.
///
/// Limits of zero or less are stored as absent.
pub async fn create(app: &App, input: CreatePaste) -> crate::ApiResult<Paste> {
    let created_at = app.clock.now_ms();
    let ttl_seconds = positive(input.ttl_seconds);
    let max_views = positive(input.max_views);

    for _ in 0..MAX_ID_ATTEMPTS {
        let id = app.ids.generate();
        let new_paste = NewPaste {
            id: &id,
            content: &input.content,
            created_at,
            ttl_seconds,
            max_views,
        };

        match app.database.insert_paste(&new_paste).await? {
            Some(paste) => {
                info!(
                    "new paste: id='{id}', size={size}, ttl_seconds={ttl_seconds:?}, \
                     max_views={max_views:?}",
                    size = paste.content.len()
                );
                return Ok(paste);
            }
            None => warn!("paste id collision: '{id}'"),
        }
    }

    Err(ApiError::IdSpaceExhausted {
        attempts: MAX_ID_ATTEMPTS,
    })
}

/// Read a paste, counting the read as a view.
///
/// Missing and expired pastes are both [`ApiError::NotFound`]. The lookup and the increment are
/// separate statements on one connection, so concurrent readers of a paste one view short of
/// its limit can each pass the check and the final count may overshoot `max_views`.
pub async fn view(app: &App, id: &str, now: i64) -> crate::ApiResult<Paste> {
    let mut session = app.database.session().await?;

    let mut paste = session.get_paste(id).await?.ok_or(ApiError::NotFound)?;

    if is_expired(&paste, now) {
        debug!("refusing expired paste: id='{id}', views={}", paste.views);
        return Err(ApiError::NotFound);
    }

    paste.views = session.increment_views(id).await?;

    Ok(paste)
}

/// Whether `paste` can no longer be read at time `now`.
///
/// A time limit passes strictly after `created_at + ttl_seconds * 1000`; a view limit is
/// reached as soon as `views >= max_views`. A paste with neither never expires.
pub fn is_expired(paste: &Paste, now: i64) -> bool {
    if let Some(expires_at) = paste.expires_at() {
        if now > expires_at {
            return true;
        }
    }

    if let Some(max_views) = paste.max_views {
        if paste.views >= max_views {
            return true;
        }
    }

    false
}

fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v > 0)
}
