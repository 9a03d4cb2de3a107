use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Paste;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaste {
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
    #[serde(default)]
    pub ttl_seconds: Option<i64>,
    #[serde(default)]
    pub max_views: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedPaste {
    pub id: String,
    pub content: String,
    pub ttl_seconds: Option<i64>,
    pub max_views: Option<i64>,
}

impl From<Paste> for CreatedPaste {
    fn from(paste: Paste) -> Self {
        CreatedPaste {
            id: paste.id,
            content: paste.content,
            ttl_seconds: paste.ttl_seconds,
            max_views: paste.max_views,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewedPaste {
    pub id: String,
    pub content: String,
    pub views: i64,
}

impl From<Paste> for ViewedPaste {
    fn from(paste: Paste) -> Self {
        ViewedPaste {
            id: paste.id,
            content: paste.content,
            views: paste.views,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
}
