use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub color: String, // hex color for UI
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by the category store on insert.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
}

/// Mutable columns of a category, persisted as a whole by the store.
#[derive(Debug, Clone)]
pub struct CategoryChanges {
    pub name: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
}

/// Empty strings leave the stored value untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
}
