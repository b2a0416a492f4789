use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::category::Category;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(anyhow::anyhow!("Unknown priority: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Todo,
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::Done => "done",
        }
    }

    /// `todo` becomes `done`; every other state goes back to `todo`.
    pub fn toggled(self) -> Status {
        if self == Status::Todo {
            Status::Done
        } else {
            Status::Todo
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Status::Todo),
            "done" => Ok(Status::Done),
            _ => Err(anyhow::anyhow!("Unknown status: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Flat row produced by the todo query joined with its category.
/// priority/status are fetched as TEXT and parsed on conversion.
#[derive(Debug, FromRow)]
pub struct TodoRow {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cat_id: Option<i64>,
    pub cat_user_id: Option<i64>,
    pub cat_name: Option<String>,
    pub cat_description: Option<String>,
    pub cat_color: Option<String>,
    pub cat_created_at: Option<DateTime<Utc>>,
    pub cat_updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = anyhow::Error;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let category = match (
            row.cat_id,
            row.cat_user_id,
            row.cat_name,
            row.cat_created_at,
            row.cat_updated_at,
        ) {
            (Some(id), Some(user_id), Some(name), Some(created_at), Some(updated_at)) => {
                Some(Category {
                    id,
                    user_id,
                    name,
                    description: row.cat_description.unwrap_or_default(),
                    color: row.cat_color.unwrap_or_default(),
                    created_at,
                    updated_at,
                })
            }
            _ => None,
        };

        Ok(Todo {
            id: row.id,
            user_id: row.user_id,
            category_id: row.category_id,
            title: row.title,
            description: row.description,
            deadline: row.deadline,
            priority: row.priority.parse()?,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category,
        })
    }
}

/// Values written by the todo store on insert.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
}

/// Mutable columns of a todo, persisted as a whole by the store.
#[derive(Debug, Clone)]
pub struct TodoChanges {
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: Status,
}

impl From<&Todo> for TodoChanges {
    fn from(todo: &Todo) -> Self {
        TodoChanges {
            category_id: todo.category_id,
            title: todo.title.clone(),
            description: todo.description.clone(),
            deadline: todo.deadline,
            priority: todo.priority,
            status: todo.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: String,
}

/// Empty strings and missing fields leave the stored value untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<i64>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub status: String,
}

/// Raw `GET /todos` query string. Values are parsed leniently by the handler.
#[derive(Debug, Default, Deserialize)]
pub struct TodoQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category_id: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Conjunctive filter applied by the todo store. `page`/`limit` are
/// normalised by the service before reaching the store.
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub category_id: Option<i64>,
    pub keyword: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl TodoFilter {
    /// Rows to skip for `page`. Saturates so an absurd page lands past the end.
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit.max(0))
    }
}

/// One page of todos plus the number of rows matching the filter overall.
#[derive(Debug, Clone)]
pub struct TodoPage {
    pub todos: Vec<Todo>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}
