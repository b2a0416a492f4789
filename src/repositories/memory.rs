//! Process-local implementation of all three stores.
//!
//! Backs `STORAGE=memory` runs and the test suites. Rows are never removed;
//! deletes set the tombstone exactly like the Postgres stores.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CategoryRepository, TodoRepository, UserRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        category::{Category, CategoryChanges, NewCategory},
        todo::{NewTodo, Todo, TodoChanges, TodoFilter},
        user::{NewUser, User},
    },
};

struct Stored<T> {
    row: T,
    deleted_at: Option<DateTime<Utc>>,
}

impl<T> Stored<T> {
    fn new(row: T) -> Self {
        Self { row, deleted_at: None }
    }

    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<Stored<User>>,
    categories: Vec<Stored<Category>>,
    todos: Vec<Stored<Todo>>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_category(&self, id: i64) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.is_live() && c.row.id == id)
            .map(|c| &c.row)
    }

    /// Clone of the todo with its live category attached.
    fn hydrate(&self, todo: &Todo) -> Todo {
        let mut todo = todo.clone();
        todo.category = todo
            .category_id
            .and_then(|id| self.live_category(id))
            .cloned();
        todo
    }
}

/// Shared in-memory tables. Cloning yields another handle to the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store lock poisoned")))
    }
}

fn matches_filter(todo: &Todo, filter: &TodoFilter) -> bool {
    if filter.status.is_some_and(|s| s != todo.status) {
        return false;
    }
    if filter.priority.is_some_and(|p| p != todo.priority) {
        return false;
    }
    if let Some(category_id) = filter.category_id.filter(|id| *id > 0) {
        if todo.category_id != Some(category_id) {
            return false;
        }
    }
    if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.is_empty()) {
        let keyword = keyword.to_lowercase();
        if !todo.title.to_lowercase().contains(&keyword)
            && !todo.description.to_lowercase().contains(&keyword)
        {
            return false;
        }
    }
    true
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .find(|u| u.is_live() && u.row.email == email)
            .map(|u| u.row.clone()))
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.is_live() && u.row.email == user.email) {
            return Err(AppError::conflict("user already exists"));
        }
        let now = Utc::now();
        let created = User {
            id: tables.next_id(),
            email: user.email.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(Stored::new(created.clone()));
        Ok(created)
    }

    async fn first(&self) -> AppResult<Option<User>> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .iter()
            .filter(|u| u.is_live())
            .min_by_key(|u| u.row.id)
            .map(|u| u.row.clone()))
    }

    async fn count(&self) -> AppResult<i64> {
        let tables = self.lock()?;
        Ok(tables.users.iter().filter(|u| u.is_live()).count() as i64)
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, category: &NewCategory) -> AppResult<Category> {
        let mut tables = self.lock()?;
        let now = Utc::now();
        let created = Category {
            id: tables.next_id(),
            user_id: category.user_id,
            name: category.name.clone(),
            description: category.description.clone(),
            color: category.color.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(Stored::new(created.clone()));
        Ok(created)
    }

    async fn list(&self, owner_id: i64) -> AppResult<Vec<Category>> {
        let tables = self.lock()?;
        let mut categories: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| c.is_live() && c.row.user_id == owner_id)
            .map(|c| c.row.clone())
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn find(&self, id: i64, owner_id: i64) -> AppResult<Option<Category>> {
        let tables = self.lock()?;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.is_live() && c.row.id == id && c.row.user_id == owner_id)
            .map(|c| c.row.clone()))
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        changes: &CategoryChanges,
    ) -> AppResult<Option<Category>> {
        let mut tables = self.lock()?;
        let Some(stored) = tables
            .categories
            .iter_mut()
            .find(|c| c.is_live() && c.row.id == id && c.row.user_id == owner_id)
        else {
            return Ok(None);
        };
        stored.row.name = changes.name.clone();
        stored.row.description = changes.description.clone();
        stored.row.color = changes.color.clone();
        stored.row.updated_at = Utc::now();
        Ok(Some(stored.row.clone()))
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> AppResult<bool> {
        let mut tables = self.lock()?;
        match tables
            .categories
            .iter_mut()
            .find(|c| c.is_live() && c.row.id == id && c.row.user_id == owner_id)
        {
            Some(stored) => {
                stored.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> AppResult<i64> {
        let tables = self.lock()?;
        Ok(tables.categories.iter().filter(|c| c.is_live()).count() as i64)
    }
}

#[async_trait]
impl TodoRepository for MemoryStore {
    async fn create(&self, todo: &NewTodo) -> AppResult<Todo> {
        let mut tables = self.lock()?;
        let now = Utc::now();
        let created = Todo {
            id: tables.next_id(),
            user_id: todo.user_id,
            category_id: todo.category_id,
            title: todo.title.clone(),
            description: todo.description.clone(),
            deadline: todo.deadline,
            priority: todo.priority,
            status: todo.status,
            created_at: now,
            updated_at: now,
            category: None,
        };
        tables.todos.push(Stored::new(created.clone()));
        Ok(tables.hydrate(&created))
    }

    async fn list(&self, owner_id: i64, filter: &TodoFilter) -> AppResult<(Vec<Todo>, i64)> {
        let tables = self.lock()?;
        let mut matching: Vec<&Todo> = tables
            .todos
            .iter()
            .filter(|t| t.is_live() && t.row.user_id == owner_id)
            .map(|t| &t.row)
            .filter(|t| matches_filter(t, filter))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset().max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .map(|t| tables.hydrate(t))
            .collect();
        Ok((page, total))
    }

    async fn find(&self, id: i64, owner_id: i64) -> AppResult<Option<Todo>> {
        let tables = self.lock()?;
        Ok(tables
            .todos
            .iter()
            .find(|t| t.is_live() && t.row.id == id && t.row.user_id == owner_id)
            .map(|t| tables.hydrate(&t.row)))
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        changes: &TodoChanges,
    ) -> AppResult<Option<Todo>> {
        let mut tables = self.lock()?;
        let Some(stored) = tables
            .todos
            .iter_mut()
            .find(|t| t.is_live() && t.row.id == id && t.row.user_id == owner_id)
        else {
            return Ok(None);
        };
        stored.row.category_id = changes.category_id;
        stored.row.title = changes.title.clone();
        stored.row.description = changes.description.clone();
        stored.row.deadline = changes.deadline;
        stored.row.priority = changes.priority;
        stored.row.status = changes.status;
        stored.row.updated_at = Utc::now();
        let updated = stored.row.clone();
        Ok(Some(tables.hydrate(&updated)))
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> AppResult<bool> {
        let mut tables = self.lock()?;
        match tables
            .todos
            .iter_mut()
            .find(|t| t.is_live() && t.row.id == id && t.row.user_id == owner_id)
        {
            Some(stored) => {
                stored.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> AppResult<i64> {
        let tables = self.lock()?;
        Ok(tables.todos.iter().filter(|t| t.is_live()).count() as i64)
    }
}
