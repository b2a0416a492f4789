//! Store contracts for users, categories and todos.
//!
//! Every category/todo operation takes the owner id alongside the row id;
//! there is no way to reach a row by id alone. Tombstoned rows are invisible
//! to every read.

pub mod categories;
pub mod memory;
pub mod todos;
pub mod users;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        category::{Category, CategoryChanges, NewCategory},
        todo::{NewTodo, Todo, TodoChanges, TodoFilter},
        user::{NewUser, User},
    },
};

pub use categories::PgCategoryRepository;
pub use memory::MemoryStore;
pub use todos::PgTodoRepository;
pub use users::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Live user with this (already normalised) email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Fails with `Conflict` when a live user already owns the email.
    async fn create(&self, user: &NewUser) -> AppResult<User>;

    /// Oldest live user.
    async fn first(&self) -> AppResult<Option<User>>;

    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: &NewCategory) -> AppResult<Category>;

    /// Owner's live categories ordered by name.
    async fn list(&self, owner_id: i64) -> AppResult<Vec<Category>>;

    async fn find(&self, id: i64, owner_id: i64) -> AppResult<Option<Category>>;

    /// `None` when no live row matches `(id, owner_id)`.
    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        changes: &CategoryChanges,
    ) -> AppResult<Option<Category>>;

    /// Sets the tombstone. Returns `false` when nothing matched.
    async fn soft_delete(&self, id: i64, owner_id: i64) -> AppResult<bool>;

    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Inserts and returns the row with its category attached.
    async fn create(&self, todo: &NewTodo) -> AppResult<Todo>;

    /// One page of the owner's todos matching `filter`, newest first, and the
    /// total number of matches ignoring pagination.
    async fn list(&self, owner_id: i64, filter: &TodoFilter) -> AppResult<(Vec<Todo>, i64)>;

    async fn find(&self, id: i64, owner_id: i64) -> AppResult<Option<Todo>>;

    /// `None` when no live row matches `(id, owner_id)`.
    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        changes: &TodoChanges,
    ) -> AppResult<Option<Todo>>;

    /// Sets the tombstone. Returns `false` when nothing matched.
    async fn soft_delete(&self, id: i64, owner_id: i64) -> AppResult<bool>;

    async fn count(&self) -> AppResult<i64>;
}
