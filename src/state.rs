use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::Config,
    repositories::{
        CategoryRepository, MemoryStore, PgCategoryRepository, PgTodoRepository, PgUserRepository,
        TodoRepository, UserRepository,
    },
    services::{
        auth::AuthService, categories::CategoryService, seeder::Seeder, todos::TodoService,
    },
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub todos: Arc<dyn TodoRepository>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn postgres(pool: PgPool, config: Arc<Config>) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            todos: Arc::new(PgTodoRepository::new(pool)),
            config,
        }
    }

    pub fn in_memory(config: Arc<Config>) -> Self {
        let store = MemoryStore::new();
        Self {
            users: Arc::new(store.clone()),
            categories: Arc::new(store.clone()),
            todos: Arc::new(store),
            config,
        }
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.users.clone(), self.config.clone())
    }

    pub fn category_service(&self) -> CategoryService {
        CategoryService::new(self.categories.clone())
    }

    pub fn todo_service(&self) -> TodoService {
        TodoService::new(self.todos.clone(), self.categories.clone())
    }

    pub fn seeder(&self) -> Seeder {
        Seeder::new(self.users.clone(), self.categories.clone(), self.todos.clone())
    }
}
