use async_trait::async_trait;
use sqlx::PgPool;

use super::CategoryRepository;
use crate::{
    error::AppResult,
    models::category::{Category, CategoryChanges, NewCategory},
};

const CATEGORY_COLUMNS: &str = "id, user_id, name, description, color, created_at, updated_at";

#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, category: &NewCategory) -> AppResult<Category> {
        let created = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (user_id, name, description, color)
             VALUES ($1, $2, $3, $4)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(category.user_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.color)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list(&self, owner_id: i64) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY name, id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn find(&self, id: i64, owner_id: i64) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        changes: &CategoryChanges,
    ) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories
             SET name = $1,
                 description = $2,
                 color = $3,
                 updated_at = NOW()
             WHERE id = $4 AND user_id = $5 AND deleted_at IS NULL
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.color)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE categories SET deleted_at = NOW()
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
