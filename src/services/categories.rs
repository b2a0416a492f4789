use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::category::{
        Category, CategoryChanges, CreateCategoryRequest, NewCategory, UpdateCategoryRequest,
        DEFAULT_COLOR,
    },
    repositories::CategoryRepository,
};

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn create(&self, owner_id: i64, req: &CreateCategoryRequest) -> AppResult<Category> {
        if req.name.trim().is_empty() {
            return Err(AppError::invalid_input("name is required"));
        }
        let color = if req.color.is_empty() {
            DEFAULT_COLOR.to_string()
        } else {
            req.color.clone()
        };

        self.categories
            .create(&NewCategory {
                user_id: owner_id,
                name: req.name.clone(),
                description: req.description.clone(),
                color,
            })
            .await
    }

    pub async fn list(&self, owner_id: i64) -> AppResult<Vec<Category>> {
        self.categories.list(owner_id).await
    }

    pub async fn get(&self, id: i64, owner_id: i64) -> AppResult<Category> {
        self.categories
            .find(id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))
    }

    /// Only non-empty fields replace the stored values.
    pub async fn update(
        &self,
        id: i64,
        owner_id: i64,
        req: &UpdateCategoryRequest,
    ) -> AppResult<Category> {
        let existing = self.get(id, owner_id).await?;

        let mut changes = CategoryChanges {
            name: existing.name,
            description: existing.description,
            color: existing.color,
        };
        if !req.name.is_empty() {
            if req.name.trim().is_empty() {
                return Err(AppError::invalid_input("name cannot be blank"));
            }
            changes.name = req.name.clone();
        }
        if !req.description.is_empty() {
            changes.description = req.description.clone();
        }
        if !req.color.is_empty() {
            changes.color = req.color.clone();
        }

        self.categories
            .update(id, owner_id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))
    }

    pub async fn delete(&self, id: i64, owner_id: i64) -> AppResult<()> {
        if !self.categories.soft_delete(id, owner_id).await? {
            return Err(AppError::not_found("Category not found"));
        }
        Ok(())
    }
}
