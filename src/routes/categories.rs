use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use super::{json_body, path_id};
use crate::{
    error::AppResult,
    models::{
        auth::AuthenticatedUser,
        category::{Category, CreateCategoryRequest, UpdateCategoryRequest},
    },
    response::ApiResponse,
    state::AppState,
};

pub async fn create_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let body = json_body(payload)?;
    let category = state.category_service().create(user.user_id, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Category created successfully", category)),
    ))
}

pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let categories = state.category_service().list(user.user_id).await?;
    Ok(Json(ApiResponse::new("Categories retrieved successfully", categories)))
}

pub async fn get_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let id = path_id(path, "category")?;
    let category = state.category_service().get(id, user.user_id).await?;
    Ok(Json(ApiResponse::new("Category retrieved successfully", category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let id = path_id(path, "category")?;
    let body = json_body(payload)?;
    let category = state.category_service().update(id, user.user_id, &body).await?;
    Ok(Json(ApiResponse::new("Category updated successfully", category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let id = path_id(path, "category")?;
    state.category_service().delete(id, user.user_id).await?;
    Ok(Json(ApiResponse::message("Category deleted successfully")))
}
