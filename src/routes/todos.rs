use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use super::{json_body, path_id};
use crate::{
    error::{AppError, AppResult},
    models::{
        auth::AuthenticatedUser,
        todo::{CreateTodoRequest, Todo, TodoFilter, TodoQuery, UpdateTodoRequest},
    },
    response::{ApiResponse, PageMeta},
    services::todos::{parse_priority, parse_status},
    state::AppState,
};

/// Build the store filter from the raw query string. Numbers that fail to
/// parse are ignored so the service defaults apply.
fn filter_from_query(query: TodoQuery) -> AppResult<TodoFilter> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    let number = |v: Option<String>| v.and_then(|s| s.trim().parse::<i64>().ok());

    Ok(TodoFilter {
        status: non_empty(query.status).map(|s| parse_status(&s)).transpose()?,
        priority: non_empty(query.priority)
            .map(|p| parse_priority(&p))
            .transpose()?,
        category_id: number(query.category_id).filter(|id| *id > 0),
        keyword: non_empty(query.keyword),
        page: number(query.page).unwrap_or(0),
        limit: number(query.limit).unwrap_or(0),
    })
}

pub async fn create_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Todo>>)> {
    let body = json_body(payload)?;
    let todo = state.todo_service().create(user.user_id, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Todo created successfully", todo)),
    ))
}

pub async fn list_todos(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    query: Result<Query<TodoQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<Vec<Todo>>>> {
    let Query(query) = query.map_err(|_| AppError::invalid_input("Invalid query parameters"))?;
    let filter = filter_from_query(query)?;

    let page = state.todo_service().list(user.user_id, filter).await?;
    let meta = PageMeta {
        total: page.total,
        page: page.page,
        limit: page.limit,
    };
    Ok(Json(
        ApiResponse::new("Todos retrieved successfully", page.todos).with_meta(meta),
    ))
}

pub async fn get_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ApiResponse<Todo>>> {
    let id = path_id(path, "todo")?;
    let todo = state.todo_service().get(id, user.user_id).await?;
    Ok(Json(ApiResponse::new("Todo retrieved successfully", todo)))
}

pub async fn update_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Todo>>> {
    let id = path_id(path, "todo")?;
    let body = json_body(payload)?;
    let todo = state.todo_service().update(id, user.user_id, &body).await?;
    Ok(Json(ApiResponse::new("Todo updated successfully", todo)))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ApiResponse<()>>> {
    let id = path_id(path, "todo")?;
    state.todo_service().delete(id, user.user_id).await?;
    Ok(Json(ApiResponse::message("Todo deleted successfully")))
}

pub async fn toggle_todo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<ApiResponse<Todo>>> {
    let id = path_id(path, "todo")?;
    let todo = state.todo_service().toggle_status(id, user.user_id).await?;
    Ok(Json(ApiResponse::new("Todo status toggled successfully", todo)))
}
