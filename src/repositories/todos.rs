use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::TodoRepository;
use crate::{
    error::AppResult,
    models::todo::{NewTodo, Todo, TodoChanges, TodoFilter, TodoRow},
};

/// Columns of a todo (aliased `t`) plus its live category (aliased `c`),
/// matching the layout of [`TodoRow`].
const TODO_SELECT: &str = "t.id, t.user_id, t.category_id, t.title, t.description, t.deadline,
        t.priority, t.status, t.created_at, t.updated_at,
        c.id AS cat_id, c.user_id AS cat_user_id, c.name AS cat_name,
        c.description AS cat_description, c.color AS cat_color,
        c.created_at AS cat_created_at, c.updated_at AS cat_updated_at";

/// Tombstoned categories are not attached.
const CATEGORY_JOIN: &str =
    "LEFT JOIN categories c ON c.id = t.category_id AND c.deleted_at IS NULL";

#[derive(Clone)]
pub struct PgTodoRepository {
    pool: PgPool,
}

impl PgTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE metacharacters so the keyword is matched literally.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for ch in keyword.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Appends the owner scope and every supplied filter criterion, ANDed.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, owner_id: i64, filter: &TodoFilter) {
    qb.push(" WHERE t.user_id = ")
        .push_bind(owner_id)
        .push(" AND t.deleted_at IS NULL");

    if let Some(status) = filter.status {
        qb.push(" AND t.status = ").push_bind(status.as_str());
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND t.priority = ").push_bind(priority.as_str());
    }
    if let Some(category_id) = filter.category_id.filter(|id| *id > 0) {
        qb.push(" AND t.category_id = ").push_bind(category_id);
    }
    if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.is_empty()) {
        let pattern = format!("%{}%", escape_like(keyword));
        qb.push(" AND (t.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR t.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn create(&self, todo: &NewTodo) -> AppResult<Todo> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            "WITH t AS (
                INSERT INTO todos (user_id, category_id, title, description, deadline, priority, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
             )
             SELECT {TODO_SELECT} FROM t {CATEGORY_JOIN}"
        ))
        .bind(todo.user_id)
        .bind(todo.category_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.deadline)
        .bind(todo.priority.as_str())
        .bind(todo.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(Todo::try_from(row)?)
    }

    async fn list(&self, owner_id: i64, filter: &TodoFilter) -> AppResult<(Vec<Todo>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM todos t");
        push_filters(&mut count_query, owner_id, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {TODO_SELECT} FROM todos t {CATEGORY_JOIN}"));
        push_filters(&mut page_query, owner_id, filter);
        page_query
            .push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let rows: Vec<TodoRow> = page_query
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;
        let todos = rows
            .into_iter()
            .map(Todo::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok((todos, total))
    }

    async fn find(&self, id: i64, owner_id: i64) -> AppResult<Option<Todo>> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            "SELECT {TODO_SELECT} FROM todos t {CATEGORY_JOIN}
             WHERE t.id = $1 AND t.user_id = $2 AND t.deleted_at IS NULL"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::try_from).transpose()?)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        changes: &TodoChanges,
    ) -> AppResult<Option<Todo>> {
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            "WITH t AS (
                UPDATE todos
                SET category_id = $1,
                    title       = $2,
                    description = $3,
                    deadline    = $4,
                    priority    = $5,
                    status      = $6,
                    updated_at  = NOW()
                WHERE id = $7 AND user_id = $8 AND deleted_at IS NULL
                RETURNING *
             )
             SELECT {TODO_SELECT} FROM t {CATEGORY_JOIN}"
        ))
        .bind(changes.category_id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.deadline)
        .bind(changes.priority.as_str())
        .bind(changes.status.as_str())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::try_from).transpose()?)
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE todos SET deleted_at = NOW()
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
