use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::todo::{
        CreateTodoRequest, NewTodo, Priority, Status, Todo, TodoChanges, TodoFilter, TodoPage,
        UpdateTodoRequest, DEFAULT_LIMIT, DEFAULT_PAGE,
    },
    repositories::{CategoryRepository, TodoRepository},
};

pub struct TodoService {
    todos: Arc<dyn TodoRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { todos, categories }
    }

    pub async fn create(&self, owner_id: i64, req: &CreateTodoRequest) -> AppResult<Todo> {
        if req.title.trim().is_empty() {
            return Err(AppError::invalid_input("title is required"));
        }
        let priority = if req.priority.is_empty() {
            Priority::default()
        } else {
            parse_priority(&req.priority)?
        };
        if let Some(category_id) = req.category_id {
            self.ensure_category(category_id, owner_id).await?;
        }

        let todo = self
            .todos
            .create(&NewTodo {
                user_id: owner_id,
                category_id: req.category_id,
                title: req.title.clone(),
                description: req.description.clone(),
                deadline: req.deadline,
                priority,
                status: Status::Todo,
            })
            .await?;

        tracing::debug!(todo_id = todo.id, owner_id, "Todo created");
        Ok(todo)
    }

    /// Fills in the default page/limit, then returns the matching page and total.
    pub async fn list(&self, owner_id: i64, mut filter: TodoFilter) -> AppResult<TodoPage> {
        if filter.page <= 0 {
            filter.page = DEFAULT_PAGE;
        }
        if filter.limit <= 0 {
            filter.limit = DEFAULT_LIMIT;
        }

        let (todos, total) = self.todos.list(owner_id, &filter).await?;
        Ok(TodoPage {
            todos,
            total,
            page: filter.page,
            limit: filter.limit,
        })
    }

    pub async fn get(&self, id: i64, owner_id: i64) -> AppResult<Todo> {
        self.todos
            .find(id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))
    }

    /// Empty strings and absent values keep what is stored.
    pub async fn update(&self, id: i64, owner_id: i64, req: &UpdateTodoRequest) -> AppResult<Todo> {
        let existing = self.get(id, owner_id).await?;
        let mut changes = TodoChanges::from(&existing);

        if !req.title.is_empty() {
            if req.title.trim().is_empty() {
                return Err(AppError::invalid_input("title cannot be blank"));
            }
            changes.title = req.title.clone();
        }
        if !req.description.is_empty() {
            changes.description = req.description.clone();
        }
        if let Some(category_id) = req.category_id {
            self.ensure_category(category_id, owner_id).await?;
            changes.category_id = Some(category_id);
        }
        if req.deadline.is_some() {
            changes.deadline = req.deadline;
        }
        if !req.priority.is_empty() {
            changes.priority = parse_priority(&req.priority)?;
        }
        if !req.status.is_empty() {
            changes.status = parse_status(&req.status)?;
        }

        self.todos
            .update(id, owner_id, &changes)
            .await?
            .ok_or_else(|| AppError::not_found("Todo not found"))
    }

    pub async fn toggle_status(&self, id: i64, owner_id: i64) -> AppResult<Todo> {
        let existing = self.get(id, owner_id).await?;
        let req = UpdateTodoRequest {
            status: existing.status.toggled().to_string(),
            ..Default::default()
        };
        self.update(id, owner_id, &req).await
    }

    pub async fn delete(&self, id: i64, owner_id: i64) -> AppResult<()> {
        if !self.todos.soft_delete(id, owner_id).await? {
            return Err(AppError::not_found("Todo not found"));
        }
        tracing::debug!(todo_id = id, owner_id, "Todo deleted");
        Ok(())
    }

    /// A todo may only reference a live category owned by the same user.
    async fn ensure_category(&self, category_id: i64, owner_id: i64) -> AppResult<()> {
        match self.categories.find(category_id, owner_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::invalid_input("Category not found")),
        }
    }
}

pub fn parse_priority(value: &str) -> AppResult<Priority> {
    value
        .parse()
        .map_err(|_| AppError::invalid_input("priority must be one of: low, medium, high"))
}

pub fn parse_status(value: &str) -> AppResult<Status> {
    value
        .parse()
        .map_err(|_| AppError::invalid_input("status must be one of: todo, done"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::category::NewCategory, repositories::MemoryStore};

    fn service() -> (TodoService, MemoryStore) {
        let store = MemoryStore::new();
        let svc = TodoService::new(Arc::new(store.clone()), Arc::new(store.clone()));
        (svc, store)
    }

    fn create_req(title: &str) -> CreateTodoRequest {
        CreateTodoRequest {
            title: title.into(),
            description: String::new(),
            category_id: None,
            deadline: None,
            priority: String::new(),
        }
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let (svc, _) = service();
        let todo = svc.create(1, &create_req("Buy milk")).await.unwrap();
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.status, Status::Todo);
        assert_eq!(todo.user_id, 1);
    }

    #[tokio::test]
    async fn create_validates_title_and_priority() {
        let (svc, _) = service();
        assert!(matches!(svc.create(1, &create_req("")).await, Err(AppError::InvalidInput(_))));

        let req = CreateTodoRequest { priority: "urgent".into(), ..create_req("x") };
        assert!(matches!(svc.create(1, &req).await, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn update_rejects_a_blank_title() {
        let (svc, _) = service();
        let todo = svc.create(1, &create_req("Keep me")).await.unwrap();

        let req = UpdateTodoRequest { title: "  ".into(), ..Default::default() };
        let err = svc.update(todo.id, 1, &req).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(svc.get(todo.id, 1).await.unwrap().title, "Keep me");
    }

    #[tokio::test]
    async fn foreign_category_reference_is_rejected() {
        let (svc, store) = service();
        let theirs = CategoryRepository::create(
            &store,
            &NewCategory {
                user_id: 2,
                name: "Theirs".into(),
                description: String::new(),
                color: "#3B82F6".into(),
            },
        )
        .await
        .unwrap();

        let req = CreateTodoRequest { category_id: Some(theirs.id), ..create_req("x") };
        assert!(matches!(svc.create(1, &req).await, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn list_defaults_pagination_and_orders_newest_first() {
        let (svc, _) = service();
        for i in 0..12 {
            svc.create(1, &create_req(&format!("todo {i}"))).await.unwrap();
        }
        svc.create(2, &create_req("someone else")).await.unwrap();

        let page = svc.list(1, TodoFilter::default()).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
        assert_eq!(page.total, 12);
        assert_eq!(page.todos.len(), 10);
        assert_eq!(page.todos[0].title, "todo 11");

        let second = svc
            .list(1, TodoFilter { page: 2, limit: 10, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(second.total, 12);
        assert_eq!(second.todos.len(), 2);
        assert_eq!(second.todos[1].title, "todo 0");
    }

    #[tokio::test]
    async fn filters_combine_conjunctively() {
        let (svc, _) = service();
        let milk = svc
            .create(1, &CreateTodoRequest { priority: "high".into(), ..create_req("Buy milk") })
            .await
            .unwrap();
        svc.create(1, &create_req("Buy bread")).await.unwrap();
        let done = svc
            .create(1, &CreateTodoRequest { priority: "high".into(), ..create_req("Milk the cow") })
            .await
            .unwrap();
        svc.toggle_status(done.id, 1).await.unwrap();

        let page = svc
            .list(
                1,
                TodoFilter {
                    status: Some(Status::Todo),
                    priority: Some(Priority::High),
                    keyword: Some("MILK".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.todos[0].id, milk.id);
    }

    #[tokio::test]
    async fn partial_update_preserves_omitted_fields() {
        let (svc, _) = service();
        let todo = svc
            .create(
                1,
                &CreateTodoRequest {
                    description: "2 litres".into(),
                    priority: "low".into(),
                    ..create_req("Buy milk")
                },
            )
            .await
            .unwrap();

        let updated = svc
            .update(todo.id, 1, &UpdateTodoRequest { status: "done".into(), ..Default::default() })
            .await
            .unwrap();

        assert_eq!(updated.status, Status::Done);
        assert_eq!(updated.title, "Buy milk");
        assert_eq!(updated.description, "2 litres");
        assert_eq!(updated.priority, Priority::Low);
    }

    #[tokio::test]
    async fn toggle_twice_restores_status() {
        let (svc, _) = service();
        let todo = svc.create(1, &create_req("x")).await.unwrap();

        let once = svc.toggle_status(todo.id, 1).await.unwrap();
        assert_eq!(once.status, Status::Done);
        let twice = svc.toggle_status(todo.id, 1).await.unwrap();
        assert_eq!(twice.status, Status::Todo);
    }

    #[tokio::test]
    async fn other_owner_sees_not_found_everywhere() {
        let (svc, _) = service();
        let todo = svc.create(1, &create_req("private")).await.unwrap();

        assert!(matches!(svc.get(todo.id, 2).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            svc.update(todo.id, 2, &UpdateTodoRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(svc.toggle_status(todo.id, 2).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete(todo.id, 2).await, Err(AppError::NotFound(_))));
        assert_eq!(svc.list(2, TodoFilter::default()).await.unwrap().total, 0);

        // still intact for the owner
        assert_eq!(svc.get(todo.id, 1).await.unwrap().title, "private");
    }

    #[tokio::test]
    async fn deleted_todo_is_not_found() {
        let (svc, _) = service();
        let todo = svc.create(1, &create_req("x")).await.unwrap();
        svc.delete(todo.id, 1).await.unwrap();

        assert!(matches!(svc.get(todo.id, 1).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete(todo.id, 1).await, Err(AppError::NotFound(_))));
    }
}
