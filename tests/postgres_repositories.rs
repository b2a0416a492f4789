//! Postgres store tests. They run against `DATABASE_URL` and return early
//! when it is not set, so the default test run needs no database.
//!
//! Each test registers its own user, so they can share one database.

use chrono::Utc;
use sqlx::PgPool;

use todo_api::db;
use todo_api::error::AppError;
use todo_api::models::category::{CategoryChanges, NewCategory};
use todo_api::models::todo::{NewTodo, Priority, Status, TodoChanges, TodoFilter};
use todo_api::models::user::{NewUser, User};
use todo_api::repositories::{
    CategoryRepository, PgCategoryRepository, PgTodoRepository, PgUserRepository, TodoRepository,
    UserRepository,
};

async fn pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty())?;
    let pool = db::create_pool(&url).await.expect("connect to DATABASE_URL");
    db::run_migrations(&pool).await.expect("migrations should apply");
    Some(pool)
}

async fn new_user(pool: &PgPool, tag: &str) -> User {
    let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    PgUserRepository::new(pool.clone())
        .create(&NewUser {
            email: format!("{tag}-{stamp}@example.com"),
            username: tag.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        })
        .await
        .expect("user insert should succeed")
}

fn new_todo(user_id: i64, title: &str) -> NewTodo {
    NewTodo {
        user_id,
        category_id: None,
        title: title.to_string(),
        description: String::new(),
        deadline: None,
        priority: Priority::Medium,
        status: Status::Todo,
    }
}

fn filter() -> TodoFilter {
    TodoFilter { page: 1, limit: 10, ..Default::default() }
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let Some(pool) = pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let user = new_user(&pool, "dup").await;

    let err = users
        .create(&NewUser {
            email: user.email.clone(),
            username: "again".to_string(),
            password_hash: "x".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let found = users.find_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
}

#[tokio::test]
async fn todo_insert_and_update_attach_the_live_category() {
    let Some(pool) = pool().await else { return };
    let owner = new_user(&pool, "joiner").await;
    let categories = PgCategoryRepository::new(pool.clone());
    let todos = PgTodoRepository::new(pool.clone());

    let work = categories
        .create(&NewCategory {
            user_id: owner.id,
            name: "Work".to_string(),
            description: String::new(),
            color: "#3B82F6".to_string(),
        })
        .await
        .unwrap();

    let created = todos
        .create(&NewTodo { category_id: Some(work.id), ..new_todo(owner.id, "Report") })
        .await
        .unwrap();
    assert_eq!(created.category.as_ref().map(|c| c.name.as_str()), Some("Work"));

    let renamed = categories
        .update(
            work.id,
            owner.id,
            &CategoryChanges {
                name: "Job".to_string(),
                description: String::new(),
                color: "#000000".to_string(),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "Job");

    let mut changes = TodoChanges::from(&created);
    changes.status = Status::Done;
    let updated = todos.update(created.id, owner.id, &changes).await.unwrap().unwrap();
    assert_eq!(updated.status, Status::Done);
    assert_eq!(updated.category.as_ref().map(|c| c.name.as_str()), Some("Job"));

    assert!(categories.soft_delete(work.id, owner.id).await.unwrap());
    let orphan = todos.find(created.id, owner.id).await.unwrap().unwrap();
    assert_eq!(orphan.category_id, Some(work.id));
    assert!(orphan.category.is_none());
}

#[tokio::test]
async fn keyword_wildcards_match_literally() {
    let Some(pool) = pool().await else { return };
    let owner = new_user(&pool, "keyword").await;
    let todos = PgTodoRepository::new(pool.clone());

    todos.create(&new_todo(owner.id, "Finish 100% of tests")).await.unwrap();
    todos.create(&new_todo(owner.id, "Finish 1000 push-ups")).await.unwrap();
    todos.create(&new_todo(owner.id, "Rename snake_case vars")).await.unwrap();

    let (found, total) = todos
        .list(owner.id, &TodoFilter { keyword: Some("100%".into()), ..filter() })
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].title, "Finish 100% of tests");

    let (found, total) = todos
        .list(owner.id, &TodoFilter { keyword: Some("E_C".into()), ..filter() })
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].title, "Rename snake_case vars");
}

#[tokio::test]
async fn reads_and_writes_are_owner_scoped() {
    let Some(pool) = pool().await else { return };
    let alice = new_user(&pool, "alice").await;
    let bob = new_user(&pool, "bob").await;
    let todos = PgTodoRepository::new(pool.clone());

    let todo = todos.create(&new_todo(alice.id, "Alice only")).await.unwrap();

    assert!(todos.find(todo.id, bob.id).await.unwrap().is_none());
    assert!(todos
        .update(todo.id, bob.id, &TodoChanges::from(&todo))
        .await
        .unwrap()
        .is_none());
    assert!(!todos.soft_delete(todo.id, bob.id).await.unwrap());
    assert_eq!(todos.list(bob.id, &filter()).await.unwrap().1, 0);

    assert!(todos.soft_delete(todo.id, alice.id).await.unwrap());
    assert!(todos.find(todo.id, alice.id).await.unwrap().is_none());
    assert!(!todos.soft_delete(todo.id, alice.id).await.unwrap());
}

#[tokio::test]
async fn list_filters_and_pages_newest_first() {
    let Some(pool) = pool().await else { return };
    let owner = new_user(&pool, "pager").await;
    let todos = PgTodoRepository::new(pool.clone());

    for n in 1..=4 {
        todos.create(&new_todo(owner.id, &format!("Task {n}"))).await.unwrap();
    }
    todos
        .create(&NewTodo { priority: Priority::High, ..new_todo(owner.id, "Urgent") })
        .await
        .unwrap();

    let (page, total) = todos
        .list(owner.id, &TodoFilter { page: 2, limit: 2, ..filter() })
        .await
        .unwrap();
    assert_eq!(total, 5);
    let titles: Vec<&str> = page.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Task 3", "Task 2"]);

    let (page, total) = todos
        .list(owner.id, &TodoFilter { priority: Some(Priority::High), ..filter() })
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].title, "Urgent");

    let (page, total) = todos
        .list(owner.id, &TodoFilter { page: i64::MAX, limit: 10, ..filter() })
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert!(page.is_empty());
}
