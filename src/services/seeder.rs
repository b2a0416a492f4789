//! Sample data for local development.
//!
//! Three users sharing one password, five categories and a dozen todos for
//! the first user. Each step is skipped when its table already has rows, so
//! running the seeder twice is harmless.

use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};

use crate::{
    models::{
        category::NewCategory,
        todo::{NewTodo, Priority, Status},
        user::NewUser,
    },
    repositories::{CategoryRepository, TodoRepository, UserRepository},
    services::auth::hash_password,
};

pub const DEFAULT_PASSWORD: &str = "password123";

const USERS: &[(&str, &str)] = &[
    ("john@example.com", "john_doe"),
    ("jane@example.com", "jane_smith"),
    ("admin@example.com", "admin"),
];

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("Work", "Work related tasks and projects", "#FF5722"),
    ("Personal", "Personal tasks and activities", "#4CAF50"),
    ("Shopping", "Shopping lists and errands", "#2196F3"),
    ("Health", "Health and fitness related tasks", "#9C27B0"),
    ("Learning", "Educational and learning activities", "#FF9800"),
];

#[derive(Clone, Copy)]
enum Due {
    Tomorrow,
    NextWeek,
    NextMonth,
}

impl Due {
    fn after(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Due::Tomorrow => now + Duration::days(1),
            Due::NextWeek => now + Duration::days(7),
            Due::NextMonth => now
                .checked_add_months(Months::new(1))
                .unwrap_or(now + Duration::days(30)),
        }
    }
}

struct SampleTodo {
    category: Option<&'static str>,
    title: &'static str,
    description: &'static str,
    priority: Priority,
    status: Status,
    due: Option<Due>,
}

const TODOS: &[SampleTodo] = &[
    SampleTodo {
        category: Some("Work"),
        title: "Complete project proposal",
        description: "Finalize and submit the Q4 project proposal to management",
        priority: Priority::High,
        status: Status::Todo,
        due: Some(Due::NextWeek),
    },
    SampleTodo {
        category: Some("Work"),
        title: "Review team performance",
        description: "Conduct quarterly performance reviews for team members",
        priority: Priority::Medium,
        status: Status::Todo,
        due: Some(Due::NextMonth),
    },
    SampleTodo {
        category: Some("Personal"),
        title: "Schedule doctor appointment",
        description: "Book annual health checkup with family doctor",
        priority: Priority::Medium,
        status: Status::Todo,
        due: Some(Due::Tomorrow),
    },
    SampleTodo {
        category: Some("Personal"),
        title: "Organize home office",
        description: "Clean and reorganize workspace for better productivity",
        priority: Priority::Low,
        status: Status::Done,
        due: None,
    },
    SampleTodo {
        category: Some("Shopping"),
        title: "Buy groceries",
        description: "Weekly grocery shopping - milk, bread, vegetables, fruits",
        priority: Priority::Medium,
        status: Status::Todo,
        due: Some(Due::Tomorrow),
    },
    SampleTodo {
        category: Some("Shopping"),
        title: "Purchase birthday gift",
        description: "Find and buy birthday gift for mom's birthday next week",
        priority: Priority::High,
        status: Status::Todo,
        due: Some(Due::NextWeek),
    },
    SampleTodo {
        category: Some("Health"),
        title: "Morning jog",
        description: "30-minute jog in the park to maintain fitness routine",
        priority: Priority::Medium,
        status: Status::Done,
        due: None,
    },
    SampleTodo {
        category: Some("Health"),
        title: "Prepare healthy meal plan",
        description: "Plan healthy meals for the upcoming week",
        priority: Priority::Medium,
        status: Status::Todo,
        due: None,
    },
    SampleTodo {
        category: Some("Learning"),
        title: "Complete online course",
        description: "Finish the Advanced Rust Programming course",
        priority: Priority::High,
        status: Status::Todo,
        due: Some(Due::NextMonth),
    },
    SampleTodo {
        category: Some("Learning"),
        title: "Read technical book",
        description: "Read 'Clean Architecture' by Robert C. Martin",
        priority: Priority::Low,
        status: Status::Todo,
        due: None,
    },
    SampleTodo {
        category: None,
        title: "Update resume",
        description: "Update professional resume with recent projects and skills",
        priority: Priority::Low,
        status: Status::Todo,
        due: None,
    },
    SampleTodo {
        category: None,
        title: "Backup important files",
        description: "Create backup of important documents and photos",
        priority: Priority::Medium,
        status: Status::Done,
        due: None,
    },
];

/// Rows inserted by one seeder run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub categories: usize,
    pub todos: usize,
}

pub struct Seeder {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    todos: Arc<dyn TodoRepository>,
}

impl Seeder {
    pub fn new(
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        todos: Arc<dyn TodoRepository>,
    ) -> Self {
        Self { users, categories, todos }
    }

    pub async fn run(&self, password: &str, bcrypt_cost: u32) -> anyhow::Result<SeedReport> {
        tracing::info!("Starting database seeding...");
        let report = SeedReport {
            users: self.seed_users(password, bcrypt_cost).await?,
            categories: self.seed_categories().await?,
            todos: self.seed_todos().await?,
        };
        tracing::info!(?report, "Database seeding completed");
        Ok(report)
    }

    async fn seed_users(&self, password: &str, bcrypt_cost: u32) -> anyhow::Result<usize> {
        if self.users.count().await? > 0 {
            tracing::info!("Users already exist, skipping user seeding");
            return Ok(0);
        }

        let password_hash = hash_password(password, bcrypt_cost)?;
        for (email, username) in USERS {
            self.users
                .create(&NewUser {
                    email: email.to_string(),
                    username: username.to_string(),
                    password_hash: password_hash.clone(),
                })
                .await?;
            tracing::info!("Created user: {}", email);
        }
        Ok(USERS.len())
    }

    async fn seed_categories(&self) -> anyhow::Result<usize> {
        if self.categories.count().await? > 0 {
            tracing::info!("Categories already exist, skipping category seeding");
            return Ok(0);
        }
        let Some(owner) = self.users.first().await? else {
            tracing::info!("No users found, skipping category seeding");
            return Ok(0);
        };

        for (name, description, color) in CATEGORIES {
            self.categories
                .create(&NewCategory {
                    user_id: owner.id,
                    name: name.to_string(),
                    description: description.to_string(),
                    color: color.to_string(),
                })
                .await?;
            tracing::info!("Created category: {}", name);
        }
        Ok(CATEGORIES.len())
    }

    async fn seed_todos(&self) -> anyhow::Result<usize> {
        if self.todos.count().await? > 0 {
            tracing::info!("Todos already exist, skipping todo seeding");
            return Ok(0);
        }
        let Some(owner) = self.users.first().await? else {
            tracing::info!("No users found, skipping todo seeding");
            return Ok(0);
        };

        let categories = self.categories.list(owner.id).await?;
        if categories.is_empty() {
            tracing::info!("No categories found, creating todos without categories");
        }
        let category_id = |name: &str| categories.iter().find(|c| c.name == name).map(|c| c.id);

        let now = Utc::now();
        for sample in TODOS {
            self.todos
                .create(&NewTodo {
                    user_id: owner.id,
                    category_id: sample.category.and_then(category_id),
                    title: sample.title.to_string(),
                    description: sample.description.to_string(),
                    deadline: sample.due.map(|d| d.after(now)),
                    priority: sample.priority,
                    status: sample.status,
                })
                .await?;
            tracing::info!("Created todo: {}", sample.title);
        }
        Ok(TODOS.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::todo::TodoFilter, repositories::MemoryStore};

    fn seeder(store: &MemoryStore) -> Seeder {
        Seeder::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        )
    }

    #[tokio::test]
    async fn seeds_everything_once() {
        let store = MemoryStore::new();

        let first = seeder(&store).run(DEFAULT_PASSWORD, 4).await.unwrap();
        assert_eq!(first, SeedReport { users: 3, categories: 5, todos: 12 });

        let second = seeder(&store).run(DEFAULT_PASSWORD, 4).await.unwrap();
        assert_eq!(second, SeedReport::default());
    }

    #[tokio::test]
    async fn seeded_todos_belong_to_the_first_user() {
        let store = MemoryStore::new();
        seeder(&store).run(DEFAULT_PASSWORD, 4).await.unwrap();

        let owner = UserRepository::first(&store).await.unwrap().unwrap();
        assert_eq!(owner.email, "john@example.com");
        assert!(bcrypt::verify(DEFAULT_PASSWORD, &owner.password_hash).unwrap());

        let filter = TodoFilter { page: 1, limit: 100, ..Default::default() };
        let (todos, total) = TodoRepository::list(&store, owner.id, &filter).await.unwrap();
        assert_eq!(total, 12);

        let groceries = todos.iter().find(|t| t.title == "Buy groceries").unwrap();
        assert_eq!(groceries.category.as_ref().unwrap().name, "Shopping");
        assert!(groceries.deadline.is_some());
        let resume = todos.iter().find(|t| t.title == "Update resume").unwrap();
        assert!(resume.category.is_none());
    }
}
