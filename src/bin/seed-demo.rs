//! Seed the database with demo users, categories and todos.
//! Each table is only seeded while it is empty, so reruns are harmless.
//!
//! Usage: seed-demo [--password PASSWORD] [--database-url URL]
//!   --password      : Password for every demo account (default: password123)
//!   --database-url  : Connection string (default: DATABASE_URL or the DB_* variables)

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use todo_api::{
    config::database_url_from_parts,
    db,
    repositories::{PgCategoryRepository, PgTodoRepository, PgUserRepository},
    services::seeder::{Seeder, DEFAULT_PASSWORD},
};

#[derive(Parser)]
#[command(name = "seed-demo", about = "Seed the todo database with demo data")]
struct Args {
    /// Password given to every demo account
    #[arg(long, default_value = DEFAULT_PASSWORD)]
    password: String,

    /// PostgreSQL connection string
    #[arg(long)]
    database_url: Option<String>,

    /// bcrypt cost used for the demo password hash
    #[arg(long, default_value_t = bcrypt::DEFAULT_COST)]
    cost: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()))
        .unwrap_or_else(database_url_from_parts);

    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let seeder = Seeder::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgCategoryRepository::new(pool.clone())),
        Arc::new(PgTodoRepository::new(pool)),
    );
    let report = seeder.run(&args.password, args.cost).await?;

    println!("=== Seed complete ===");
    println!("  users:      {}", report.users);
    println!("  categories: {}", report.categories);
    println!("  todos:      {}", report.todos);

    Ok(())
}
