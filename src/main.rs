use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_api::{
    config::{Config, StorageBackend},
    db, routes,
    services::seeder::DEFAULT_PASSWORD,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let state = match config.storage {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.database_url).await?;
            db::run_migrations(&pool).await?;
            info!("Database connected and migrations applied");
            AppState::postgres(pool, config.clone())
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            AppState::in_memory(config.clone())
        }
    };

    if config.run_seeder {
        match state.seeder().run(DEFAULT_PASSWORD, config.bcrypt_cost).await {
            Ok(report) => info!(
                users = report.users,
                categories = report.categories,
                todos = report.todos,
                "Seed data applied"
            ),
            Err(e) => tracing::error!("Seeding failed: {e:#}"),
        }
    }

    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Todo API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
