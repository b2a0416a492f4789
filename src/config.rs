use std::env;

/// Which repository implementation backs the running server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!("Unknown storage backend: {s}")),
        }
    }
}

const MAX_EXPIRE_HOURS: u64 = 24 * 365 * 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub storage: StorageBackend,
    pub jwt_secret: String,
    pub jwt_expire_hours: u64,
    pub bcrypt_cost: u32,
    pub host: String,
    pub port: u16,
    pub run_seeder: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(database_url_from_parts),
            storage: env::var("STORAGE")
                .unwrap_or_else(|_| "postgres".into())
                .parse()?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expire_hours: parse_expire_hours(
                &env::var("JWT_EXPIRE_HOURS").unwrap_or_else(|_| "24".into()),
            )?,
            bcrypt_cost: match env::var("BCRYPT_COST") {
                Ok(v) => v.parse()?,
                Err(_) => bcrypt::DEFAULT_COST,
            },
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()?,
            run_seeder: env::var("RUN_SEEDER")
                .unwrap_or_else(|_| "false".into())
                .parse()?,
        })
    }

    /// Token lifetime in seconds.
    pub fn jwt_ttl_seconds(&self) -> u64 {
        self.jwt_expire_hours.saturating_mul(3600)
    }
}

/// Builds a connection string from the discrete `DB_*` variables.
pub fn database_url_from_parts() -> String {
    let var = |key: &str, default: &str| {
        env::var(key)
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    };
    format!(
        "postgres://{}:{}@{}:{}/{}?sslmode={}",
        var("DB_USER", "postgres"),
        var("DB_PASSWORD", "postgres"),
        var("DB_HOST", "localhost"),
        var("DB_PORT", "5432"),
        var("DB_NAME", "todoapp"),
        var("DB_SSLMODE", "disable"),
    )
}

/// Token lifetime in hours; must be positive and at most ten years.
fn parse_expire_hours(value: &str) -> anyhow::Result<u64> {
    let hours: u64 = value.trim().parse()?;
    if hours == 0 || hours > MAX_EXPIRE_HOURS {
        anyhow::bail!("JWT_EXPIRE_HOURS must be between 1 and {MAX_EXPIRE_HOURS}, got {hours}");
    }
    Ok(hours)
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
