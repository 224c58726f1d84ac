//! Lectern - Library Management System
//!
//! Loads the registry from the store, runs the interactive console and
//! saves the registry back on exit.

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lectern::{
    console,
    models::user::{Role, User},
    repository::Repository,
    AppConfig, Registry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("lectern={}", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Lectern v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;

    tracing::info!(url = %config.database.url, "connected to store");

    let repository = Repository::new(pool);
    let mut registry = Registry::new();

    // A failed load leaves the registry empty; the operator can still work
    // and a later save will rebuild the store.
    if let Err(e) = repository.load_into(&mut registry).await {
        tracing::error!("failed to load registry from store: {e}");
        registry = Registry::new();
    }

    if registry.user_count() == 0 {
        let admin = User::new(
            config.seed.admin_id.clone(),
            config.seed.admin_name.clone(),
            Role::Admin,
        );
        registry.add_user(admin)?;
        tracing::info!(id = %config.seed.admin_id, "default administrator created");
        println!(
            "Default admin created (ID: {}, Name: {})",
            config.seed.admin_id, config.seed.admin_name
        );
    }

    if let Err(e) = console::run(&mut registry) {
        tracing::warn!("console session ended: {e}");
    }

    // Save failures must surface, not vanish into a log line
    repository.save_from(&registry).await?;

    Ok(())
}
