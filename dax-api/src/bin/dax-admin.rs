//! # Dax operator tool
//!
//! ```bash
//! dax-admin migrate
//! dax-admin create-user alice --password 'correct horse battery'
//! ```
//!
//! Both commands read `DATABASE_URL` (or `--database-url`); a `.env` file is
//! honored.

use anyhow::Context;
use clap::{Parser, Subcommand};
use dax_shared::{
    auth::password::{hash_password, validate_password},
    db::{
        migrations::{ensure_database_exists, get_migration_status, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    models::user::{CreateUser, User, USERNAME_MAX_LEN},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "dax-admin")]
#[command(about = "Dax database and account administration", version)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database if missing and apply pending migrations
    Migrate,

    /// Create a login account
    CreateUser {
        /// Login name, unique across all users
        username: String,

        /// Initial password
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dax_admin=info,dax_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Migrate => migrate(&cli.database_url).await,
        Command::CreateUser { username, password } => {
            create_user(&cli.database_url, username, &password).await
        }
    }
}

async fn migrate(database_url: &str) -> anyhow::Result<()> {
    ensure_database_exists(database_url)
        .await
        .context("Failed to create database")?;

    let pool = create_pool(DatabaseConfig::with_url(database_url)).await?;
    run_migrations(&pool).await.context("Failed to run migrations")?;

    let status = get_migration_status(&pool).await?;
    tracing::info!(
        applied = status.applied_migrations,
        latest = ?status.latest_version,
        "Database is up to date"
    );

    close_pool(pool).await;
    Ok(())
}

async fn create_user(database_url: &str, username: String, password: &str) -> anyhow::Result<()> {
    let username = username.trim().to_string();
    if username.is_empty() || username.chars().count() > USERNAME_MAX_LEN {
        anyhow::bail!("Username must be between 1 and {} characters", USERNAME_MAX_LEN);
    }
    validate_password(password).map_err(anyhow::Error::msg)?;

    let password_hash = hash_password(password)?;

    let pool = create_pool(DatabaseConfig::with_url(database_url)).await?;
    let result = User::create(
        &pool,
        CreateUser {
            username: username.clone(),
            password_hash,
        },
    )
    .await;
    close_pool(pool).await;

    let user = match result {
        Ok(user) => user,
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            anyhow::bail!("User '{}' already exists", username)
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User created");
    println!("{}", user.id);
    Ok(())
}
