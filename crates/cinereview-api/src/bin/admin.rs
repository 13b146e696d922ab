//! Bootstraps an administrator account.
//!
//! ```text
//! cinereview-admin root@example.com 's3cret!' --username root
//! ```

use clap::Parser;
use cinereview_accounts::security::password::Argon2PasswordHasher;
use cinereview_api::bootstrap::{AdminBootstrap, ensure_admin};
use cinereview_api::error::AppError;
use cinereview_store::pg_user_repository::PgUserRepository;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cinereview-admin")]
#[command(about = "Create or promote a CineReview administrator")]
#[command(version)]
struct Cli {
    /// Login email of the administrator
    email: String,

    /// Password to set
    password: String,

    /// Username for a newly created account
    #[arg(long, default_value = "admin")]
    username: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let pool = cinereview_store::connect(&cli.database_url, 1).await?;
    let users = PgUserRepository::new(pool.clone());

    let (user, outcome) = ensure_admin(
        &users,
        &Argon2PasswordHasher,
        &cli.email,
        &cli.username,
        &cli.password,
    )
    .await?;

    let action = match outcome {
        AdminBootstrap::Created => "created",
        AdminBootstrap::Promoted => "promoted",
    };
    tracing::info!(user_id = %user.id, email = %user.email, action, "admin account ready");

    pool.close().await;
    Ok(())
}
