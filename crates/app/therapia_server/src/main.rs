//! Therapia API server binary.
//!
//! Connects to Postgres, runs migrations and serves the HTTP API until
//! Ctrl-C.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use therapia_api::config::{ApiConfig, DEFAULT_RESET_CODE_TTL_MINUTES};
use therapia_core::auth::clock::SystemClock;
use therapia_core::auth::jwt::resolve_jwt_secret;
use therapia_core::auth::memory::MemoryCredentialStore;
use therapia_core::auth::notifier::LogNotifier;
use therapia_core::auth::queries::PgCredentialStore;
use therapia_core::auth::store::CredentialStore;
use therapia_core::auth::AuthService;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "therapia_server", about = "Therapia API server")]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 3100)]
    port: u16,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/therapia"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Session token signing secret. Falls back to `AUTH_SECRET`, then to a
    /// generated secret persisted in the user data directory.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Password-reset code lifetime in minutes.
    #[arg(long, env = "RESET_CODE_TTL_MINUTES", default_value_t = DEFAULT_RESET_CODE_TTL_MINUTES)]
    reset_code_ttl_minutes: i64,

    /// Email of an administrator account to create at startup if missing.
    /// Public sign-up only creates PARENT accounts, so this is how the first
    /// ADMIN comes to exist.
    #[arg(long, env = "BOOTSTRAP_ADMIN_EMAIL", requires = "bootstrap_admin_password")]
    bootstrap_admin_email: Option<String>,

    /// Password for the bootstrap administrator.
    #[arg(long, env = "BOOTSTRAP_ADMIN_PASSWORD", hide_env_values = true)]
    bootstrap_admin_password: Option<String>,

    /// Keep credentials in process memory instead of Postgres. Everything is
    /// lost on exit; for local frontend work only.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,therapia_api=debug,therapia_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let config = ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        pg_connection_url: args.database_url,
        jwt_secret: args
            .jwt_secret
            .filter(|s| !s.is_empty())
            .unwrap_or_else(resolve_jwt_secret),
        reset_code_ttl_minutes: args.reset_code_ttl_minutes,
    };

    let store: Arc<dyn CredentialStore> = if args.in_memory {
        warn!("using in-memory credential store; data will not survive a restart");
        Arc::new(MemoryCredentialStore::new())
    } else {
        info!(
            database_url = %config.pg_connection_url,
            max_connections = args.max_connections,
            "configuring connection pool"
        );
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(&config.pg_connection_url)
            .await?;

        info!("running database migrations");
        therapia_api::migrate(&pool).await?;
        Arc::new(PgCredentialStore::new(pool))
    };

    let auth = AuthService::new(
        store,
        Arc::new(LogNotifier),
        Arc::new(SystemClock),
        config.auth_config(),
    );

    if let (Some(email), Some(password)) = (
        args.bootstrap_admin_email.as_deref(),
        args.bootstrap_admin_password.as_deref(),
    ) {
        let admin = auth.ensure_admin(email, password, "Administrator").await?;
        info!(user_id = %admin.id, email = %admin.email, "bootstrap administrator ready");
    }

    let state = therapia_api::AppState { auth };
    let app = therapia_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
