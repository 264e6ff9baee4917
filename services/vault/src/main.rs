use anyhow::Result;
use sqlx::migrate::Migrator;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod auth;
mod error;
mod jwt;
mod middleware;
mod models;
mod repositories;
mod routes;
mod settings;
mod state;
mod validation;

use common::database::{self, Database};

use crate::{
    auth::AuthService,
    jwt::JwtService,
    repositories::{PasswordRepository, UserRepository},
    settings::Settings,
    state::AppState,
};

static MIGRATOR: Migrator = sqlx::migrate!();

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting vault service");

    // Refuse to start without the required settings
    let settings = Settings::from_env()?;

    // Initialize the memoized database handle and fail fast if unreachable
    let database = Database::new(settings.database.clone());
    let pool = database.connect().await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database.run_migrations(&MIGRATOR).await?;

    let jwt_service = JwtService::new(settings.jwt.clone())?;
    info!("Issuing tokens valid for {} seconds", jwt_service.token_expiry());
    let user_repository = Arc::new(UserRepository::new(pool.clone()));
    let password_repository = Arc::new(PasswordRepository::new(pool));

    let app_state = AppState {
        auth_service: AuthService::new(user_repository, jwt_service),
        password_repository,
    };

    info!("Vault service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state, &settings.server);

    let addr = format!("0.0.0.0:{}", settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Vault service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Vault service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
