use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_auth::{
    build_router,
    files::{InMemoryBlobStore, InMemoryDocumentStore},
    AppState, Authenticator, DatabaseConfig, FileService, InMemoryUserRepository,
    PostgresUserRepository, ServerConfig, StoreKind, UserDirectory, UserRepository,
};

/// Opens the configured user store. The process cannot run without one.
async fn open_user_store(kind: StoreKind) -> Arc<dyn UserRepository + Send + Sync> {
    match kind {
        StoreKind::Memory => {
            info!("Using in-memory user store");
            Arc::new(InMemoryUserRepository::new())
        }
        StoreKind::Postgres => {
            let db_config = DatabaseConfig::from_env();
            info!(config = ?db_config, "Using PostgreSQL user store");

            let repository = match PostgresUserRepository::connect(&db_config).await {
                Ok(repository) => repository,
                Err(e) => {
                    error!(error = %e, "Error while connecting to user store");
                    std::process::exit(1);
                }
            };
            if let Err(e) = repository.ensure_schema().await {
                error!(error = %e, "Error while creating users table");
                std::process::exit(1);
            }
            Arc::new(repository)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting user auth server");
    let server_config = ServerConfig::from_env();

    let directory = Arc::new(UserDirectory::open(
        open_user_store(server_config.store).await,
    ));
    let authenticator = Arc::new(Authenticator::new(directory.clone()));
    let file_service = Arc::new(FileService::new(
        Arc::new(InMemoryBlobStore::new()),
        Arc::new(InMemoryDocumentStore::new()),
    ));

    let app = build_router(AppState::new(authenticator, file_service));

    let addr = format!("0.0.0.0:{}", server_config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %addr, "Failed to bind listener");
            directory.shutdown().await;
            std::process::exit(1);
        }
    };
    info!("Server running on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    {
        error!(error = %e, "Server error");
    }

    directory.shutdown().await;
    info!("Server stopped");
}
