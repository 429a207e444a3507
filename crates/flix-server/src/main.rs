//! # Flix Server
//!
//! Entry point: loads configuration, builds the repository and serves HTTP.

use flix_config::{AppConfig, ConfigLoader, ObservabilityConfig};
use flix_core::{FlixError, FlixResult};
use flix_repository::MappingRegistry;
use flix_security::PasswordHasher;
use flix_server::{
    build_repository, create_router,
    startup::{print_banner, print_startup_info},
    AppState,
};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let loader = match ConfigLoader::from_default_location() {
        Ok(loader) => loader,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    let config = loader.get().await;

    init_logging(&config.observability);
    print_banner();
    info!("Starting Flix server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> FlixResult<()> {
    let registry = MappingRegistry::new();
    let backend = build_repository(&config, &registry).await?;

    let state = AppState::new(backend.repository, PasswordHasher::new())
        .with_pool(backend.pool.clone());
    let router = create_router(state);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FlixError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    print_startup_info(&config);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| FlixError::Internal(format!("HTTP server error: {}", e)))?;

    if let Some(pool) = backend.pool {
        pool.close().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_logging(config: &ObservabilityConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},flix_repository=debug,flix_server=debug,tower_http=debug",
            config.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
