//! Mingle service entry point

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use mingle_service::{
    auth::TokenIssuer,
    config::AppConfig,
    db,
    handlers::health,
    middleware::AppState,
    repository::PgUserStore,
    routes,
    services::AuthService,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("mingle-service {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // Load .env files in development; production sets real environment
    // variables and skips these
    if let Ok(env_name) = std::env::var("MINGLE_ENV") {
        dotenv::from_filename(format!(".env.{}", env_name)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::from_filename(".env.development").ok();
        dotenv::dotenv().ok();
    }

    health::set_start_time();

    // 1. Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. Initialize logging
    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Mingle service starting...");

    // 3. Database pool + migrations
    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    tracing::info!("Database initialized");

    // 4. Build the credential core. A bad signing key aborts startup here;
    // the process must not serve traffic without one.
    let token_issuer = Arc::new(
        TokenIssuer::from_config(&config)
            .map_err(|e| anyhow::anyhow!("Failed to create token issuer: {}", e))?,
    );

    let store = Arc::new(PgUserStore::new(db_pool.clone()));
    let auth_service = Arc::new(AuthService::new(store, token_issuer));

    let app_state = Arc::new(AppState {
        config: config.clone(),
        auth_service,
    });

    // 5. Build routes and serve
    let app = routes::create_router(app_state);

    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handling
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
    tracing::warn!("Graceful shutdown timeout reached, forcing exit");
}

/// Print usage information
fn print_help() {
    println!("mingle-service {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: mingle-service [options]");
    println!();
    println!("Options:");
    println!("  --version     Print version and exit");
    println!("  --help        Print this help and exit");
    println!();
    println!("Environment:");
    println!("  All configuration is read from MINGLE_-prefixed environment");
    println!("  variables; see .env.example for the available options");
}
