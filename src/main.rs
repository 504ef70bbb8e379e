use blog_service::{
    auth::TokenService,
    config::AppConfig,
    db,
    middleware::{AppState, SlidingWindowLimiter},
    routes,
    services::AuthService,
    telemetry,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("blog-service {}", env!("CARGO_PKG_VERSION"));
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

    dotenv::dotenv().ok();

    // Missing required configuration (e.g. the JWT secret) aborts here
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Blog service starting...");

    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    tracing::info!("Database initialized");

    let token_service = Arc::new(TokenService::from_config(&config)?);
    let auth_service = Arc::new(AuthService::new(db_pool.clone(), token_service.clone()));
    let rate_limiter = Arc::new(SlidingWindowLimiter::new(
        config.rate_limit.max_requests,
        config.rate_limit.window_seconds,
    ));

    let state = Arc::new(AppState {
        config: config.clone(),
        db: db_pool,
        token_service,
        auth_service,
        rate_limiter,
    });

    let app = routes::create_router(state);

    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // The server drains in-flight requests after the shutdown signal,
    // bounded by the configured timeout.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .into_future(),
    );

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    let timeout_secs = config.server.graceful_shutdown_timeout_secs;
    match tokio::time::timeout(Duration::from_secs(timeout_secs), server).await {
        Ok(result) => {
            result??;
            tracing::info!("Server shutdown complete");
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs,
                "Graceful shutdown timed out, aborting in-flight requests"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
}

fn print_help() {
    println!("blog-service {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: blog-service [options]");
    println!();
    println!("Options:");
    println!("  --version     Print version and exit");
    println!("  --help        Print this help and exit");
    println!();
    println!("Configuration is read from BLOG_-prefixed environment variables;");
    println!("see .env.example for available settings.");
}
