use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authgate_api::auth::password::PasswordHasher;
use authgate_api::auth::service::AuthService;
use authgate_api::config::{LogFormat, ServerConfig};
use authgate_api::metrics::Metrics;
use authgate_api::router::build_app_router;
use authgate_api::state::AppState;
use authgate_cache::{RedisSessionStore, SessionManager, SessionStore};
use authgate_db::{PgUserStore, UserStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "authgate_api=debug,tower_http=debug".into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = authgate_db::create_pool(
        config.database.connect.clone(),
        config.database.max_connections,
    )
    .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    authgate_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    authgate_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Session cache ---
    let redis = RedisSessionStore::connect(config.redis.connection.clone())
        .await
        .expect("Failed to create Redis pool");
    redis.ping().await.expect("Redis health check failed");
    tracing::info!("Redis health check passed");

    // --- Auth workflow ---
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let sessions: Arc<dyn SessionStore> = Arc::new(redis);
    let metrics = Arc::new(Metrics::new().expect("Failed to register metrics"));
    let hasher = PasswordHasher::new(&config.password).expect("Invalid password hash parameters");

    let auth = AuthService::new(
        Arc::clone(&users),
        SessionManager::new(Arc::clone(&sessions)),
        hasher,
        config.jwt.clone(),
        Arc::clone(&metrics),
    )
    .expect("Failed to initialise auth service");

    // --- App state ---
    let state = AppState {
        auth: Arc::new(auth),
        users,
        sessions,
        metrics,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, closing database pool");
    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
