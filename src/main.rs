use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod services;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting CRM API in {:?} mode", config.environment);

    // Schema bootstrap is best-effort at startup; /health reports degraded
    // until the database comes back.
    match database::DatabaseManager::init_schema().await {
        Ok(()) => tracing::info!("Database schema ready"),
        Err(e) => tracing::error!("Database unavailable at startup: {}", e),
    }

    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("CRM API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Session endpoints
        .merge(auth_routes())
        // Customer API
        .merge(api_routes())
        // Admin API
        .merge(admin_routes());

    // Serve the pre-built SPA bundle when configured, with the SPA's
    // index.html as the fallback for client-side routes
    if let Some(static_dir) = &config::config().server.static_dir {
        let index = std::path::Path::new(static_dir).join("index.html");
        router = router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)));
    }

    router
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    use handlers::public::auth;

    let session_required = Router::new()
        .route("/auth/user", get(auth::current_user))
        .route_layer(axum_middleware::from_fn(middleware::session_auth_middleware));

    Router::new()
        .route("/auth/google", get(auth::google_redirect))
        .route("/auth/google/callback", get(auth::google_callback))
        .route("/auth/logout", post(auth::logout))
        .merge(session_required)
}

fn api_routes() -> Router {
    use handlers::protected::orders;

    Router::new()
        .route("/api/orders", get(orders::list_orders).post(orders::create_order))
        .route_layer(axum_middleware::from_fn(middleware::session_auth_middleware))
}

fn admin_routes() -> Router {
    use handlers::admin::{campaigns, emails, export, query};

    // route_layer runs bottom-up: session auth resolves the customer first,
    // then the admin gate checks the flag
    Router::new()
        .route("/api/admin/query", post(query::run_query))
        .route("/api/admin/campaigns", get(campaigns::list_campaigns))
        .route("/api/admin/export/:filename", get(export::download_export))
        .route("/api/send-emails", post(emails::send_emails))
        .route_layer(axum_middleware::from_fn(middleware::require_admin_middleware))
        .route_layer(axum_middleware::from_fn(middleware::session_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    // The SPA sends the session cookie cross-origin, so the allow-origin
    // must be exact; credentials cannot ride on a wildcard.
    match config::config().server.client_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(_) => CorsLayer::permissive(),
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "CRM API",
            "version": version,
            "description": "CRM backend: OAuth sessions, orders, analytics proxy, campaign email",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/google, /auth/google/callback, /auth/user, /auth/logout",
                "orders": "/api/orders (session)",
                "admin": "/api/admin/query, /api/admin/campaigns, /api/admin/export/:filename (admin)",
                "email": "/api/send-emails (admin)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
