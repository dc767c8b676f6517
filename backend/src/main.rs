use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use redis::Client;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod error;
mod store;
mod tasks;

use config::Config;
use store::{TaskStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskStore,
    pub users: UserStore,
    pub jwt: auth::jwt::JwtService,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let client = Client::open(config.redis_url.clone()).expect("invalid REDIS_URL");
    let pool = Arc::new(client);

    let state = AppState {
        tasks: TaskStore::new(pool.clone()),
        users: UserStore::new(pool),
        jwt: auth::jwt::JwtService::new(&config.jwt_secret, config.jwt_expire_secs),
    };

    let task_routes = Router::new()
        .route(
            "/api/tasks",
            get(tasks::handlers::list_tasks).post(tasks::handlers::create_task),
        )
        .route(
            "/api/tasks/:id",
            put(tasks::handlers::update_task).delete(tasks::handlers::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let app = Router::new()
        .merge(task_routes)
        .route("/api/auth/register", post(auth::handlers::register))
        .route("/api/auth/login", post(auth::handlers::login))
        .nest_service("/", ServeDir::new("frontend/dist"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind");
    tracing::info!("server listening on {}", config.bind_addr);
    tracing::info!("redis at {}", config.redis_url);
    axum::serve(listener, app).await.expect("server error");
}
