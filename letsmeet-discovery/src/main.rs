use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod cache;
mod config;
mod discovery;
mod events;
mod models;
mod routes;
mod schema;
mod services;

use cache::{NoopCache, RedisCache, SharedCache};
use config::AppConfig;
use letsmeet_shared::clients::db::{create_pool, DbPool};
use letsmeet_shared::clients::rabbitmq::RabbitMQClient;
use letsmeet_shared::clients::redis::RedisClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub redis: Option<RedisClient>,
    pub cache: SharedCache,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    letsmeet_shared::middleware::init_tracing("letsmeet-discovery");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;

    // The cache is optional: without Redis the service is slower, never wrong.
    let (redis, cache): (Option<RedisClient>, SharedCache) =
        match RedisClient::connect(&config.redis_url).await {
            Ok(client) => (Some(client.clone()), Arc::new(RedisCache::new(client))),
            Err(e) => {
                tracing::warn!(error = %e, "Redis unavailable, running without cache");
                (None, Arc::new(NoopCache))
            }
        };

    let metrics_handle = letsmeet_shared::middleware::init_metrics()?;

    let state = Arc::new(AppState {
        db,
        config,
        rabbitmq,
        redis,
        cache,
        metrics_handle,
    });

    // Profile edits elsewhere in the platform invalidate our feed caches.
    {
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = events::subscriber::listen_profile_updated(state).await {
                tracing::error!(error = %e, "profile.updated subscriber exited");
            }
        });
    }

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/feed", get(routes::feed::get_feed))
        .route("/feed/count", get(routes::feed::get_feed_count))
        .route("/swipes", post(routes::swipes::record_swipe))
        .route("/swipes/stats", get(routes::swipes::swipe_stats))
        .route("/likes/received", get(routes::likes::received_likes))
        .route("/matches", get(routes::matches::list_matches))
        .route("/matches/:id", delete(routes::matches::unmatch))
        .layer(axum::middleware::from_fn(
            letsmeet_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "letsmeet-discovery starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
