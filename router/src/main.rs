use std::sync::Arc;
use tracing::{error, info, warn};
use warp::{http::StatusCode, Filter, Reply};

mod agents;
mod api;
mod capabilities;
mod config;
mod error;
mod llm;
mod memory;
mod metrics;
mod middleware;
mod models;
#[cfg(test)]
mod testing;

use agents::QueryRouter;
use capabilities::{CapabilityRegistry, NewsProvider, WeatherProvider};
use llm::{GeminiClient, GeminiClientConfig};
use memory::ConversationMemory;
use metrics::Metrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting conversational query router");
    for (name, present) in [
        ("GEMINI_API_KEY", config.gemini_api_key.is_some()),
        ("WEATHER_API_KEY", config.weather_api_key.is_some()),
        ("NEWS_API_KEY", config.news_api_key.is_some()),
    ] {
        if present {
            info!("{} loaded", name);
        } else {
            warn!("{} not set", name);
        }
    }

    let metrics = Metrics::new()?;
    let timeouts = config.timeouts();

    let llm = Arc::new(GeminiClient::new(GeminiClientConfig::from(&config)));
    let capabilities = CapabilityRegistry::new(timeouts.fetch, metrics.clone())
        .with_provider(Arc::new(WeatherProvider::new(
            config.weather_api_url.clone(),
            config.weather_api_key.clone(),
        )))
        .with_provider(Arc::new(NewsProvider::new(
            config.news_api_url.clone(),
            config.news_api_key.clone(),
        )));
    let memory = ConversationMemory::new(config.memory_capacity);
    info!("Conversation memory capacity: {}", memory.capacity());

    let router = Arc::new(QueryRouter::new(
        llm,
        capabilities,
        memory,
        timeouts,
        metrics.clone(),
    ));

    // Build API routes
    let api_routes = api::routes(router)
        .with(warp::log("api"))
        .with(middleware::cors());

    // Health check route
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "healthy"})));

    // Metrics route
    let metrics_route = warp::path("metrics")
        .and(warp::get())
        .map(move || match metrics.encode() {
            Ok((buffer, content_type)) => {
                warp::reply::with_header(buffer, "Content-Type", content_type).into_response()
            }
            Err(e) => {
                error!("Failed to encode metrics: {}", e);
                warp::reply::with_status(
                    "metrics unavailable",
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
                .into_response()
            }
        });

    let routes = health
        .or(metrics_route)
        .or(api_routes)
        .recover(error::handle_rejection);

    // Start server
    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes).run(addr).await;

    Ok(())
}
