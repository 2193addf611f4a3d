use std::sync::Arc;
use std::time::Duration;

use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use x402_agent::{
    routes::{self, AgentState},
    spawn_agent, AgentConfig, ConversationStore, KeywordClassifier,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env().expect("Failed to load configuration");
    let port = config.port;

    tracing::info!("Starting {} on port {}", config.name, port);
    tracing::info!("Agent address: {}", config.address);
    tracing::debug!(?config, "agent configuration");

    let store = Arc::new(ConversationStore::new(config.store_limits));
    store.start_cleanup(Duration::from_secs(60));

    let handle = spawn_agent(
        KeywordClassifier::default(),
        Arc::clone(&store),
        config.mailbox_capacity,
    );
    let state = web::Data::new(AgentState::new(handle, config.name, config.address));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
