use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use x402_gateway::{config::GatewayConfig, metrics::register_metrics, routes, state::AppState};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = GatewayConfig::from_env().expect("Failed to load configuration");
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let rate_limit_rpm = config.rate_limit_rpm;

    tracing::info!("Starting x402-gateway on port {}", port);
    tracing::info!("Facilitator URL: {}", config.facilitator_url);
    tracing::info!(
        "Weather price: {} ({} units)",
        config.display_price(),
        config.weather_amount
    );
    tracing::info!("Pay to: {:#x} on {}", config.terms.pay_to, config.terms.network);

    let http = x402::http_client().expect("Failed to build HTTP client");
    let agent = AppState::agent_link(&config, http.clone());
    tracing::info!("Agent: {} ({})", agent.endpoint(), config.agent_address);

    // Register Prometheus metrics
    register_metrics();

    let state_data = web::Data::new(AppState::new(config, agent, http));

    // Configure rate limiter
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm as u64)
        .finish()
        .expect("Failed to create rate limiter config");

    HttpServer::new(move || {
        let cors = x402_gateway::cors::build_cors(&allowed_origins);

        App::new()
            .app_data(state_data.clone())
            .app_data(routes::json_config())
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(Governor::new(&governor_conf))
            .configure(routes::health::configure)
            .configure(routes::weather::configure)
            .configure(routes::chat::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
