use std::sync::Arc;
use std::time::Duration;

use x402::HttpFacilitatorClient;
use x402_agent::{spawn_agent, AgentConfig, ConversationStore, KeywordClassifier};

use crate::config::GatewayConfig;
use crate::gate::PaymentGate;
use crate::router::{AgentLink, EmbeddedAgentRouter, HttpAgentRouter};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    /// Gate in front of `/weather`
    pub weather_gate: Arc<PaymentGate<HttpFacilitatorClient>>,
    pub agent: Arc<AgentLink>,
}

impl AppState {
    /// `http` is shared by facilitator calls; build it with [`x402::http_client`]
    /// so redirects are never followed.
    pub fn new(config: GatewayConfig, agent: AgentLink, http: reqwest::Client) -> Self {
        let facilitator = HttpFacilitatorClient::with_client(
            http,
            &config.facilitator_url,
            config.facilitator_timeout,
        );
        let requirements = config
            .terms
            .requirements(config.weather_amount, Some("Weather lookup"));
        let weather_gate = PaymentGate::new(
            facilitator.clone(),
            Arc::new(requirements),
            config.display_price(),
            facilitator.settle_endpoint(),
        );

        Self {
            config: Arc::new(config),
            weather_gate: Arc::new(weather_gate),
            agent: Arc::new(agent),
        }
    }

    /// Build the agent link the config asks for. Embedded mode spawns the
    /// agent actor on the current runtime.
    pub fn agent_link(config: &GatewayConfig, http: reqwest::Client) -> AgentLink {
        match (config.agent_embedded, config.agent_seed.as_deref()) {
            (true, Some(seed)) => {
                let agent_config = AgentConfig::with_seed(seed);
                let store = Arc::new(ConversationStore::new(agent_config.store_limits));
                store.start_cleanup(Duration::from_secs(60));
                let handle = spawn_agent(
                    KeywordClassifier::default(),
                    store,
                    agent_config.mailbox_capacity,
                );
                AgentLink::Embedded(EmbeddedAgentRouter::new(handle, config.agent_timeout))
            }
            _ => AgentLink::Remote(HttpAgentRouter::new(
                http,
                config.agent_url.clone(),
                config.agent_timeout,
            )),
        }
    }
}
