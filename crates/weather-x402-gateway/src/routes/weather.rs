//! POST /weather, the payment-gated endpoint.
//!
//! Every gate outcome is answered with 200 and a `status` field, so browser
//! clients can render the payment flow without special-casing HTTP codes.

use actix_web::{web, HttpRequest, HttpResponse};

use super::{forward_counted, AgentResponse, ChatMessage};
use crate::gate::{GateOutcome, ProofInput};
use crate::state::AppState;

const ENDPOINT: &str = "weather";

const PAYMENT_REQUIRED_MESSAGE: &str = "Payment required for weather API access. \
     Weather API access requires payment. Please provide payment proof.";

pub async fn weather(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ChatMessage>,
) -> HttpResponse {
    let header = req
        .headers()
        .get(x402::PAYMENT_HEADER)
        .and_then(|v| v.to_str().ok());
    let input = ProofInput::resolve(body.payment_proof.as_deref(), header);

    let response = match state.weather_gate.evaluate(input).await {
        GateOutcome::PaymentRequired {
            price,
            payment_endpoint,
        } => AgentResponse::new(
            PAYMENT_REQUIRED_MESSAGE,
            "payment_required",
            serde_json::json!({
                "endpoint": ENDPOINT,
                "payment_required": true,
                "price": price,
                "payment_endpoint": payment_endpoint,
            }),
        ),
        GateOutcome::Rejected(err) => AgentResponse::new(
            err.user_message(),
            err.status_label(),
            serde_json::json!({
                "endpoint": ENDPOINT,
                "error": err.reason(),
            }),
        ),
        GateOutcome::Settled(receipt) => {
            let query = format!("Get weather for: {}", body.message);
            match forward_counted(&state, ENDPOINT, &query, body.user_address.as_deref()).await {
                Ok(reply) => AgentResponse::new(
                    reply,
                    "success",
                    serde_json::json!({
                        "endpoint": ENDPOINT,
                        "payment_verified": true,
                        "transaction": receipt.transaction,
                        "payer": receipt.payer,
                    }),
                ),
                // The payment already went through; report it alongside the failure.
                Err(err) => AgentResponse::new(
                    err.user_message(),
                    err.status_label(),
                    serde_json::json!({
                        "endpoint": ENDPOINT,
                        "error": err.reason(),
                        "payment_verified": true,
                        "transaction": receipt.transaction,
                        "payer": receipt.payer,
                    }),
                ),
            }
        }
    };

    HttpResponse::Ok().json(response)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/weather", web::post().to(weather));
}
