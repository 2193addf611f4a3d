use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{LazyLock, Once};

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Gate outcomes: payment_required, payment_failed, settled.
// reason is the deciding step: none, invalid_format, verify_error,
// verify_rejected, settle_error, settle_rejected
pub static GATE_OUTCOMES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("gateway_gate_outcomes_total", "Payment gate outcomes"),
        &["outcome", "reason"],
    )
    .unwrap()
});

pub static FACILITATOR_LATENCY: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gateway_facilitator_latency_seconds",
            "Facilitator call latency",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["phase", "result"],
    )
    .unwrap()
});

// Agent forwards: ok, unavailable, timeout
pub static AGENT_FORWARDS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("gateway_agent_forwards_total", "Messages forwarded to the agent"),
        &["endpoint", "result"],
    )
    .unwrap()
});

static REGISTER: Once = Once::new();

/// Register all metrics with the registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY.register(Box::new(GATE_OUTCOMES.clone())).unwrap();
        REGISTRY
            .register(Box::new(FACILITATOR_LATENCY.clone()))
            .unwrap();
        REGISTRY.register(Box::new(AGENT_FORWARDS.clone())).unwrap();
    });
}

/// Everything in [`REGISTRY`], in the Prometheus text exposition format.
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
