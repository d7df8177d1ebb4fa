use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

const DISTANCE_BUCKETS: &[f64] = &[
    5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 150.0, 250.0, 500.0, 1_000.0, 5_000.0,
];

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub confirmations_total: IntCounterVec,
    pub confirmation_latency_seconds: HistogramVec,
    pub claim_distance_meters: HistogramVec,
    pub store_conflicts_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let confirmations_total = IntCounterVec::new(
            Opts::new(
                "confirmations_total",
                "Checkpoint confirmation attempts by checkpoint and outcome",
            ),
            &["checkpoint", "outcome"],
        )
        .expect("valid confirmations_total metric");

        let confirmation_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "confirmation_latency_seconds",
                "Latency of confirmation processing in seconds",
            ),
            &["outcome"],
        )
        .expect("valid confirmation_latency_seconds metric");

        let claim_distance_meters = HistogramVec::new(
            HistogramOpts::new(
                "claim_distance_meters",
                "Distance between claimed position and checkpoint",
            )
            .buckets(DISTANCE_BUCKETS.to_vec()),
            &["checkpoint"],
        )
        .expect("valid claim_distance_meters metric");

        let store_conflicts_total = IntCounter::new(
            "store_conflicts_total",
            "Compare-and-set attempts that lost to a concurrent confirmation",
        )
        .expect("valid store_conflicts_total metric");

        registry
            .register(Box::new(confirmations_total.clone()))
            .expect("register confirmations_total");
        registry
            .register(Box::new(confirmation_latency_seconds.clone()))
            .expect("register confirmation_latency_seconds");
        registry
            .register(Box::new(claim_distance_meters.clone()))
            .expect("register claim_distance_meters");
        registry
            .register(Box::new(store_conflicts_total.clone()))
            .expect("register store_conflicts_total");

        Self {
            registry,
            confirmations_total,
            confirmation_latency_seconds,
            claim_distance_meters,
            store_conflicts_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
