use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub trips_started_total: IntCounter,
    pub trips_finished_total: IntCounterVec,
    pub trip_transitions_total: IntCounterVec,
    pub active_trips: IntGauge,
    pub position_requests_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let trips_started_total =
            IntCounter::new("trips_started_total", "Total trips requested")
                .expect("valid trips_started_total metric");

        let trips_finished_total = IntCounterVec::new(
            Opts::new("trips_finished_total", "Trips that reached a terminal status"),
            &["outcome"],
        )
        .expect("valid trips_finished_total metric");

        let trip_transitions_total = IntCounterVec::new(
            Opts::new("trip_transitions_total", "Trip status transitions by target status"),
            &["status"],
        )
        .expect("valid trip_transitions_total metric");

        let active_trips = IntGauge::new("active_trips", "Trips currently in a non-terminal status")
            .expect("valid active_trips metric");

        let position_requests_total = IntCounterVec::new(
            Opts::new("position_requests_total", "Device position requests by outcome"),
            &["outcome"],
        )
        .expect("valid position_requests_total metric");

        registry
            .register(Box::new(trips_started_total.clone()))
            .expect("register trips_started_total");
        registry
            .register(Box::new(trips_finished_total.clone()))
            .expect("register trips_finished_total");
        registry
            .register(Box::new(trip_transitions_total.clone()))
            .expect("register trip_transitions_total");
        registry
            .register(Box::new(active_trips.clone()))
            .expect("register active_trips");
        registry
            .register(Box::new(position_requests_total.clone()))
            .expect("register position_requests_total");

        Self {
            registry,
            trips_started_total,
            trips_finished_total,
            trip_transitions_total,
            active_trips,
            position_requests_total,
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
