use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounter;
use prometheus::IntGauge;
use prometheus::Registry;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

use crate::MonitoringConfig;
use crate::ObserveHealth;
use crate::Result;


lazy_static! {
    pub static ref OBSERVE_RELATIONS_RECEIVED: IntCounter = IntCounter::new(
        "observe_relations_received",
        "Number of processed observe registration requests"
    )
    .expect("metric can not be created");

    pub static ref OBSERVE_CANCELS_RECEIVED: IntCounter = IntCounter::new(
        "observe_cancels_received",
        "Number of processed observe deregistration requests"
    )
    .expect("metric can not be created");

    pub static ref OBSERVE_REJECTS_RECEIVED: IntCounter = IntCounter::new(
        "observe_rejects_received",
        "Number of notifications rejected by observers"
    )
    .expect("metric can not be created");

    pub static ref OBSERVE_RELATIONS: IntGauge =
        IntGauge::new("observe_relations", "Current number of observe relations")
            .expect("metric can not be created");

    pub static ref OBSERVE_ENDPOINTS: IntGauge =
        IntGauge::new("observe_endpoints", "Current number of observing endpoints")
            .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

/// Registers the observe metrics in [`REGISTRY`]. Repeated calls are no-ops.
pub fn register_observe_metrics() -> Result<()> {
    let collectors: [Box<dyn prometheus::core::Collector>; 5] = [
        Box::new(OBSERVE_RELATIONS_RECEIVED.clone()),
        Box::new(OBSERVE_CANCELS_RECEIVED.clone()),
        Box::new(OBSERVE_REJECTS_RECEIVED.clone()),
        Box::new(OBSERVE_RELATIONS.clone()),
        Box::new(OBSERVE_ENDPOINTS.clone()),
    ];
    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// [`ObserveHealth`] backed by the process wide prometheus metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObserveMetrics;

impl ObserveMetrics {
    pub fn new() -> Result<Self> {
        register_observe_metrics()?;
        Ok(ObserveMetrics)
    }
}

impl ObserveHealth for ObserveMetrics {
    fn receiving_observe_relation(&self) {
        OBSERVE_RELATIONS_RECEIVED.inc();
    }

    fn receiving_cancel_request(&self) {
        OBSERVE_CANCELS_RECEIVED.inc();
    }

    fn receiving_reject(&self) {
        OBSERVE_REJECTS_RECEIVED.inc();
    }

    fn set_observe_relations(
        &self,
        count: usize,
    ) {
        OBSERVE_RELATIONS.set(count as i64);
    }

    fn set_observe_endpoints(
        &self,
        count: usize,
    ) {
        OBSERVE_ENDPOINTS.set(count as i64);
    }
}

/// Renders [`REGISTRY`] in the prometheus text format.
pub fn gather_metrics() -> Result<String> {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| crate::Error::Metrics(e.to_string()))
}

/// Serves `/metrics` on the configured address until `shutdown_signal`
/// fires. Returns right away if monitoring is disabled.
pub async fn start_server(
    config: &MonitoringConfig,
    mut shutdown_signal: watch::Receiver<()>,
) -> Result<()> {
    let Some(address) = config.metrics_address() else {
        debug!("Observe metrics server disabled");
        return Ok(());
    };
    register_observe_metrics()?;

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    let (bound, server) = warp::serve(metrics_route)
        .try_bind_with_graceful_shutdown(address, async move {
            let _ = shutdown_signal.changed().await;
        })
        .map_err(|e| crate::Error::Metrics(format!("bind {address}: {e}")))?;
    info!("Serving observe metrics on {}", bound);
    server.await;
    info!("Observe metrics server on {} stopped", bound);
    Ok(())
}

async fn metrics_handler() -> std::result::Result<impl Reply, Rejection> {
    match gather_metrics() {
        Ok(body) => Ok(body),
        Err(e) => {
            error!("could not encode observe metrics: {}", e);
            Ok(String::default())
        }
    }
}
