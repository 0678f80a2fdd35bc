//! The status-transition metrics recorder (§4.6, C7): turns the lifecycle
//! events a reconciliation call returns into duration gauges, backed by the
//! `metrics`/`metrics-exporter-prometheus` crates.

pub mod recorder;
pub mod status_transition;

pub use recorder::install_prometheus_recorder;
pub use status_transition::record_status_transition_metrics;
