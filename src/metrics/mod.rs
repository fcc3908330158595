//! Prometheus metrics for the DNS server request lifecycle
//!
//! `ServerMetrics` owns the metric families, `ServerMetricsListener` turns
//! lifecycle events into updates of those families.

pub mod config;
pub mod errors;
pub mod labels;
pub mod listener;
pub mod quic;
pub mod registry;

pub use config::{MetricsConfig, DNS_SIZE_BUCKETS};
pub use errors::{MetricsError, MetricsResult};
pub use labels::DROPPED_RCODE;
pub use listener::{
    EmptyMetricsListener, MetricsListener, MultiMetricsListener, ServerMetricsListener,
};
pub use quic::QuicValidationCounters;
pub use registry::ServerMetrics;
