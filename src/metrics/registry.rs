//! Server metric families
//!
//! `ServerMetrics` declares every family exactly once, against a registry the
//! caller owns or a fresh one. Nothing here is process-global, so tests build
//! their own instance and read it back in isolation.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

use crate::metrics::config::MetricsConfig;
use crate::metrics::errors::MetricsResult;
use crate::metrics::labels::{RCODE_LABELS, REQUEST_LABELS, SERVER_LABELS};
use crate::metrics::quic::QuicValidationCounters;

/// Prometheus metric families of a DNS server
#[derive(Clone)]
pub struct ServerMetrics {
    registry: Registry,
    /// Processed requests, full label schema
    pub request_total: IntCounterVec,
    /// Seconds from request start to completion
    pub request_duration: HistogramVec,
    pub request_size: HistogramVec,
    pub response_size: HistogramVec,
    /// Responses by code, plus `DROPPED` for unanswered requests
    pub response_rcode: IntCounterVec,
    pub error_total: IntCounterVec,
    pub panic_total: IntCounterVec,
    pub invalid_msg_total: IntCounterVec,
    pub quic_addr_validation: QuicValidationCounters,
}

impl ServerMetrics {
    /// Declares the families in a new registry.
    pub fn new(config: &MetricsConfig) -> MetricsResult<Self> {
        ServerMetrics::register(config, Registry::new())
    }

    /// Declares the families in `registry`.
    ///
    /// Fails if any of them is already registered there.
    pub fn register(config: &MetricsConfig, registry: Registry) -> MetricsResult<Self> {
        config.validate()?;

        let counter = |name: &str, help: &str, labels: &[&str]| -> MetricsResult<IntCounterVec> {
            let vec = IntCounterVec::new(
                Opts::new(name, help)
                    .namespace(config.namespace.as_str())
                    .subsystem(config.subsystem.as_str()),
                labels,
            )?;
            registry.register(Box::new(vec.clone()))?;
            Ok(vec)
        };

        let histogram = |name: &str, help: &str, buckets: &[f64]| -> MetricsResult<HistogramVec> {
            let vec = HistogramVec::new(
                HistogramOpts::new(name, help)
                    .namespace(config.namespace.as_str())
                    .subsystem(config.subsystem.as_str())
                    .buckets(buckets.to_vec()),
                &SERVER_LABELS,
            )?;
            registry.register(Box::new(vec.clone()))?;
            Ok(vec)
        };

        let metrics = ServerMetrics {
            request_total: counter(
                "request_total",
                "The number of processed DNS requests.",
                &REQUEST_LABELS[..],
            )?,
            request_duration: histogram(
                "request_duration_seconds",
                "Time elapsed on processing a DNS query.",
                &config.duration_buckets[..],
            )?,
            request_size: histogram(
                "request_size_bytes",
                "Size of the DNS requests in bytes.",
                &config.size_buckets[..],
            )?,
            response_size: histogram(
                "response_size_bytes",
                "Size of the DNS responses in bytes.",
                &config.size_buckets[..],
            )?,
            response_rcode: counter(
                "response_rcode_total",
                "The counter for DNS response codes.",
                &RCODE_LABELS[..],
            )?,
            error_total: counter(
                "error_total",
                "The number of errors occurred in the DNS server.",
                &SERVER_LABELS[..],
            )?,
            panic_total: counter(
                "panic_total",
                "The number of panics occurred in the DNS server.",
                &SERVER_LABELS[..],
            )?,
            invalid_msg_total: counter(
                "invalid_msg_total",
                "The number of invalid DNS messages processed by the DNS server.",
                &SERVER_LABELS[..],
            )?,
            quic_addr_validation: QuicValidationCounters::register(config, &registry)?,
            registry,
        };

        log::info!(
            "Server metrics registered under {}_{}",
            config.namespace,
            config.subsystem
        );

        Ok(metrics)
    }

    /// Registry holding the families, for scrapers.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Renders all families in the Prometheus text format.
    pub fn gather_text(&self) -> MetricsResult<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;

        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::errors::MetricsError;

    #[test]
    fn test_families_are_prefixed() {
        let metrics = ServerMetrics::new(&MetricsConfig::default()).unwrap();
        metrics
            .request_total
            .with_label_values(&["main", "dns", "udp", "0.0.0.0:53", "A", "1"])
            .inc();

        let exported = metrics.gather_text().unwrap();
        assert!(exported.contains("# HELP dns_server_request_total"));
        assert!(exported.contains("# TYPE dns_server_request_total counter"));
        assert!(exported.contains("dns_server_quic_addr_validation_lookups{hit=\"1\"} 0"));
    }

    #[test]
    fn test_custom_namespace() {
        let config = MetricsConfig {
            namespace: "edge".to_string(),
            subsystem: "dns".to_string(),
            ..MetricsConfig::default()
        };
        let metrics = ServerMetrics::new(&config).unwrap();
        metrics.error_total.with_label_values(&["a", "doh", "b"]).inc();

        let exported = metrics.gather_text().unwrap();
        assert!(exported.contains("edge_dns_error_total{addr=\"b\",name=\"a\",proto=\"doh\"} 1"));
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        let config = MetricsConfig::default();

        assert!(ServerMetrics::register(&config, registry.clone()).is_ok());
        let result = ServerMetrics::register(&config, registry);
        assert!(matches!(result, Err(MetricsError::Prometheus(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MetricsConfig {
            size_buckets: vec![],
            ..MetricsConfig::default()
        };

        assert!(matches!(
            ServerMetrics::new(&config),
            Err(MetricsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_size_buckets() {
        let metrics = ServerMetrics::new(&MetricsConfig::default()).unwrap();
        metrics
            .request_size
            .with_label_values(&["main", "dns", "0.0.0.0:53"])
            .observe(64.0);

        let families = metrics.registry().gather();
        let family = families
            .iter()
            .find(|f| f.get_name() == "dns_server_request_size_bytes")
            .unwrap();
        let histogram = family.get_metric()[0].get_histogram();
        let bounds: Vec<f64> = histogram
            .get_bucket()
            .iter()
            .map(|b| b.get_upper_bound())
            .collect();

        assert_eq!(bounds, crate::metrics::config::DNS_SIZE_BUCKETS.to_vec());
    }
}
