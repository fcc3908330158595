//! DNS server request metrics
//!
//! Observes every request a DNS server handles and derives a bounded set of
//! labeled Prometheus counters and histograms from it, without blocking the
//! serving path.
//!
//! # Architecture
//!
//! * `dns` - message model, per-request context and the lifecycle driver
//! * `metrics` - metric families, label schemas and lifecycle listeners
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use dns_server_metrics::dns::context::{
//!     Network, Protocol, RequestContext, RequestInfo, ServerInfo,
//! };
//! use dns_server_metrics::dns::protocol::{DnsPacket, QueryType, ResultCode};
//! use dns_server_metrics::dns::server::{serve_request, SocketResponseWriter};
//! use dns_server_metrics::metrics::{MetricsConfig, ServerMetrics, ServerMetricsListener};
//!
//! let metrics = Arc::new(ServerMetrics::new(&MetricsConfig::default()).unwrap());
//! let listener = ServerMetricsListener::new(metrics.clone());
//!
//! let info = Arc::new(ServerInfo::new("main", "0.0.0.0:53", Protocol::Dns));
//! let rw = SocketResponseWriter::new(
//!     "0.0.0.0:53".parse().unwrap(),
//!     "192.0.2.1:41000".parse().unwrap(),
//!     Network::Udp,
//! );
//! let req = DnsPacket::query(1, "example.com", QueryType::A);
//!
//! let mut ctx = RequestContext::start(info);
//! serve_request(&listener, &mut ctx, &req, &rw, |ctx, req| {
//!     ctx.set_request_info(RequestInfo { request_size: 29, response_size: 45 });
//!     Ok(Some(DnsPacket::response_to(req, ResultCode::NOERROR)))
//! });
//!
//! assert!(metrics.gather_text().unwrap().contains("dns_server_response_rcode_total"));
//! ```

/// DNS message model, request context and lifecycle driver
pub mod dns;

/// Prometheus metric families and lifecycle listeners
pub mod metrics;
