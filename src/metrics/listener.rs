//! Request lifecycle listeners
//!
//! The server calls a `MetricsListener` synchronously at five points of a
//! request's life. Implementations must be cheap and must never block, since
//! they run on the serving path of every request.

use std::any::Any;
use std::error::Error;
use std::sync::Arc;

use crate::dns::context::RequestContext;
use crate::dns::protocol::DnsPacket;
use crate::dns::server::ResponseWriter;
use crate::metrics::labels::{rcode_label, RequestLabels, ServerLabels, DROPPED_RCODE};
use crate::metrics::registry::ServerMetrics;

/// Observer of DNS server request lifecycle events
///
/// Hooks are invoked concurrently from every request in flight. For a single
/// request the server calls at most one of `on_request`, `on_error`,
/// `on_panic` and `on_invalid_msg`.
pub trait MetricsListener: Send + Sync {
    /// A request reached a terminal outcome. `resp` is `None` when the
    /// request was dropped without an answer.
    fn on_request(
        &self,
        ctx: &RequestContext,
        req: &DnsPacket,
        resp: Option<&DnsPacket>,
        rw: &dyn ResponseWriter,
    );

    /// A message could not be parsed.
    fn on_invalid_msg(&self, ctx: &RequestContext);

    /// Handling failed with `err`.
    fn on_error(&self, ctx: &RequestContext, err: &(dyn Error + 'static));

    /// Handling panicked; `value` is the recovered payload.
    fn on_panic(&self, ctx: &RequestContext, value: &(dyn Any + Send));

    /// The QUIC address validation cache was consulted.
    fn on_quic_addr_validation(&self, hit: bool);
}

/// Listener that updates the prometheus families of `ServerMetrics`
///
/// Requires the context to carry server info on every hook, and also start
/// time and request info on `on_request`. A missing field panics.
#[derive(Clone)]
pub struct ServerMetricsListener {
    metrics: Arc<ServerMetrics>,
}

impl ServerMetricsListener {
    pub fn new(metrics: Arc<ServerMetrics>) -> Self {
        ServerMetricsListener { metrics }
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.metrics
    }
}

impl MetricsListener for ServerMetricsListener {
    fn on_request(
        &self,
        ctx: &RequestContext,
        req: &DnsPacket,
        resp: Option<&DnsPacket>,
        rw: &dyn ResponseWriter,
    ) {
        let server_info = ctx.must_server_info();
        let start_time = ctx.must_start_time();
        let request_info = ctx.must_request_info();

        let remote = rw.remote_addr();
        let request_labels = RequestLabels::new(server_info, req, rw.network(), &remote);
        self.metrics
            .request_total
            .with_label_values(&request_labels.values())
            .inc();

        let server_labels = request_labels.server.values();
        self.metrics
            .request_duration
            .with_label_values(&server_labels)
            .observe(start_time.elapsed().as_secs_f64());

        self.metrics
            .request_size
            .with_label_values(&server_labels)
            .observe(request_info.request_size as f64);

        match resp {
            Some(resp) => {
                self.metrics
                    .response_size
                    .with_label_values(&server_labels)
                    .observe(request_info.response_size as f64);

                let rcode = rcode_label(resp.header.rescode);
                self.metrics
                    .response_rcode
                    .with_label_values(&request_labels.server.with_rcode(&rcode))
                    .inc();
            }
            None => {
                self.metrics
                    .response_rcode
                    .with_label_values(&request_labels.server.with_rcode(DROPPED_RCODE))
                    .inc();
            }
        }
    }

    fn on_invalid_msg(&self, ctx: &RequestContext) {
        let labels = ServerLabels::new(ctx.must_server_info());
        self.metrics
            .invalid_msg_total
            .with_label_values(&labels.values())
            .inc();
    }

    fn on_error(&self, ctx: &RequestContext, _err: &(dyn Error + 'static)) {
        let labels = ServerLabels::new(ctx.must_server_info());
        self.metrics
            .error_total
            .with_label_values(&labels.values())
            .inc();
    }

    fn on_panic(&self, ctx: &RequestContext, _value: &(dyn Any + Send)) {
        let labels = ServerLabels::new(ctx.must_server_info());
        self.metrics
            .panic_total
            .with_label_values(&labels.values())
            .inc();
    }

    #[inline]
    fn on_quic_addr_validation(&self, hit: bool) {
        self.metrics.quic_addr_validation.record(hit);
    }
}

/// Listener that does nothing
#[derive(Copy, Clone, Debug, Default)]
pub struct EmptyMetricsListener;

impl MetricsListener for EmptyMetricsListener {
    fn on_request(
        &self,
        _: &RequestContext,
        _: &DnsPacket,
        _: Option<&DnsPacket>,
        _: &dyn ResponseWriter,
    ) {
    }

    fn on_invalid_msg(&self, _: &RequestContext) {}

    fn on_error(&self, _: &RequestContext, _: &(dyn Error + 'static)) {}

    fn on_panic(&self, _: &RequestContext, _: &(dyn Any + Send)) {}

    fn on_quic_addr_validation(&self, _: bool) {}
}

/// Listener that forwards every event to each of its listeners, in order
#[derive(Clone, Default)]
pub struct MultiMetricsListener {
    listeners: Vec<Arc<dyn MetricsListener>>,
}

impl MultiMetricsListener {
    pub fn new(listeners: Vec<Arc<dyn MetricsListener>>) -> Self {
        MultiMetricsListener { listeners }
    }

    pub fn push(&mut self, listener: Arc<dyn MetricsListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl MetricsListener for MultiMetricsListener {
    fn on_request(
        &self,
        ctx: &RequestContext,
        req: &DnsPacket,
        resp: Option<&DnsPacket>,
        rw: &dyn ResponseWriter,
    ) {
        for listener in &self.listeners {
            listener.on_request(ctx, req, resp, rw);
        }
    }

    fn on_invalid_msg(&self, ctx: &RequestContext) {
        for listener in &self.listeners {
            listener.on_invalid_msg(ctx);
        }
    }

    fn on_error(&self, ctx: &RequestContext, err: &(dyn Error + 'static)) {
        for listener in &self.listeners {
            listener.on_error(ctx, err);
        }
    }

    fn on_panic(&self, ctx: &RequestContext, value: &(dyn Any + Send)) {
        for listener in &self.listeners {
            listener.on_panic(ctx, value);
        }
    }

    fn on_quic_addr_validation(&self, hit: bool) {
        for listener in &self.listeners {
            listener.on_quic_addr_validation(hit);
        }
    }
}
