//! Performance benchmarks for the lifecycle listener hot paths

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dns_server_metrics::dns::context::{
    Network, Protocol, RequestContext, RequestInfo, ServerInfo,
};
use dns_server_metrics::dns::protocol::{DnsPacket, QueryType, ResultCode};
use dns_server_metrics::dns::server::SocketResponseWriter;
use dns_server_metrics::metrics::{
    MetricsConfig, MetricsListener, ServerMetrics, ServerMetricsListener,
};
use std::sync::Arc;

fn listener() -> ServerMetricsListener {
    let metrics = ServerMetrics::new(&MetricsConfig::default()).unwrap();
    ServerMetricsListener::new(Arc::new(metrics))
}

fn context() -> RequestContext {
    RequestContext::start(Arc::new(ServerInfo::new("bench", "0.0.0.0:53", Protocol::Dns)))
        .with_request_info(RequestInfo {
            request_size: 45,
            response_size: 120,
        })
}

fn bench_on_request(c: &mut Criterion) {
    let listener = listener();
    let ctx = context();
    let rw = SocketResponseWriter::new(
        "0.0.0.0:53".parse().unwrap(),
        "192.0.2.1:40000".parse().unwrap(),
        Network::Udp,
    );
    let req = DnsPacket::query(1, "example.com", QueryType::A);
    let resp = DnsPacket::response_to(&req, ResultCode::NOERROR);
    let odd = DnsPacket::response_to(&req, ResultCode::Unknown(3000));

    let mut group = c.benchmark_group("on_request");

    group.bench_function("answered", |b| {
        b.iter(|| listener.on_request(black_box(&ctx), black_box(&req), Some(&resp), &rw))
    });

    group.bench_function("dropped", |b| {
        b.iter(|| listener.on_request(black_box(&ctx), black_box(&req), None, &rw))
    });

    group.bench_function("unknown_rcode", |b| {
        b.iter(|| listener.on_request(black_box(&ctx), black_box(&req), Some(&odd), &rw))
    });

    group.finish();
}

fn bench_server_level(c: &mut Criterion) {
    let listener = listener();
    let ctx = context();

    c.bench_function("on_invalid_msg", |b| b.iter(|| listener.on_invalid_msg(black_box(&ctx))));
    c.bench_function("on_error", |b| {
        b.iter(|| listener.on_error(black_box(&ctx), &std::fmt::Error))
    });
}

fn bench_quic(c: &mut Criterion) {
    let listener = listener();
    let mut hit = false;

    c.bench_function("on_quic_addr_validation", |b| {
        b.iter(|| {
            hit = !hit;
            listener.on_quic_addr_validation(black_box(hit))
        })
    });
}

criterion_group!(benches, bench_on_request, bench_server_level, bench_quic);
criterion_main!(benches);
