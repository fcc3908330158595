//! Property-based tests for label derivation and counter accounting

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use dns_server_metrics::dns::context::{
    Network, Protocol, RequestContext, RequestInfo, ServerInfo,
};
use dns_server_metrics::dns::protocol::{DnsPacket, DnsQuestion, QueryType, ResultCode};
use dns_server_metrics::dns::server::SocketResponseWriter;
use dns_server_metrics::metrics::labels::{
    family_label, qtype_label, rcode_label, DROPPED_RCODE,
};
use dns_server_metrics::metrics::{
    MetricsConfig, MetricsListener, ServerMetrics, ServerMetricsListener,
};
use proptest::prelude::*;

// Strategy for client addresses of either family
fn socket_addr_strategy() -> impl Strategy<Value = SocketAddr> {
    prop_oneof![
        (any::<u32>(), any::<u16>())
            .prop_map(|(ip, port)| SocketAddr::new(IpAddr::V4(Ipv4Addr::from(ip)), port)),
        (any::<u128>(), any::<u16>())
            .prop_map(|(ip, port)| SocketAddr::new(IpAddr::V6(Ipv6Addr::from(ip)), port)),
    ]
}

// Strategy for an outcome: `None` drops the request
fn outcome_strategy() -> impl Strategy<Value = Option<u16>> {
    prop::option::of(prop_oneof![0u16..24, any::<u16>()])
}

proptest! {
    #[test]
    fn test_rcode_label_stable_and_non_empty(code in any::<u16>()) {
        let label = rcode_label(ResultCode::from_num(code));

        prop_assert!(!label.is_empty());
        prop_assert_ne!(&*label, DROPPED_RCODE);
        prop_assert_eq!(label.clone(), rcode_label(ResultCode::from_num(code)));
    }

    #[test]
    fn test_rcode_labels_distinct(a in any::<u16>(), b in any::<u16>()) {
        prop_assume!(a != b);
        prop_assert_ne!(
            rcode_label(ResultCode::from_num(a)),
            rcode_label(ResultCode::from_num(b))
        );
    }

    #[test]
    fn test_rcode_label_depends_only_on_value(code in any::<u16>()) {
        prop_assert_eq!(
            rcode_label(ResultCode::Unknown(code)),
            rcode_label(ResultCode::from_num(code))
        );
    }

    #[test]
    fn test_qtype_label_bounded(qtypes in prop::collection::vec(any::<u16>(), 0..3)) {
        let mut req = DnsPacket::new();
        for qtype in &qtypes {
            let question = DnsQuestion::new("example.com".to_string(), QueryType::from_num(*qtype));
            req.questions.push(question);
        }

        let label = qtype_label(&req);
        if qtypes.len() != 1 {
            prop_assert_eq!(label, "OTHER");
        }
        prop_assert!(label.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        prop_assert!(label.len() <= 6);
    }

    #[test]
    fn test_family_label(addr in socket_addr_strategy()) {
        let label = family_label(&addr);
        match addr.ip() {
            IpAddr::V4(_) => prop_assert_eq!(label, "1"),
            IpAddr::V6(ip) if ip.to_ipv4_mapped().is_some() => prop_assert_eq!(label, "1"),
            IpAddr::V6(_) => prop_assert_eq!(label, "2"),
        }
    }

    #[test]
    fn test_every_request_counted_once(
        outcomes in prop::collection::vec((outcome_strategy(), socket_addr_strategy()), 1..40)
    ) {
        let metrics = Arc::new(ServerMetrics::new(&MetricsConfig::default()).unwrap());
        let listener = ServerMetricsListener::new(metrics.clone());
        let info = Arc::new(ServerInfo::new("prop", "127.0.0.1:53", Protocol::DoQ));
        let req = DnsPacket::query(9, "example.com", QueryType::A);

        let mut answered = 0u64;
        for (outcome, remote) in &outcomes {
            let ctx = RequestContext::new()
                .with_server_info(info.clone())
                .with_start_time(Instant::now())
                .with_request_info(RequestInfo { request_size: 30, response_size: 60 });
            let rw =
                SocketResponseWriter::new("127.0.0.1:53".parse().unwrap(), *remote, Network::Udp);
            let resp =
                outcome.map(|code| DnsPacket::response_to(&req, ResultCode::from_num(code)));
            if resp.is_some() {
                answered += 1;
            }

            listener.on_request(&ctx, &req, resp.as_ref(), &rw);
        }

        let server = ["prop", "doq", "127.0.0.1:53"];
        let total = outcomes.len() as u64;
        let v4 = metrics
            .request_total
            .with_label_values(&["prop", "doq", "udp", "127.0.0.1:53", "A", "1"])
            .get();
        let v6 = metrics
            .request_total
            .with_label_values(&["prop", "doq", "udp", "127.0.0.1:53", "A", "2"])
            .get();
        prop_assert_eq!(v4 + v6, total);

        let dropped = metrics
            .response_rcode
            .with_label_values(&["prop", "doq", "127.0.0.1:53", DROPPED_RCODE])
            .get();
        prop_assert_eq!(dropped, total - answered);
        prop_assert_eq!(metrics.request_size.with_label_values(&server).get_sample_count(), total);
        prop_assert_eq!(
            metrics.response_size.with_label_values(&server).get_sample_count(),
            answered
        );
    }
}
