use std::env;
use std::net::{Ipv6Addr, SocketAddr};
use std::process;
use std::sync::Arc;

use getopts::Options;
use tracing_subscriber::EnvFilter;

use dns_server_metrics::dns::context::{
    Network, Protocol, RequestContext, RequestInfo, ServerInfo,
};
use dns_server_metrics::dns::protocol::{DnsPacket, QueryType, ResultCode};
use dns_server_metrics::dns::server::{serve_request, HandlerResult, SocketResponseWriter};
use dns_server_metrics::metrics::{
    MetricsConfig, MetricsListener, ServerMetrics, ServerMetricsListener,
};

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

/// Answers every fourth query with NXDOMAIN, drops every seventh, fails every
/// eleventh.
fn simulated_handler(n: usize) -> impl FnOnce(&mut RequestContext, &DnsPacket) -> HandlerResult {
    move |ctx, req| {
        let request_size = 17 + req.questions.iter().map(|q| q.name.len() + 2).sum::<usize>();

        if n % 11 == 10 {
            return Err(format!("upstream timeout for query {}", req.header.id).into());
        }

        if n % 7 == 6 {
            ctx.set_request_info(RequestInfo {
                request_size,
                response_size: 0,
            });
            return Ok(None);
        }

        let rescode = if n % 4 == 3 {
            ResultCode::NXDOMAIN
        } else {
            ResultCode::NOERROR
        };
        ctx.set_request_info(RequestInfo {
            request_size,
            response_size: request_size + 16 * (n % 5),
        });

        Ok(Some(DnsPacket::response_to(req, rescode)))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");
    opts.optopt("c", "config", "TOML file with the metrics configuration", "FILE");
    opts.optopt("n", "requests", "Number of simulated requests (default 20)", "COUNT");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!("{}", e);
            print_usage(&program, opts);
            process::exit(2);
        }
    };

    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }

    let config = match matches.opt_str("c") {
        Some(path) => match MetricsConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load {}: {}", path, e);
                process::exit(1);
            }
        },
        None => MetricsConfig::default(),
    };

    let requests = match matches.opt_str("n").map(|n| n.parse::<usize>()) {
        None => 20,
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            tracing::error!("Invalid request count: {}", e);
            process::exit(2);
        }
    };

    let metrics = match ServerMetrics::new(&config) {
        Ok(metrics) => Arc::new(metrics),
        Err(e) => {
            tracing::error!("Failed to register metrics: {}", e);
            process::exit(1);
        }
    };
    let listener = ServerMetricsListener::new(metrics.clone());

    let udp_server = Arc::new(ServerInfo::new("plain", "0.0.0.0:53", Protocol::Dns));
    let doh_server = Arc::new(ServerInfo::new("https", "[::]:443", Protocol::DoH));
    let qtypes = [
        QueryType::A,
        QueryType::Aaaa,
        QueryType::Https,
        QueryType::Mx,
        QueryType::Unknown(99),
    ];

    for n in 0..requests {
        let (info, rw) = if n % 3 == 0 {
            let host = (n as u16).wrapping_add(1);
            let remote = SocketAddr::from((Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, host), 443));
            let local = SocketAddr::from((Ipv6Addr::UNSPECIFIED, 443));
            (doh_server.clone(), SocketResponseWriter::new(local, remote, Network::Tcp))
        } else {
            let port = 40000u16.wrapping_add(n as u16);
            let remote = SocketAddr::from(([192, 0, 2, (n % 250) as u8 + 1], port));
            let local = SocketAddr::from(([0, 0, 0, 0], 53));
            (udp_server.clone(), SocketResponseWriter::new(local, remote, Network::Udp))
        };

        let name = format!("host{}.example.com", n);
        let req = DnsPacket::query(n as u16, &name, qtypes[n % qtypes.len()]);
        let mut ctx = RequestContext::start(info);
        serve_request(&listener, &mut ctx, &req, &rw, simulated_handler(n));

        if n % 5 == 0 {
            listener.on_quic_addr_validation(n % 10 == 0);
        }
    }

    tracing::info!("Simulated {} requests", requests);

    match metrics.gather_text() {
        Ok(text) => print!("{}", text),
        Err(e) => {
            tracing::error!("Failed to render metrics: {}", e);
            process::exit(1);
        }
    }
}
