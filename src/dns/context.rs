//! The ambient per-request context the server carries alongside each request
//!
//! The server fills in the fields as the request moves through the pipeline.
//! Metrics listeners only read them, and treat a missing field as a bug in the
//! integration: the `must_*` accessors panic instead of letting a metric
//! silently disappear.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use derive_more::{Display, Error};

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[display(fmt = "server info is missing from the request context")]
    MissingServerInfo,
    #[display(fmt = "start time is missing from the request context")]
    MissingStartTime,
    #[display(fmt = "request info is missing from the request context")]
    MissingRequestInfo,
}

type Result<T> = std::result::Result<T, ContextError>;

/// Application protocol a server speaks
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Plain DNS over UDP and TCP
    Dns,
    /// DNS-over-HTTPS
    DoH,
    /// DNS-over-QUIC
    DoQ,
    /// DNS-over-TLS
    DoT,
    /// DNSCrypt
    DnsCrypt,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Protocol::Dns => "dns",
            Protocol::DoH => "doh",
            Protocol::DoQ => "doq",
            Protocol::DoT => "dot",
            Protocol::DnsCrypt => "dnscrypt",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport network a response is written to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Udp,
    Tcp,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Network::Udp => "udp",
            Network::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the logical server handling a request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server name from the configuration
    pub name: String,
    /// Bind address as configured, e.g. `0.0.0.0:53`
    pub addr: String,
    pub proto: Protocol,
}

impl ServerInfo {
    pub fn new(name: &str, addr: &str, proto: Protocol) -> ServerInfo {
        ServerInfo {
            name: name.to_string(),
            addr: addr.to_string(),
            proto,
        }
    }
}

/// Sizes of the request and of the response as written on the wire
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub request_size: usize,
    pub response_size: usize,
}

/// Per-request ambient context
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    server_info: Option<Arc<ServerInfo>>,
    start_time: Option<Instant>,
    request_info: Option<RequestInfo>,
}

impl RequestContext {
    pub fn new() -> RequestContext {
        RequestContext::default()
    }

    /// Context for a request that starts now on `server_info`.
    pub fn start(server_info: Arc<ServerInfo>) -> RequestContext {
        RequestContext {
            server_info: Some(server_info),
            start_time: Some(Instant::now()),
            request_info: None,
        }
    }

    pub fn with_server_info(mut self, server_info: Arc<ServerInfo>) -> Self {
        self.server_info = Some(server_info);
        self
    }

    pub fn with_start_time(mut self, start_time: Instant) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_request_info(mut self, request_info: RequestInfo) -> Self {
        self.request_info = Some(request_info);
        self
    }

    pub fn set_request_info(&mut self, request_info: RequestInfo) {
        self.request_info = Some(request_info);
    }

    /// Records the start time unless one is already present.
    pub fn ensure_start_time(&mut self) -> Instant {
        *self.start_time.get_or_insert_with(Instant::now)
    }

    pub fn server_info(&self) -> Result<&ServerInfo> {
        self.server_info
            .as_deref()
            .ok_or(ContextError::MissingServerInfo)
    }

    pub fn start_time(&self) -> Result<Instant> {
        self.start_time.ok_or(ContextError::MissingStartTime)
    }

    pub fn request_info(&self) -> Result<&RequestInfo> {
        self.request_info
            .as_ref()
            .ok_or(ContextError::MissingRequestInfo)
    }

    pub fn must_server_info(&self) -> &ServerInfo {
        self.server_info().unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn must_start_time(&self) -> Instant {
        self.start_time().unwrap_or_else(|e| panic!("{}", e))
    }

    pub fn must_request_info(&self) -> &RequestInfo {
        self.request_info().unwrap_or_else(|e| panic!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_info() -> Arc<ServerInfo> {
        Arc::new(ServerInfo::new("test", "127.0.0.1:53", Protocol::Dns))
    }

    #[test]
    fn test_empty_context() {
        let ctx = RequestContext::new();

        assert_eq!(ctx.server_info().err(), Some(ContextError::MissingServerInfo));
        assert_eq!(ctx.start_time().err(), Some(ContextError::MissingStartTime));
        assert_eq!(ctx.request_info().err(), Some(ContextError::MissingRequestInfo));
    }

    #[test]
    fn test_start_populates_server_and_time() {
        let mut ctx = RequestContext::start(server_info());

        assert_eq!(ctx.must_server_info().name, "test");
        let started = ctx.must_start_time();
        assert_eq!(ctx.ensure_start_time(), started);

        ctx.set_request_info(RequestInfo {
            request_size: 12,
            response_size: 0,
        });
        assert_eq!(ctx.must_request_info().request_size, 12);
    }

    #[test]
    #[should_panic(expected = "server info is missing")]
    fn test_must_server_info_panics() {
        RequestContext::new().must_server_info();
    }

    #[test]
    #[should_panic(expected = "start time is missing")]
    fn test_must_start_time_panics() {
        RequestContext::new()
            .with_server_info(server_info())
            .must_start_time();
    }

    #[test]
    #[should_panic(expected = "request info is missing")]
    fn test_must_request_info_panics() {
        RequestContext::start(server_info()).must_request_info();
    }

    #[test]
    fn test_protocol_labels() {
        assert_eq!(Protocol::Dns.to_string(), "dns");
        assert_eq!(Protocol::DoQ.as_str(), "doq");
        assert_eq!(Protocol::DnsCrypt.as_str(), "dnscrypt");
        assert_eq!(Network::Tcp.to_string(), "tcp");
    }
}
