//! Label schemas of the server metric families
//!
//! Two schemas are in use. `request_total` gets the full one, with query type
//! and client address family. Every other family gets the server-level one,
//! since extra dimensions on histograms multiply the bucket series.
//!
//! Label values borrow from the server info or are static strings, so building
//! a label vector never allocates. The only exception is a response code
//! without a mnemonic.

use std::borrow::Cow;
use std::net::{IpAddr, SocketAddr};

use crate::dns::context::{Network, ServerInfo};
use crate::dns::protocol::{DnsPacket, ResultCode};
use crate::dns::query_type::OTHER_QUERY_TYPE;

/// Label names of the server-level schema.
pub const SERVER_LABELS: [&str; 3] = ["name", "proto", "addr"];

/// Label names of the server-level schema extended with the response code.
pub const RCODE_LABELS: [&str; 4] = ["name", "proto", "addr", "rcode"];

/// Label names of the full schema used by `request_total`.
pub const REQUEST_LABELS: [&str; 6] = ["name", "proto", "network", "addr", "type", "family"];

/// `rcode` value recorded when the server never answered the request.
///
/// Real codes map to an upper-case mnemonic or a decimal number, so this
/// cannot collide with one.
pub const DROPPED_RCODE: &str = "DROPPED";

/// Address family label of an IPv4 client (IANA address family number).
pub const FAMILY_IPV4: &str = "1";

/// Address family label of an IPv6 client (IANA address family number).
pub const FAMILY_IPV6: &str = "2";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ServerLabels<'a> {
    pub name: &'a str,
    pub proto: &'a str,
    pub addr: &'a str,
}

impl<'a> ServerLabels<'a> {
    pub fn new(info: &'a ServerInfo) -> Self {
        ServerLabels {
            name: &info.name,
            proto: info.proto.as_str(),
            addr: &info.addr,
        }
    }

    /// Values in `SERVER_LABELS` order.
    pub fn values(&self) -> [&'a str; 3] {
        [self.name, self.proto, self.addr]
    }

    /// Values in `RCODE_LABELS` order.
    pub fn with_rcode<'b>(&self, rcode: &'b str) -> [&'b str; 4]
    where
        'a: 'b,
    {
        [self.name, self.proto, self.addr, rcode]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RequestLabels<'a> {
    pub server: ServerLabels<'a>,
    pub network: &'static str,
    pub qtype: &'static str,
    pub family: &'static str,
}

impl<'a> RequestLabels<'a> {
    pub fn new(
        info: &'a ServerInfo,
        req: &DnsPacket,
        network: Network,
        remote: &SocketAddr,
    ) -> Self {
        RequestLabels {
            server: ServerLabels::new(info),
            network: network.as_str(),
            qtype: qtype_label(req),
            family: family_label(remote),
        }
    }

    /// Values in `REQUEST_LABELS` order.
    pub fn values(&self) -> [&'a str; 6] {
        [
            self.server.name,
            self.server.proto,
            self.network,
            self.server.addr,
            self.qtype,
            self.family,
        ]
    }
}

/// Response code label: the mnemonic, or the code in decimal.
pub fn rcode_label(rcode: ResultCode) -> Cow<'static, str> {
    rcode.to_label()
}

/// Query type label of a request; anything but a single question is `OTHER`.
pub fn qtype_label(req: &DnsPacket) -> &'static str {
    req.single_qtype()
        .map(|qtype| qtype.metric_label())
        .unwrap_or(OTHER_QUERY_TYPE)
}

/// Address family label of the client address.
pub fn family_label(remote: &SocketAddr) -> &'static str {
    match remote.ip() {
        IpAddr::V4(_) => FAMILY_IPV4,
        IpAddr::V6(ip) if ip.to_ipv4_mapped().is_some() => FAMILY_IPV4,
        IpAddr::V6(_) => FAMILY_IPV6,
    }
}
