//! DNS Query Type definitions and conversions

use serde_derive::{Deserialize, Serialize};

/// `QueryType` represents the requested Record Type of a query
///
/// The specific type Unknown that an integer parameter in order to retain the
/// id of an unknown query. An integer can be converted to a querytype using
/// the `from_num` function, and back to an integer using the `to_num` method.
#[derive(PartialEq, Eq, Debug, Clone, Hash, Copy, Serialize, Deserialize)]
pub enum QueryType {
    Unknown(u16),
    A,      // 1
    Ns,     // 2
    Cname,  // 5
    Soa,    // 6
    Ptr,    // 12
    Mx,     // 15
    Txt,    // 16
    Aaaa,   // 28
    Srv,    // 33
    Opt,    // 41
    Ds,     // 43
    Nsec,   // 47
    Dnskey, // 48
    Nsec3,  // 50
    Svcb,   // 64
    Https,  // 65
    Ixfr,   // 251
    Axfr,   // 252
    Any,    // 255
}

impl QueryType {
    pub fn to_num(&self) -> u16 {
        match *self {
            QueryType::Unknown(x) => x,
            QueryType::A => 1,
            QueryType::Ns => 2,
            QueryType::Cname => 5,
            QueryType::Soa => 6,
            QueryType::Ptr => 12,
            QueryType::Mx => 15,
            QueryType::Txt => 16,
            QueryType::Aaaa => 28,
            QueryType::Srv => 33,
            QueryType::Opt => 41,
            QueryType::Ds => 43,
            QueryType::Nsec => 47,
            QueryType::Dnskey => 48,
            QueryType::Nsec3 => 50,
            QueryType::Svcb => 64,
            QueryType::Https => 65,
            QueryType::Ixfr => 251,
            QueryType::Axfr => 252,
            QueryType::Any => 255,
        }
    }

    pub fn from_num(num: u16) -> QueryType {
        match num {
            1 => QueryType::A,
            2 => QueryType::Ns,
            5 => QueryType::Cname,
            6 => QueryType::Soa,
            12 => QueryType::Ptr,
            15 => QueryType::Mx,
            16 => QueryType::Txt,
            28 => QueryType::Aaaa,
            33 => QueryType::Srv,
            41 => QueryType::Opt,
            43 => QueryType::Ds,
            47 => QueryType::Nsec,
            48 => QueryType::Dnskey,
            50 => QueryType::Nsec3,
            64 => QueryType::Svcb,
            65 => QueryType::Https,
            251 => QueryType::Ixfr,
            252 => QueryType::Axfr,
            255 => QueryType::Any,
            _ => QueryType::Unknown(num),
        }
    }

    /// Metric label for this type.
    ///
    /// Only the types worth slicing on get their own label, the rest collapse
    /// into `OTHER` so the label set stays bounded no matter what clients send.
    pub fn metric_label(&self) -> &'static str {
        match *self {
            QueryType::A => "A",
            QueryType::Aaaa => "AAAA",
            QueryType::Any => "ANY",
            QueryType::Cname => "CNAME",
            QueryType::Dnskey => "DNSKEY",
            QueryType::Ds => "DS",
            QueryType::Https => "HTTPS",
            QueryType::Mx => "MX",
            QueryType::Ns => "NS",
            QueryType::Nsec => "NSEC",
            QueryType::Nsec3 => "NSEC3",
            QueryType::Ptr => "PTR",
            QueryType::Soa => "SOA",
            QueryType::Srv => "SRV",
            QueryType::Svcb => "SVCB",
            QueryType::Txt => "TXT",
            _ => OTHER_QUERY_TYPE,
        }
    }
}

/// Label used for query types that are not tracked individually.
pub const OTHER_QUERY_TYPE: &str = "OTHER";
