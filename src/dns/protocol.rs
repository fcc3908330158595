//! Implements the parts of the DNS message model the server hands to its
//! lifecycle listeners

use std::borrow::Cow;

pub use crate::dns::query_type::QueryType;

/// `ResultCode` is the response code of a DNS message.
///
/// Codes 0 through 10 come from RFC 1035/2136, 11 from RFC 8490, 16 through 23
/// are the extended TSIG/TKEY/EDNS codes. Anything else is kept as `Unknown` so
/// the original value survives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ResultCode {
    #[default]
    NOERROR,
    FORMERR,
    SERVFAIL,
    NXDOMAIN,
    NOTIMP,
    REFUSED,
    YXDOMAIN,
    YXRRSET,
    NXRRSET,
    NOTAUTH,
    NOTZONE,
    DSOTYPENI,
    BADSIG,
    BADKEY,
    BADTIME,
    BADMODE,
    BADNAME,
    BADALG,
    BADTRUNC,
    BADCOOKIE,
    Unknown(u16),
}

impl ResultCode {
    pub fn from_num(num: u16) -> ResultCode {
        match num {
            0 => ResultCode::NOERROR,
            1 => ResultCode::FORMERR,
            2 => ResultCode::SERVFAIL,
            3 => ResultCode::NXDOMAIN,
            4 => ResultCode::NOTIMP,
            5 => ResultCode::REFUSED,
            6 => ResultCode::YXDOMAIN,
            7 => ResultCode::YXRRSET,
            8 => ResultCode::NXRRSET,
            9 => ResultCode::NOTAUTH,
            10 => ResultCode::NOTZONE,
            11 => ResultCode::DSOTYPENI,
            16 => ResultCode::BADSIG,
            17 => ResultCode::BADKEY,
            18 => ResultCode::BADTIME,
            19 => ResultCode::BADMODE,
            20 => ResultCode::BADNAME,
            21 => ResultCode::BADALG,
            22 => ResultCode::BADTRUNC,
            23 => ResultCode::BADCOOKIE,
            _ => ResultCode::Unknown(num),
        }
    }

    pub fn to_num(&self) -> u16 {
        match *self {
            ResultCode::NOERROR => 0,
            ResultCode::FORMERR => 1,
            ResultCode::SERVFAIL => 2,
            ResultCode::NXDOMAIN => 3,
            ResultCode::NOTIMP => 4,
            ResultCode::REFUSED => 5,
            ResultCode::YXDOMAIN => 6,
            ResultCode::YXRRSET => 7,
            ResultCode::NXRRSET => 8,
            ResultCode::NOTAUTH => 9,
            ResultCode::NOTZONE => 10,
            ResultCode::DSOTYPENI => 11,
            ResultCode::BADSIG => 16,
            ResultCode::BADKEY => 17,
            ResultCode::BADTIME => 18,
            ResultCode::BADMODE => 19,
            ResultCode::BADNAME => 20,
            ResultCode::BADALG => 21,
            ResultCode::BADTRUNC => 22,
            ResultCode::BADCOOKIE => 23,
            ResultCode::Unknown(num) => num,
        }
    }

    /// Standard mnemonic, or `None` for codes without one.
    ///
    /// Looks at the numeric value, so `Unknown(3)` is still `NXDOMAIN`.
    pub fn mnemonic(&self) -> Option<&'static str> {
        let name = match ResultCode::from_num(self.to_num()) {
            ResultCode::NOERROR => "NOERROR",
            ResultCode::FORMERR => "FORMERR",
            ResultCode::SERVFAIL => "SERVFAIL",
            ResultCode::NXDOMAIN => "NXDOMAIN",
            ResultCode::NOTIMP => "NOTIMP",
            ResultCode::REFUSED => "REFUSED",
            ResultCode::YXDOMAIN => "YXDOMAIN",
            ResultCode::YXRRSET => "YXRRSET",
            ResultCode::NXRRSET => "NXRRSET",
            ResultCode::NOTAUTH => "NOTAUTH",
            ResultCode::NOTZONE => "NOTZONE",
            ResultCode::DSOTYPENI => "DSOTYPENI",
            ResultCode::BADSIG => "BADSIG",
            ResultCode::BADKEY => "BADKEY",
            ResultCode::BADTIME => "BADTIME",
            ResultCode::BADMODE => "BADMODE",
            ResultCode::BADNAME => "BADNAME",
            ResultCode::BADALG => "BADALG",
            ResultCode::BADTRUNC => "BADTRUNC",
            ResultCode::BADCOOKIE => "BADCOOKIE",
            ResultCode::Unknown(_) => return None,
        };

        Some(name)
    }

    /// Mnemonic if there is one, otherwise the decimal value.
    pub fn to_label(&self) -> Cow<'static, str> {
        match self.mnemonic() {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.to_num().to_string()),
        }
    }
}

/// Representation of the header fields the listener cares about
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DnsHeader {
    pub id: u16,
    pub response: bool,
    pub rescode: ResultCode,
}

/// Representation of a DNS question
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsQuestion {
    pub name: String,
    pub qtype: QueryType,
}

impl DnsQuestion {
    pub fn new(name: String, qtype: QueryType) -> DnsQuestion {
        DnsQuestion { name, qtype }
    }
}

/// A DNS message as seen by lifecycle listeners
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DnsPacket {
    pub header: DnsHeader,
    pub questions: Vec<DnsQuestion>,
}

impl DnsPacket {
    pub fn new() -> DnsPacket {
        DnsPacket::default()
    }

    /// Builds a single-question query.
    pub fn query(id: u16, name: &str, qtype: QueryType) -> DnsPacket {
        DnsPacket {
            header: DnsHeader {
                id,
                response: false,
                rescode: ResultCode::NOERROR,
            },
            questions: vec![DnsQuestion::new(name.to_string(), qtype)],
        }
    }

    /// Builds a response to `request` carrying `rescode`.
    pub fn response_to(request: &DnsPacket, rescode: ResultCode) -> DnsPacket {
        DnsPacket {
            header: DnsHeader {
                id: request.header.id,
                response: true,
                rescode,
            },
            questions: request.questions.clone(),
        }
    }

    /// Type of the only question, if the message has exactly one.
    pub fn single_qtype(&self) -> Option<QueryType> {
        match self.questions.as_slice() {
            [q] => Some(q.qtype),
            _ => None,
        }
    }
}
