//! DNS server side of the request lifecycle
//!
//! # Module Structure
//!
//! * `protocol` - the message model handed to lifecycle listeners
//! * `query_type` - DNS query type definitions
//! * `context` - ambient per-request context (server info, start time, sizes)
//! * `server` - response writers and the lifecycle driver

/// DNS message model seen by listeners
pub mod protocol;

/// DNS query type definitions
pub mod query_type;

/// Per-request ambient context
pub mod context;

/// Response writers and the request lifecycle driver
pub mod server;
