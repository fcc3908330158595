//! Request lifecycle driver shared by the UDP, TCP and encrypted transports
//!
//! Transports hand each parsed request to `serve_request`, which runs the
//! handler, recovers a panic if one happens and reports exactly one terminal
//! event to the metrics listener.

use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};

use crate::dns::context::{Network, RequestContext};
use crate::dns::protocol::DnsPacket;
use crate::metrics::listener::MetricsListener;

/// Handle to the connection a response is written to
///
/// Listeners only read the addresses and network, they never write.
pub trait ResponseWriter: Send + Sync {
    /// Address the server accepted the request on.
    fn local_addr(&self) -> SocketAddr;

    /// Address of the client.
    fn remote_addr(&self) -> SocketAddr;

    fn network(&self) -> Network;
}

/// `ResponseWriter` backed by a plain pair of socket addresses
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SocketResponseWriter {
    local: SocketAddr,
    remote: SocketAddr,
    network: Network,
}

impl SocketResponseWriter {
    pub fn new(local: SocketAddr, remote: SocketAddr, network: Network) -> Self {
        SocketResponseWriter {
            local,
            remote,
            network,
        }
    }
}

impl ResponseWriter for SocketResponseWriter {
    fn local_addr(&self) -> SocketAddr {
        self.local
    }

    fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    fn network(&self) -> Network {
        self.network
    }
}

impl fmt::Display for SocketResponseWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{} <- {}", self.network, self.local, self.remote)
    }
}

pub type HandlerError = Box<dyn Error + Send + Sync + 'static>;

/// Outcome of a handler: the response to write, `None` to drop the request
pub type HandlerResult = Result<Option<DnsPacket>, HandlerError>;

/// Runs `handler` for `req` and reports the outcome to `listener`.
///
/// The start time is recorded if the transport did not set one. The handler
/// may fill in the request info once it knows the response size.
///
/// * handler returned a response or dropped the request: `on_request`
/// * handler failed: `on_error`
/// * handler panicked: `on_panic`, the panic does not propagate
///
/// Returns the response to write, if any.
pub fn serve_request<L, H>(
    listener: &L,
    ctx: &mut RequestContext,
    req: &DnsPacket,
    rw: &dyn ResponseWriter,
    handler: H,
) -> Option<DnsPacket>
where
    L: MetricsListener + ?Sized,
    H: FnOnce(&mut RequestContext, &DnsPacket) -> HandlerResult,
{
    ctx.ensure_start_time();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(&mut *ctx, req)));

    match outcome {
        Ok(Ok(resp)) => {
            listener.on_request(ctx, req, resp.as_ref(), rw);
            resp
        }
        Ok(Err(err)) => {
            log::debug!("Request {} from {} failed: {}", req.header.id, rw.remote_addr(), err);
            listener.on_error(ctx, &*err);
            None
        }
        Err(payload) => {
            log::error!(
                "Recovered panic while handling request {} from {}: {}",
                req.header.id,
                rw.remote_addr(),
                panic_message(&*payload)
            );
            listener.on_panic(ctx, &*payload);
            None
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Unknown panic payload"
    }
}
