//! Proxy service module
//!
//! TLS termination in front of a loopback-only backend:
//!
//! - [`pipe()`]: one direction of a relayed connection
//! - [`handle_connection`]: pairs a client with a fresh backend connection
//! - [`AcceptLoop`]: accepts, handshakes and dispatches connections
//! - [`start_tls_proxy`]: builds the TLS context, binds, starts the loop

mod handler;
mod pipe;
mod server;
mod supervisor;

pub use handler::{handle_connection, ConnectionStats};
pub use pipe::{pipe, PipeEnd, PipeOutcome, PIPE_BUFFER_SIZE};
pub use server::{AcceptLoop, LoopState};
pub use supervisor::{start_tls_proxy, ProxyHandle, LISTEN_BACKLOG};
