//! # embedhttp
//!
//! A small HTTP/1.0 server meant to be embedded into other programs.
//!
//! Every accepted connection is served on its own thread by running a linear chain of
//! handlers over a shared [`http::Context`]. The chain always starts with the
//! [`middleware::HeadParser`]; each handler decides whether the rest runs by calling
//! [`runtime::Next::run`]. Once the chain returns, the response is written if a handler
//! set at least one header, and the connection is closed.
//!
//! ```no_run
//! use embedhttp::{Context, Next, Response, Server, StatusCode};
//!
//! let mut server = Server::new(8080)?;
//! server.use_handler(|ctx: &mut Context, _next: Next<'_>| {
//!     ctx.resp = Response::text(StatusCode::Ok, "hello");
//! });
//! server.run()?;
//! # Ok::<(), embedhttp::HttpError>(())
//! ```
//!
//! Refer to the included binary for a server with logging, body parsing and routing.

/// Module containing the error type
pub mod error;
/// Module containing the request, response and connection context
pub mod http;
/// Module containing buffered socket I/O
pub mod io;
/// Module containing the bundled handlers
pub mod middleware;
/// Module containing the handler chain and the server loop
pub mod runtime;
/// Module containing the configuration
pub mod settings;
/// Module containing the listener and connections
pub mod transport;

#[cfg(test)]
mod testing;

pub use error::HttpError;
pub use http::{Context, Headers, Request, Response, StatusCode};
pub use runtime::{Handler, Next, Server, ShutdownHandle};
pub use settings::ServerConfig;
