//! # shiftgate-http
//!
//! Narrow readiness API over a blocking `TcpListener`. Two concerns:
//!
//! - `session`: who the caller is and which org/site they operate in,
//!   resolved server-side and never from query parameters
//! - `http`: request-line parsing, routing, and JSON responses
//!
//! The server is intentionally single-threaded and loads its dataset per
//! connection; deployments needing concurrency put it behind a reverse
//! proxy, not a runtime.

pub mod http;
pub mod session;

pub use http::{HttpServeError, HttpServerConfig, serve_readiness_api};
pub use session::{Session, SessionResolver, StaticSessionResolver};
