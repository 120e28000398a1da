//! Request template and the HTTP transport the workers issue requests through.
mod client;
mod execution;
mod spec;
mod transport;


pub use client::{ReqwestTransport, TransportSettings};
pub use spec::{ProxyCredentials, ProxySpec, RequestSpec};
pub use transport::{Transport, TransportFailure};
