//! HTTP plumbing
//!
//! The transport seam and the request executor that merges headers,
//! injects auth and classifies non-success responses.

pub mod executor;
pub mod transport;

pub use executor::{RequestExecutor, RequestInit};
pub use transport::{HttpTransport, ReqwestTransport};
