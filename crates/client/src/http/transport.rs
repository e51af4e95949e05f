//! Pluggable network transport
//!
//! All outbound calls go through [`HttpTransport`] so callers can swap in
//! a custom implementation (instrumentation, record/replay, test doubles).
//! The default is a plain reqwest client.

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Request, Response};

use crate::errors::Result;

/// Executes a prepared HTTP request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Dispatch the request and return the raw response, whatever its
    /// status. Classification happens in the executor.
    async fn execute(&self, request: Request) -> Result<Response>;
}

/// Default transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Create a transport with reqwest defaults.
    ///
    /// # Errors
    /// Returns `ClientError::Request` if the underlying client cannot be
    /// constructed.
    pub fn new() -> Result<Self> {
        let client = ReqwestClient::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    #[must_use]
    pub fn from_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        Ok(self.client.execute(request).await?)
    }
}
