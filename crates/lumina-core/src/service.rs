use async_trait::async_trait;
use crate::error::Result;
use crate::operation::Operation;
use crate::request::{ApiKey, GenerationRequest};

/// Remote video generation backend.
///
/// Every call is a single network round trip. Retrying and waiting are the
/// caller's business (see [`crate::poller::Poller`]).
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Start a generation job and return its operation handle.
    async fn submit(&self, request: &GenerationRequest, key: &ApiKey) -> Result<Operation>;

    /// Fetch the latest snapshot of an operation.
    async fn poll(&self, operation: &Operation, key: &ApiKey) -> Result<Operation>;

    /// Download the bytes behind an asset URI.
    async fn download(&self, asset_uri: &str, key: &ApiKey) -> Result<Vec<u8>>;
}
