pub mod aliyun;
pub mod baidu;

use async_trait::async_trait;

use crate::types::{Credentials, SynthesisOutcome, SynthesisParams};

/// A speech API able to turn text into a classified response
///
/// Implementations differ in how they authenticate (bearer token or request
/// signature) but all return the same [`SynthesisOutcome`].
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Run one synthesis request
    ///
    /// An API-level rejection is an `Ok(SynthesisOutcome::ApiError)`; only
    /// authentication, signing, and connection failures are errors.
    async fn synthesize(
        &self,
        credentials: &Credentials,
        params: &SynthesisParams,
    ) -> crate::error::Result<SynthesisOutcome>;

    /// Get the backend name
    fn name(&self) -> &str;
}
