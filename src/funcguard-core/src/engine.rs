//! Verification engine collaborator boundary.
//!
//! The cryptographic verification algorithm itself (signature and
//! trust-chain checking) is external to this crate. The pipeline
//! hands it a fully-scoped request and a cancellation-aware context.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::client::CloudClient;
use crate::dispatch::VerificationRequest;
use crate::error::GuardError;

/// External engine performing cryptographic integrity verification.
///
/// The call is the pipeline's only expected network suspension point.
/// The token flows uninterrupted from the invocation context, so an
/// external cancellation (e.g. an invocation timeout) aborts the
/// in-flight call; no additional deadline is layered on here.
#[async_trait]
pub trait VerificationEngine: Send + Sync {
    /// Verify the function named by the request, publish results to
    /// the configured notification target, and apply the configured
    /// post-action.
    async fn verify(
        &self,
        client: &dyn CloudClient,
        request: &VerificationRequest,
        cancel: &CancellationToken,
    ) -> Result<(), GuardError>;
}
