//! Cloud client collaborator boundary.
//!
//! The storage and function-metadata client implementations live
//! outside this crate; the pipeline only depends on these traits.

use async_trait::async_trait;

use crate::error::GuardError;

/// Storage-and-registry client scoped to a region pair.
///
/// Mirrors the operations the verification engine needs: resolving
/// the deployed artifact's package type, fetching code or image
/// references, and moving signatures through the storage bucket.
#[async_trait]
pub trait CloudClient: Send + Sync {
    /// Resolve the package type of the identified function
    /// (archive vs. container image).
    async fn resolve_package_type(&self, func_identifier: &str) -> Result<String, GuardError>;

    /// Fetch a reference to the function's code artifact.
    async fn get_func_code(&self, func_identifier: &str) -> Result<String, GuardError>;

    /// Fetch the function's container image URI.
    async fn get_func_image_uri(&self, func_identifier: &str) -> Result<String, GuardError>;

    /// Upload a signature for the given identity.
    async fn upload(
        &self,
        signature: &str,
        identity: &str,
        keyless: bool,
    ) -> Result<(), GuardError>;

    /// Download a named artifact of the given output type.
    async fn download(&self, file_name: &str, output_type: &str) -> Result<(), GuardError>;

    /// Prepare transient registry-verification state (local trust
    /// caches) for this client's scoped region.
    async fn prepare_trust_cache(&self) -> Result<(), GuardError>;
}

/// Factory producing clients scoped to a region pair.
///
/// `home_region` is where results and notifications are posted;
/// `event_region` is where the affected function lives. Credentials
/// and other ambient state belong to the factory implementation.
pub trait ClientFactory: Send + Sync {
    /// The client type produced by this factory.
    type Client: CloudClient;

    /// Build a client scoped to the given bucket and region pair.
    fn scoped(&self, bucket: &str, home_region: &str, event_region: &str) -> Self::Client;
}
