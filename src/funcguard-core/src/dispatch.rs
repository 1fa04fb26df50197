//! Per-event verification dispatch.
//!
//! One best-effort attempt per admitted event per invocation. Any
//! failure is terminal for its own event only: it is logged and the
//! batch continues. The only retry mechanism is the platform-level
//! retry of the whole invocation, which exists solely for batch-level
//! decode failures.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::{ClientFactory, CloudClient};
use crate::config::Configuration;
use crate::engine::VerificationEngine;
use crate::error::GuardError;
use crate::filter::LifecycleEvent;
use crate::options::{apply_experimental_toggle, build_verify_options, VerifyOptions};

/// A fully-scoped verification request for one admitted event.
///
/// Constructed once per event and never mutated; consumed
/// synchronously by the verification engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationRequest {
    /// Name of the function to verify.
    pub function_identifier: String,
    /// Resolved verification options.
    pub options: VerifyOptions,
    /// Post-verification action selector.
    pub action: String,
    /// Notification topic for results.
    pub sns_topic_arn: String,
    /// Home region results are posted to.
    pub home_region: String,
    /// Allow-list of function tag keys.
    pub tag_keys_filter: Vec<String>,
    /// Allow-list of regions.
    pub regions_filter: Vec<String>,
}

impl VerificationRequest {
    /// Build the request for one admitted event from the loaded
    /// configuration.
    #[must_use]
    pub fn for_event(event: &LifecycleEvent, config: &Configuration) -> Self {
        Self {
            function_identifier: event.response_elements.function_name.clone(),
            options: build_verify_options(config.trust_mode(), &config.public_key),
            action: config.action.clone(),
            sns_topic_arn: config.sns_topic_arn.clone(),
            home_region: config.region.clone(),
            tag_keys_filter: config.included_func_tag_keys.clone(),
            regions_filter: config.included_func_regions.clone(),
        }
    }
}

/// Dispatches verification for admitted events, one at a time.
pub struct Dispatcher<F, E> {
    factory: F,
    engine: E,
}

impl<F, E> Dispatcher<F, E>
where
    F: ClientFactory,
    E: VerificationEngine,
{
    /// Create a dispatcher over a client factory and an engine.
    pub fn new(factory: F, engine: E) -> Self {
        Self { factory, engine }
    }

    /// Dispatch one admitted event.
    ///
    /// Failures are logged here and returned for accounting only; the
    /// caller never propagates them to the invocation boundary.
    pub async fn dispatch(
        &self,
        event: &LifecycleEvent,
        config: &Configuration,
        cancel: &CancellationToken,
    ) -> Result<(), GuardError> {
        // Registry preparation runs against the event's own region,
        // not the home region.
        let event_client =
            self.factory
                .scoped(&config.bucket, &event.aws_region, &event.aws_region);
        if let Err(err) = event_client.prepare_trust_cache().await {
            warn!(
                region = %event.aws_region,
                error = %err,
                "Failed to prepare trust cache, skipping event"
            );
            return Err(err);
        }

        let request = VerificationRequest::for_event(event, config);
        apply_experimental_toggle(&request.options);
        info!(action = %request.action, "About to execute verification");

        // The verification call itself posts results from the home
        // region, paired with the event's region.
        let home_client = self
            .factory
            .scoped(&config.bucket, &config.region, &event.aws_region);
        if let Err(err) = self
            .engine
            .verify(&home_client, &request, cancel)
            .await
        {
            warn!(
                function_arn = %event.response_elements.function_arn,
                error = %err,
                "Failed to handle verification result"
            );
            return Err(err);
        }
        Ok(())
    }
}
