//! Invocation entry point: decode, filter, dispatch.
//!
//! Records are processed strictly sequentially, in input order,
//! within one invocation. Only batch-level failures propagate to the
//! invocation boundary; per-record and per-event failures are
//! terminal at their own scope.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::client::ClientFactory;
use crate::config::{ConfigStore, Configuration};
use crate::decoder::{decode_envelope, RawLogBatch};
use crate::dispatch::Dispatcher;
use crate::engine::VerificationEngine;
use crate::error::GuardError;
use crate::filter::{admitted_events, LifecycleEvent};

/// Handle one subscription-filter invocation.
///
/// Decodes the envelope, lazily loads the process-wide configuration
/// (only when the batch contains at least one admitted event), and
/// dispatches verification per event. Returns an error only for
/// batch-level failures.
pub async fn handle_invocation<F, E>(
    envelope: &str,
    dispatcher: &Dispatcher<F, E>,
    cancel: &CancellationToken,
) -> Result<(), GuardError>
where
    F: ClientFactory,
    E: VerificationEngine,
{
    let batch = decode_envelope(envelope).map_err(|err| {
        error!(error = %err, "Failed to extract data from event");
        err
    })?;

    let events = admitted_events(&batch);
    if events.is_empty() {
        debug!(records = batch.log_events.len(), "No admitted events in batch");
        return Ok(());
    }

    let config = ConfigStore::get()?;
    dispatch_events(&events, config, dispatcher, cancel).await;
    Ok(())
}

/// Dispatch every admitted event of a decoded batch, in input order.
///
/// Convenience composition of [`admitted_events`] and
/// [`dispatch_events`] for callers that hold an explicit
/// configuration.
pub async fn process_batch<F, E>(
    batch: &RawLogBatch,
    config: &Configuration,
    dispatcher: &Dispatcher<F, E>,
    cancel: &CancellationToken,
) where
    F: ClientFactory,
    E: VerificationEngine,
{
    dispatch_events(&admitted_events(batch), config, dispatcher, cancel).await;
}

/// Dispatch already-admitted events sequentially, in input order.
///
/// Per-event failures never abort sibling work; a summary of the
/// outcome is logged at batch end.
pub async fn dispatch_events<F, E>(
    events: &[LifecycleEvent],
    config: &Configuration,
    dispatcher: &Dispatcher<F, E>,
    cancel: &CancellationToken,
) where
    F: ClientFactory,
    E: VerificationEngine,
{
    let mut failed = 0usize;

    for event in events {
        info!(
            function_name = %event.response_elements.function_name,
            event_name = %event.event_name,
            event_source = %event.event_source,
            region = %event.aws_region,
            "Handling lifecycle event"
        );
        if dispatcher.dispatch(event, config, cancel).await.is_err() {
            failed += 1;
        }
    }

    debug!(
        admitted = events.len(),
        dispatch_failures = failed,
        "Batch processing complete"
    );
}
