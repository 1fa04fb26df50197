//! Decoding of the batched audit-log envelope.
//!
//! Subscription-filter deliveries arrive as a base64-encoded,
//! gzip-compressed JSON document. Each of the three steps is a
//! distinct failure point, and any failure aborts the whole
//! invocation - there is no partial batch to salvage before
//! decompression succeeds.

use std::io::Read;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::error::GuardError;

/// One opaque log record from the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLogRecord {
    /// The record payload, itself a JSON document.
    pub message: String,
    /// Delivery-assigned record identifier.
    #[serde(default)]
    pub id: String,
}

/// An ordered batch of raw log records.
///
/// Produced fresh per invocation; never persisted. The
/// `message_type` discriminator is carried but not consulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogBatch {
    /// Records in delivery order.
    pub log_events: Vec<RawLogRecord>,
    /// Batch-type discriminator from the delivery.
    #[serde(default)]
    pub message_type: String,
}

/// Decode a subscription-filter envelope into a [`RawLogBatch`].
///
/// Steps: base64-decode ([`GuardError::Encoding`] on invalid alphabet
/// or padding), gzip-decompress ([`GuardError::Compression`] on a
/// corrupt stream), then JSON-parse ([`GuardError::Schema`] on a
/// structural mismatch).
pub fn decode_envelope(data: &str) -> Result<RawLogBatch, GuardError> {
    let compressed = STANDARD
        .decode(data.trim())
        .map_err(|e| GuardError::Encoding {
            message: e.to_string(),
        })?;

    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut document = Vec::new();
    decoder
        .read_to_end(&mut document)
        .map_err(|e| GuardError::Compression {
            message: e.to_string(),
        })?;

    serde_json::from_slice(&document).map_err(|e| GuardError::Schema {
        message: e.to_string(),
    })
}
