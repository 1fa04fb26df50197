//! Error types for the ingestion and dispatch pipeline.

use thiserror::Error;

/// Errors that can occur while ingesting a log batch or dispatching
/// verification for an event.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Envelope payload is not valid base64.
    #[error("Envelope encoding error: {message}")]
    Encoding {
        /// Error message.
        message: String,
    },

    /// Envelope payload did not decompress as a gzip stream.
    #[error("Envelope compression error: {message}")]
    Compression {
        /// Error message.
        message: String,
    },

    /// Decompressed document does not match the batch structure.
    #[error("Batch schema error: {message}")]
    Schema {
        /// Error message.
        message: String,
    },

    /// Configuration environment variable is not set.
    #[error("Configuration variable {variable} is not set")]
    ConfigMissing {
        /// Name of the missing variable.
        variable: &'static str,
    },

    /// Configuration blob is not valid base64.
    #[error("Configuration decode error: {message}")]
    ConfigDecode {
        /// Error message.
        message: String,
    },

    /// Decoded configuration does not match the expected shape.
    #[error("Configuration schema error: {message}")]
    ConfigSchema {
        /// Error message.
        message: String,
    },

    /// Cloud client construction or registry preparation failed.
    #[error("Client error: {message}")]
    Client {
        /// Error message.
        message: String,
    },

    /// The external verification engine reported a failure.
    #[error("Verification failed for {function_arn}: {message}")]
    Verification {
        /// Resource identifier of the affected function.
        function_arn: String,
        /// Error message.
        message: String,
    },
}

impl GuardError {
    /// Check if this error aborts the whole invocation.
    ///
    /// Batch-level errors surface to the hosting platform and are the
    /// only failures eligible for a platform-level retry.
    #[must_use]
    pub fn is_batch_level(&self) -> bool {
        matches!(
            self,
            Self::Encoding { .. }
                | Self::Compression { .. }
                | Self::Schema { .. }
                | Self::ConfigMissing { .. }
                | Self::ConfigDecode { .. }
                | Self::ConfigSchema { .. }
        )
    }

    /// Check if this error is terminal for a single event only.
    #[must_use]
    pub fn is_event_scoped(&self) -> bool {
        matches!(self, Self::Client { .. } | Self::Verification { .. })
    }
}
