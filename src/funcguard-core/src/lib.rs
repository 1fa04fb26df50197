//! # funcguard-core
//!
//! Event-ingestion and verification-dispatch pipeline for FuncGuard -
//! tamper detection for serverless deployments without touching the
//! deployment pipeline itself.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  handle_invocation                           │
//! │                                                              │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐      │
//! │  │ EventDecoder │─▶│ EventFilter  │─▶│ ConfigStore  │      │
//! │  │ (b64+gzip)   │  │ (parse/admit)│  │ (lazy, once) │      │
//! │  └──────────────┘  └──────────────┘  └──────────────┘      │
//! │                           │                                  │
//! │                           ▼                                  │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │              Dispatcher                           │      │
//! │  │   (per-event, best-effort, fault-isolated)       │      │
//! │  └──────────────────────────────────────────────────┘      │
//! │                           │                                  │
//! │                           ▼                                  │
//! │  ┌──────────────────────────────────────────────────┐      │
//! │  │     CloudClient / VerificationEngine traits       │      │
//! │  │          (external collaborators)                 │      │
//! │  └──────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fault isolation
//!
//! - **Batch-level**: envelope decoding or configuration load failures
//!   abort the invocation and surface to the platform.
//! - **Per-record**: a record whose message cannot be parsed is logged
//!   and skipped; siblings are unaffected.
//! - **Per-event**: any failure while dispatching one event is logged
//!   and terminal at that scope; the batch continues.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::pedantic)] // Too strict for production code
#![allow(clippy::doc_markdown)] // Allow product names without backticks
#![allow(clippy::missing_errors_doc)] // Error documentation not required
#![allow(clippy::module_name_repetitions)] // Allow Type in module::Type
#![allow(clippy::must_use_candidate)] // Not all functions need must_use

pub mod client;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod filter;
pub mod handler;
pub mod options;

pub use client::{ClientFactory, CloudClient};
pub use config::{ConfigStore, Configuration, CONFIG_ENV};
pub use decoder::{decode_envelope, RawLogBatch, RawLogRecord};
pub use dispatch::{Dispatcher, VerificationRequest};
pub use engine::VerificationEngine;
pub use error::GuardError;
pub use filter::{
    admit, admitted_events, parse_record, FunctionDescriptor, LifecycleEvent,
    VERIFIER_FUNCTION_NAME,
};
pub use handler::{dispatch_events, handle_invocation, process_batch};
pub use options::{
    apply_experimental_toggle, build_verify_options, OutputFormat, TrustMode, VerifyOptions,
    DEFAULT_KEY_REFERENCE, EXPERIMENTAL_ENV, TRANSPARENCY_LOG_URL,
};
