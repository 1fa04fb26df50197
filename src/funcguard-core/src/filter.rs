//! Per-record parsing and the admission predicate.
//!
//! Parsing failures are tolerated record by record: an unparsable
//! message is logged and skipped, never a batch error. Admission is a
//! separate, pure predicate so the two concerns stay independently
//! testable.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::decoder::{RawLogBatch, RawLogRecord};

/// Reserved name of the deployed verifier function itself.
///
/// Events naming this function are never admitted; otherwise each
/// deployment of the verifier would trigger verification of itself.
/// This cycle breaker must be preserved exactly.
pub const VERIFIER_FUNCTION_NAME: &str = "FuncGuardVerifier";

/// The affected function, as reported by the audit-log entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    /// Function name.
    #[serde(default)]
    pub function_name: String,
    /// Function resource identifier.
    #[serde(default)]
    pub function_arn: String,
}

/// A structured lifecycle event parsed from one raw log record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    /// Region the event originated in.
    #[serde(default)]
    pub aws_region: String,
    /// Audit-log event source identifier.
    #[serde(default)]
    pub event_source: String,
    /// Event name, e.g. `CreateFunction` or `UpdateFunctionCode20150331v2`.
    #[serde(default)]
    pub event_name: String,
    /// Descriptor of the affected function.
    #[serde(default)]
    pub response_elements: FunctionDescriptor,
}

/// Parse one raw record's message into a [`LifecycleEvent`].
///
/// A structural mismatch is reported and yields `None`; processing of
/// sibling records continues.
pub fn parse_record(record: &RawLogRecord) -> Option<LifecycleEvent> {
    match serde_json::from_str::<LifecycleEvent>(&record.message) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(
                record_id = %record.id,
                error = %err,
                "Failed to parse record message, skipping record"
            );
            None
        }
    }
}

/// Admission predicate for lifecycle events.
///
/// An event is admitted iff its name contains one of the recognized
/// lifecycle substrings, the affected function has a name, and that
/// name is not the verifier's own ([`VERIFIER_FUNCTION_NAME`]).
#[must_use]
pub fn admit(event: &LifecycleEvent) -> bool {
    let function_name = &event.response_elements.function_name;
    (event.event_name.contains("CreateFunction")
        || event.event_name.contains("UpdateFunctionCode"))
        && !function_name.is_empty()
        && function_name != VERIFIER_FUNCTION_NAME
}

/// Map a batch to its admitted events, in input order.
///
/// Composition of the parsing stage (zero-or-one event per record)
/// with the admission predicate.
pub fn admitted_events(batch: &RawLogBatch) -> Vec<LifecycleEvent> {
    batch
        .log_events
        .iter()
        .filter_map(parse_record)
        .filter(admit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str) -> RawLogRecord {
        RawLogRecord {
            message: message.to_string(),
            id: "r1".into(),
        }
    }

    fn event(event_name: &str, function_name: &str) -> LifecycleEvent {
        LifecycleEvent {
            aws_region: "us-east-1".into(),
            event_source: "lambda.amazonaws.com".into(),
            event_name: event_name.into(),
            response_elements: FunctionDescriptor {
                function_name: function_name.into(),
                function_arn: format!("arn:aws:lambda:us-east-1:1:function:{function_name}"),
            },
        }
    }

    #[test]
    fn test_parse_well_formed_message() {
        let message = r#"{
            "awsRegion": "eu-west-1",
            "eventSource": "lambda.amazonaws.com",
            "eventName": "CreateFunction",
            "responseElements": {
                "functionName": "orders-svc",
                "functionArn": "arn:aws:lambda:eu-west-1:1:function:orders-svc"
            }
        }"#;
        let event = parse_record(&record(message)).unwrap();
        assert_eq!(event.aws_region, "eu-west-1");
        assert_eq!(event.event_name, "CreateFunction");
        assert_eq!(event.response_elements.function_name, "orders-svc");
    }

    #[test]
    fn test_parse_malformed_message_yields_none() {
        assert!(parse_record(&record("{ not json")).is_none());
        assert!(parse_record(&record("")).is_none());
    }

    #[test]
    fn test_parse_missing_fields_default_empty() {
        let event = parse_record(&record(r#"{"eventName": "CreateFunction"}"#)).unwrap();
        assert!(event.aws_region.is_empty());
        assert!(event.response_elements.function_name.is_empty());
    }

    #[test]
    fn test_admit_recognized_event_names() {
        assert!(admit(&event("CreateFunction", "orders-svc")));
        assert!(admit(&event("UpdateFunctionCode", "orders-svc")));
        // CloudTrail suffixes the API version; matching is substring-based.
        assert!(admit(&event("UpdateFunctionCode20150331v2", "orders-svc")));
    }

    #[test]
    fn test_admit_rejects_other_lifecycle_events() {
        assert!(!admit(&event("DeleteFunction", "orders-svc")));
        assert!(!admit(&event("UpdateFunctionConfiguration", "orders-svc")));
        assert!(!admit(&event("", "orders-svc")));
    }

    #[test]
    fn test_admit_rejects_empty_function_name() {
        assert!(!admit(&event("CreateFunction", "")));
    }

    #[test]
    fn test_admit_excludes_verifier_itself() {
        // Self-exclusion even when the event name matches.
        assert!(!admit(&event("CreateFunction", VERIFIER_FUNCTION_NAME)));
        assert!(!admit(&event("UpdateFunctionCode", VERIFIER_FUNCTION_NAME)));
    }

    #[test]
    fn test_admitted_events_preserves_order_and_skips_malformed() {
        let batch = RawLogBatch {
            log_events: vec![
                record(r#"{"eventName":"CreateFunction","responseElements":{"functionName":"a","functionArn":"arn:a"}}"#),
                record("not json"),
                record(r#"{"eventName":"DeleteFunction","responseElements":{"functionName":"b","functionArn":"arn:b"}}"#),
                record(r#"{"eventName":"UpdateFunctionCode","responseElements":{"functionName":"c","functionArn":"arn:c"}}"#),
            ],
            message_type: "DATA_MESSAGE".into(),
        };
        let events = admitted_events(&batch);
        let names: Vec<&str> = events
            .iter()
            .map(|e| e.response_elements.function_name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
