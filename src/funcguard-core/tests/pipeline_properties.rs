//! Property-based tests for the ingestion pipeline.
//!
//! These tests verify the decode → parse → admit composition:
//! order preservation, idempotence, tolerance of malformed records,
//! the verifier self-exclusion, and the trust-mode matrix of the
//! options builder.

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use proptest::prelude::*;

use funcguard_core::decoder::decode_envelope;
use funcguard_core::filter::{admit, admitted_events, LifecycleEvent, VERIFIER_FUNCTION_NAME};
use funcguard_core::options::{build_verify_options, TrustMode, DEFAULT_KEY_REFERENCE};

/// One generated log record: a lifecycle message or junk bytes.
#[derive(Debug, Clone)]
enum GenRecord {
    Valid {
        event_name: String,
        function_name: String,
    },
    Malformed(String),
}

fn event_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("CreateFunction".to_string()),
        Just("UpdateFunctionCode".to_string()),
        Just("UpdateFunctionCode20150331v2".to_string()),
        Just("DeleteFunction".to_string()),
        Just("UpdateFunctionConfiguration".to_string()),
        Just("GetFunction".to_string()),
    ]
}

fn function_name_strategy() -> impl Strategy<Value = String> {
    // Includes the empty name and the reserved verifier name so the
    // admission predicate's edge cases are exercised.
    prop_oneof![
        "[a-z][a-z0-9-]{0,15}",
        Just(String::new()),
        Just(VERIFIER_FUNCTION_NAME.to_string()),
    ]
}

fn record_strategy() -> impl Strategy<Value = GenRecord> {
    prop_oneof![
        3 => (event_name_strategy(), function_name_strategy()).prop_map(
            |(event_name, function_name)| GenRecord::Valid {
                event_name,
                function_name,
            }
        ),
        1 => "[^\"\\\\]{0,32}".prop_map(|s| GenRecord::Malformed(format!("{{ junk {s}"))),
    ]
}

fn record_message(record: &GenRecord) -> String {
    match record {
        GenRecord::Valid {
            event_name,
            function_name,
        } => serde_json::json!({
            "awsRegion": "us-east-1",
            "eventSource": "lambda.amazonaws.com",
            "eventName": event_name,
            "responseElements": {
                "functionName": function_name,
                "functionArn": format!("arn:aws:lambda:us-east-1:1:function:{function_name}"),
            },
        })
        .to_string(),
        GenRecord::Malformed(s) => s.clone(),
    }
}

fn build_envelope(records: &[GenRecord]) -> String {
    let log_events: Vec<serde_json::Value> = records
        .iter()
        .enumerate()
        .map(|(i, r)| serde_json::json!({"message": record_message(r), "id": i.to_string()}))
        .collect();
    let document = serde_json::json!({
        "logEvents": log_events,
        "messageType": "DATA_MESSAGE",
    });
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(serde_json::to_string(&document).unwrap().as_bytes())
        .unwrap();
    STANDARD.encode(encoder.finish().unwrap())
}

/// Reference admission decision, computed straight from the generated
/// record without going through the wire pipeline.
fn reference_admitted(record: &GenRecord) -> Option<String> {
    match record {
        GenRecord::Valid {
            event_name,
            function_name,
        } if (event_name.contains("CreateFunction")
            || event_name.contains("UpdateFunctionCode"))
            && !function_name.is_empty()
            && function_name != VERIFIER_FUNCTION_NAME =>
        {
            Some(function_name.clone())
        }
        _ => None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    // ========================================================================
    // Decode → parse → admit composition
    // ========================================================================

    /// The admitted-event sequence matches the reference decision for
    /// every record, in input order.
    #[test]
    fn admitted_sequence_matches_reference(
        records in prop::collection::vec(record_strategy(), 0..20)
    ) {
        let batch = decode_envelope(&build_envelope(&records)).unwrap();
        let admitted: Vec<String> = admitted_events(&batch)
            .iter()
            .map(|e| e.response_elements.function_name.clone())
            .collect();
        let expected: Vec<String> =
            records.iter().filter_map(reference_admitted).collect();
        prop_assert_eq!(admitted, expected);
    }

    /// Re-running the pipeline on an identical envelope yields an
    /// identical ordered admitted-event sequence.
    #[test]
    fn pipeline_is_idempotent(
        records in prop::collection::vec(record_strategy(), 0..20)
    ) {
        let envelope = build_envelope(&records);
        let first = admitted_events(&decode_envelope(&envelope).unwrap());
        let second = admitted_events(&decode_envelope(&envelope).unwrap());
        prop_assert_eq!(first, second);
    }

    /// A malformed subset is silently excluded: the well-formed
    /// records alone determine the admitted events.
    #[test]
    fn malformed_subset_is_silently_excluded(
        records in prop::collection::vec(record_strategy(), 0..20)
    ) {
        let valid_only: Vec<GenRecord> = records
            .iter()
            .filter(|r| matches!(r, GenRecord::Valid { .. }))
            .cloned()
            .collect();

        let mixed = admitted_events(&decode_envelope(&build_envelope(&records)).unwrap());
        let clean = admitted_events(&decode_envelope(&build_envelope(&valid_only)).unwrap());
        prop_assert_eq!(mixed, clean);
    }

    /// Events naming the verifier itself are never admitted, whatever
    /// the event name.
    #[test]
    fn verifier_is_never_admitted(event_name in event_name_strategy()) {
        let event: LifecycleEvent = serde_json::from_value(serde_json::json!({
            "awsRegion": "us-east-1",
            "eventSource": "lambda.amazonaws.com",
            "eventName": event_name,
            "responseElements": {
                "functionName": VERIFIER_FUNCTION_NAME,
                "functionArn": "arn:aws:lambda:us-east-1:1:function:self",
            },
        }))
        .unwrap();
        prop_assert!(!admit(&event));
    }

    // ========================================================================
    // Trust-mode matrix
    // ========================================================================

    /// Explicit key material always wins, in either trust mode, and
    /// never raises the experimental flag.
    #[test]
    fn explicit_key_material_wins(key in "[a-zA-Z0-9./_-]{1,32}") {
        let keyless = build_verify_options(TrustMode::Keyless, &key);
        prop_assert_eq!(&keyless.key, &key);
        prop_assert!(!keyless.experimental_keyless);

        let key_based = build_verify_options(TrustMode::KeyBased, &key);
        prop_assert_eq!(&key_based.key, &key);
        prop_assert!(!key_based.experimental_keyless);
    }
}

#[test]
fn trust_mode_defaults() {
    let keyless = build_verify_options(TrustMode::Keyless, "");
    assert!(keyless.key.is_empty());
    assert!(keyless.experimental_keyless);

    let key_based = build_verify_options(TrustMode::KeyBased, "");
    assert_eq!(key_based.key, DEFAULT_KEY_REFERENCE);
    assert!(!key_based.experimental_keyless);
}
