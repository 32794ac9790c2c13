#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test]
fn GenerateError___duplicate_constructor___displays_hex_id() {
    let err = GenerateError::DuplicateConstructor {
        id: 0x7abe77ec,
        first: "ping".into(),
        second: "ping2".into(),
    };

    let display = err.to_string();

    assert_eq!(
        display,
        "duplicate constructor id 0x7abe77ec: `ping` and `ping2`"
    );
}

#[test]
fn GenerateError___malformed_schema___displays_location() {
    let err = GenerateError::MalformedSchema {
        source_name: "api.tl".into(),
        line: 12,
        reason: "missing `=`".into(),
    };

    assert_eq!(
        err.to_string(),
        "api.tl:12: malformed schema record: missing `=`"
    );
}

#[test]
fn GenerateError___io___keeps_source() {
    use std::error::Error as _;
    let err = GenerateError::io(
        "/tmp/out",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );

    assert!(err.source().is_some());
    assert!(err.to_string().starts_with("I/O error on /tmp/out"));
}

#[test_case(GenerateError::DuplicateConstructor { id: 1, first: "a".into(), second: "b".into() }, true)]
#[test_case(GenerateError::ParameterOrder { definition: "d".into(), flagged: "f".into(), required: "r".into() }, true)]
#[test_case(GenerateError::Unsupported { definition: "d".into(), detail: "x".into() }, true)]
#[test_case(GenerateError::Config("bad".into()), false)]
#[test_case(GenerateError::Internal("bug".into()), false)]
fn GenerateError___variant___classified_as_schema_error(error: GenerateError, expected: bool) {
    assert_eq!(error.is_schema_error(), expected);
}

#[test]
fn GenerateError___all_variants___have_unique_nonzero_codes() {
    let errors = vec![
        GenerateError::DuplicateConstructor {
            id: 1,
            first: String::new(),
            second: String::new(),
        },
        GenerateError::UnknownFlagIndicator {
            definition: String::new(),
            argument: String::new(),
            indicator: String::new(),
        },
        GenerateError::FlagBeforeIndicator {
            definition: String::new(),
            argument: String::new(),
            indicator: String::new(),
        },
        GenerateError::MultipleFlagIndicators {
            definition: String::new(),
            first: String::new(),
            second: String::new(),
        },
        GenerateError::UnregisteredAbstract {
            definition: String::new(),
            family: String::new(),
        },
        GenerateError::ParameterOrder {
            definition: String::new(),
            flagged: String::new(),
            required: String::new(),
        },
        GenerateError::UnknownBareType {
            definition: String::new(),
            name: String::new(),
        },
        GenerateError::Unsupported {
            definition: String::new(),
            detail: String::new(),
        },
        GenerateError::MalformedSchema {
            source_name: String::new(),
            line: 0,
            reason: String::new(),
        },
        GenerateError::io("", std::io::Error::other("x")),
        GenerateError::Config(String::new()),
        GenerateError::Internal(String::new()),
    ];

    let codes: Vec<u8> = errors.iter().map(|e| e.error_code()).collect();
    let unique: std::collections::HashSet<u8> = codes.iter().copied().collect();

    assert_eq!(codes.len(), unique.len(), "All error codes should be unique");
    assert!(codes.iter().all(|&c| c > 1), "0 and 1 are reserved for the CLI");
}
