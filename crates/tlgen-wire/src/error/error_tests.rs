#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test]
fn WireError___in_field___displays_path_and_cause() {
    let err = WireError::UnknownConstructor(0xdeadbeef).in_field("pong", "inner");

    assert_eq!(err.to_string(), "`pong.inner`: unknown constructor 0xdeadbeef");
}

#[test]
fn WireError___nested_in_field___root_cause_is_innermost() {
    let err = WireError::InvalidBool(7)
        .in_field("inner", "ok")
        .in_field("outer", "child");

    assert!(matches!(err.root_cause(), WireError::InvalidBool(7)));
    assert_eq!(err.error_code(), 23);
}

#[test]
fn WireError___schema___keeps_generator_code() {
    let err = WireError::from(GenerateError::Config("bad".into()));

    assert_eq!(err.error_code(), GenerateError::Config("bad".into()).error_code());
}

#[test_case(WireError::UnexpectedEof { offset: 0, needed: 4 }, 20 ; "eof")]
#[test_case(WireError::UnknownConstructor(1), 21 ; "unknown")]
#[test_case(WireError::mismatch("int", "string"), 24 ; "mismatch")]
#[test_case(WireError::TrailingBytes(3), 29 ; "trailing")]
#[test_case(WireError::TooDeep { limit: 64 }, 30 ; "too deep")]
fn WireError___error_code___is_stable(err: WireError, expected: u8) {
    assert_eq!(err.error_code(), expected);
}
