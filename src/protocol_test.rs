use super::*;
use crate::error::Category;

#[test]
fn current_preamble_encodes_expected_bytes() {
    assert_eq!(Preamble::current().to_bytes(), [0x4e, 0x00, 0x01, 0x00]);
}

#[test]
fn parse_round_trips_current_preamble() {
    let parsed = Preamble::parse(Preamble::current().to_bytes())
        .expect("own preamble should parse");
    assert_eq!(parsed, Preamble::current());
}

#[test]
fn parse_rejects_wrong_lead_byte() {
    let err = Preamble::parse([b'X', WIRE_ENCODING, VERSION_MAJOR, 0])
        .expect_err("wrong lead byte should fail");
    assert_eq!(err.category, Some(Category::Network));
    assert_eq!(err.message, "Invalid preamble");
}

#[test]
fn parse_rejects_unknown_encoding() {
    let err = Preamble::parse([PREAMBLE_LEAD, 9, VERSION_MAJOR, 0])
        .expect_err("unknown encoding should fail");
    assert_eq!(err.category, Some(Category::Network));
    assert_eq!(err.message, "Invalid preamble");
}

#[test]
fn parse_rejects_newer_major_version() {
    let err = Preamble::parse([PREAMBLE_LEAD, WIRE_ENCODING, VERSION_MAJOR + 1, 0])
        .expect_err("newer major should fail");
    assert_eq!(err.category, Some(Category::Api));
    assert_eq!(err.message, "Unsupported API version");
}

#[test]
fn parse_accepts_any_minor_version() {
    let parsed = Preamble::parse([PREAMBLE_LEAD, WIRE_ENCODING, VERSION_MAJOR, 200])
        .expect("minor version must never be rejected");
    assert_eq!(parsed.version_minor, 200);
}

#[test]
fn parse_accepts_older_major_version() {
    let parsed = Preamble::parse([PREAMBLE_LEAD, WIRE_ENCODING, 0, 0])
        .expect("older major should be accepted");
    assert_eq!(parsed.version_major, 0);
}
