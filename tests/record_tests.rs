//! Tests for the record envelope
//!
//! These tests verify:
//! - Byte-identical encode/decode round-trips
//! - Header layout (offset, CRC) on the wire
//! - Rejection of short and corrupted input

use riftlog::record::{Record, ENVELOPE_HEADER};
use riftlog::RiftError;

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_encode_decode_round_trip() {
    let record = Record {
        value: b"hello world".to_vec(),
        offset: 42,
    };

    let encoded = record.encode();
    assert_eq!(encoded.len(), record.encoded_len());

    let decoded = Record::decode(&encoded).unwrap();
    assert_eq!(decoded, record);

    // Byte-identical re-encode
    assert_eq!(decoded.encode(), encoded);
}

#[test]
fn test_empty_value_round_trip() {
    let record = Record {
        value: Vec::new(),
        offset: 7,
    };

    let encoded = record.encode();
    assert_eq!(encoded.len(), ENVELOPE_HEADER);

    let decoded = Record::decode(&encoded).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn test_header_layout() {
    let record = Record {
        value: b"abc".to_vec(),
        offset: 0x0102030405060708,
    };

    let encoded = record.encode();
    assert_eq!(
        &encoded[0..8],
        &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
    );
    assert_eq!(&encoded[ENVELOPE_HEADER..], b"abc");
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_decode_short_input() {
    assert!(matches!(
        Record::decode(&[0u8; ENVELOPE_HEADER - 1]),
        Err(RiftError::Corruption(_))
    ));
    assert!(matches!(
        Record::decode(&[]),
        Err(RiftError::Corruption(_))
    ));
}

#[test]
fn test_decode_flipped_value_byte() {
    let record = Record {
        value: b"payload".to_vec(),
        offset: 3,
    };

    let mut encoded = record.encode();
    let last = encoded.len() - 1;
    encoded[last] ^= 0xFF;

    assert!(matches!(
        Record::decode(&encoded),
        Err(RiftError::Corruption(_))
    ));
}

#[test]
fn test_decode_flipped_crc_byte() {
    let record = Record {
        value: b"payload".to_vec(),
        offset: 3,
    };

    let mut encoded = record.encode();
    encoded[8] ^= 0xFF;

    assert!(matches!(
        Record::decode(&encoded),
        Err(RiftError::Corruption(_))
    ));
}
