//! Tests for the wire protocol codec
//!
//! These tests verify:
//! - Command and response round-trips through the byte codec
//! - Frame validation: short headers, oversized and truncated payloads
//! - Stream-based read/write helpers

use std::io::Cursor;

use riftlog::protocol::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, Command, CommandType, Response, Status,
};
use riftlog::RiftError;

// =============================================================================
// Command Round-trip Tests
// =============================================================================

#[test]
fn test_produce_round_trip() {
    let command = Command::Produce {
        value: b"hello".to_vec(),
    };

    let decoded = decode_command(&encode_command(&command)).unwrap();
    match decoded {
        Command::Produce { value } => assert_eq!(value, b"hello".to_vec()),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_produce_empty_value() {
    let command = Command::Produce { value: Vec::new() };

    let decoded = decode_command(&encode_command(&command)).unwrap();
    match decoded {
        Command::Produce { value } => assert!(value.is_empty()),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_consume_round_trip() {
    let command = Command::Consume { offset: 123456789 };

    let decoded = decode_command(&encode_command(&command)).unwrap();
    match decoded {
        Command::Consume { offset } => assert_eq!(offset, 123456789),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_offsets_and_ping_round_trip() {
    assert!(matches!(
        decode_command(&encode_command(&Command::Offsets)).unwrap(),
        Command::Offsets
    ));
    assert!(matches!(
        decode_command(&encode_command(&Command::Ping)).unwrap(),
        Command::Ping
    ));
}

#[test]
fn test_command_types() {
    assert_eq!(
        Command::Produce { value: vec![] }.command_type(),
        CommandType::Produce
    );
    assert_eq!(
        Command::Consume { offset: 0 }.command_type(),
        CommandType::Consume
    );
    assert_eq!(Command::Offsets.command_type(), CommandType::Offsets);
    assert_eq!(Command::Ping.command_type(), CommandType::Ping);
}

// =============================================================================
// Command Validation Tests
// =============================================================================

#[test]
fn test_unknown_command_type() {
    let frame = [0x99, 0, 0, 0, 0];
    assert!(matches!(
        decode_command(&frame),
        Err(RiftError::Protocol(_))
    ));
}

#[test]
fn test_short_header() {
    assert!(matches!(
        decode_command(&[0x01, 0x00]),
        Err(RiftError::Protocol(_))
    ));
}

#[test]
fn test_truncated_payload() {
    // Header claims 10 payload bytes, none follow
    let frame = [0x01, 0, 0, 0, 10];
    assert!(matches!(
        decode_command(&frame),
        Err(RiftError::Protocol(_))
    ));
}

#[test]
fn test_oversized_payload_rejected() {
    let mut frame = vec![0x01];
    frame.extend_from_slice(&u32::MAX.to_be_bytes());
    assert!(matches!(
        decode_command(&frame),
        Err(RiftError::Protocol(_))
    ));
}

#[test]
fn test_consume_wrong_offset_width() {
    let mut frame = vec![0x02];
    frame.extend_from_slice(&4u32.to_be_bytes());
    frame.extend_from_slice(&[0, 0, 0, 1]);
    assert!(matches!(
        decode_command(&frame),
        Err(RiftError::Protocol(_))
    ));
}

#[test]
fn test_ping_with_payload_rejected() {
    let mut frame = vec![0x04];
    frame.extend_from_slice(&1u32.to_be_bytes());
    frame.push(0xAB);
    assert!(matches!(
        decode_command(&frame),
        Err(RiftError::Protocol(_))
    ));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_ok_round_trip() {
    let response = Response::ok(vec![1, 2, 3]);

    let decoded = decode_response(&encode_response(&response)).unwrap();
    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, Some(vec![1, 2, 3]));
}

#[test]
fn test_response_empty_payload_decodes_to_none() {
    let response = Response {
        status: Status::Ok,
        payload: None,
    };

    let decoded = decode_response(&encode_response(&response)).unwrap();
    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, None);
}

#[test]
fn test_response_statuses() {
    let not_found = decode_response(&encode_response(&Response::not_found("nope"))).unwrap();
    assert_eq!(not_found.status, Status::NotFound);
    assert_eq!(not_found.payload, Some(b"nope".to_vec()));

    let error = decode_response(&encode_response(&Response::error("boom"))).unwrap();
    assert_eq!(error.status, Status::Error);
    assert_eq!(error.payload, Some(b"boom".to_vec()));
}

#[test]
fn test_unknown_status_rejected() {
    let frame = [0x7F, 0, 0, 0, 0];
    assert!(matches!(
        decode_response(&frame),
        Err(RiftError::Protocol(_))
    ));
}

// =============================================================================
// Stream Helper Tests
// =============================================================================

#[test]
fn test_stream_command_round_trip() {
    let command = Command::Produce {
        value: b"streamed".to_vec(),
    };

    let mut buf = Vec::new();
    write_command(&mut buf, &command).unwrap();

    let mut cursor = Cursor::new(buf);
    match read_command(&mut cursor).unwrap() {
        Command::Produce { value } => assert_eq!(value, b"streamed".to_vec()),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_stream_response_round_trip() {
    let response = Response::ok(42u64.to_be_bytes().to_vec());

    let mut buf = Vec::new();
    write_response(&mut buf, &response).unwrap();

    let mut cursor = Cursor::new(buf);
    let decoded = read_response(&mut cursor).unwrap();
    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, Some(42u64.to_be_bytes().to_vec()));
}

#[test]
fn test_stream_pipelined_commands() {
    let mut buf = Vec::new();
    write_command(&mut buf, &Command::Ping).unwrap();
    write_command(&mut buf, &Command::Consume { offset: 9 }).unwrap();

    let mut cursor = Cursor::new(buf);
    assert!(matches!(read_command(&mut cursor).unwrap(), Command::Ping));
    assert!(matches!(
        read_command(&mut cursor).unwrap(),
        Command::Consume { offset: 9 }
    ));
}
