//! Tests for the log aggregate
//!
//! These tests verify:
//! - Consecutive offset assignment from the initial offset
//! - Reads across segments and out-of-range rejection
//! - State recovery on reopen
//! - Rollover once the active segment maxes out
//! - Prefix truncation and file removal
//! - The sequential byte reader over all store files

use std::io::Read;

use riftlog::log::LEN_WIDTH;
use riftlog::{Config, Log, Record, RiftError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn log_config(max_store_bytes: u64, max_index_bytes: u64) -> Config {
    Config::builder()
        .max_store_bytes(max_store_bytes)
        .max_index_bytes(max_index_bytes)
        .build()
}

fn setup_log(config: &Config) -> (TempDir, Log) {
    let temp_dir = TempDir::new().unwrap();
    let log = Log::open(temp_dir.path(), config.clone()).unwrap();
    (temp_dir, log)
}

fn append_value(log: &Log, value: &[u8]) -> u64 {
    let mut record = Record::new(value.to_vec());
    log.append(&mut record).unwrap()
}

// =============================================================================
// Append / Read Tests
// =============================================================================

#[test]
fn test_append_read_reopen() {
    let config = log_config(1024, 1024);
    let (temp_dir, log) = setup_log(&config);

    let offset = append_value(&log, b"hello world");
    assert_eq!(offset, 0);
    assert_eq!(log.highest_offset(), 0);

    let record = log.read(0).unwrap();
    assert_eq!(record.value, b"hello world".to_vec());
    assert_eq!(record.offset, 0);

    log.close().unwrap();
    drop(log);

    let log = Log::open(temp_dir.path(), config).unwrap();
    assert_eq!(log.highest_offset(), 0);
    assert_eq!(log.read(0).unwrap().value, b"hello world".to_vec());

    // Offsets continue from the recovered high water mark
    assert_eq!(append_value(&log, b"again"), 1);
}

#[test]
fn test_offsets_are_consecutive() {
    let config = log_config(1024, 1024);
    let (_temp, log) = setup_log(&config);

    for want in 0..5u64 {
        assert_eq!(append_value(&log, b"record"), want);
    }
    assert_eq!(log.lowest_offset(), 0);
    assert_eq!(log.highest_offset(), 4);
}

#[test]
fn test_initial_offset() {
    let config = Config::builder().initial_offset(10).build();
    let (_temp, log) = setup_log(&config);

    assert_eq!(log.lowest_offset(), 10);
    assert_eq!(append_value(&log, b"first"), 10);
    assert_eq!(log.highest_offset(), 10);
}

#[test]
fn test_read_out_of_range() {
    let config = log_config(1024, 1024);
    let (_temp, log) = setup_log(&config);

    // Nothing appended yet
    assert!(matches!(
        log.read(0),
        Err(RiftError::OffsetOutOfRange { offset: 0 })
    ));

    append_value(&log, b"only");
    assert!(matches!(
        log.read(1),
        Err(RiftError::OffsetOutOfRange { offset: 1 })
    ));
}

// =============================================================================
// Rollover Tests
// =============================================================================

#[test]
fn test_rollover_to_new_segments() {
    // Tight store limit so a couple of appends max a segment
    let config = log_config(32, 36);
    let (temp_dir, log) = setup_log(&config);

    for i in 0..4u64 {
        assert_eq!(append_value(&log, b"abc"), i);
        for j in 0..=i {
            assert_eq!(log.read(j).unwrap().value, b"abc".to_vec());
        }
    }

    assert_eq!(log.highest_offset(), 3);
    assert!(log.read(2).is_ok());
    assert!(log.read(3).is_ok());

    // Rollover left multiple segments behind
    assert!(temp_dir.path().join("0.store").exists());
    assert!(temp_dir.path().join("2.store").exists());
}

#[test]
fn test_reopen_across_segments() {
    let config = log_config(32, 1024);
    let (temp_dir, log) = setup_log(&config);

    for _ in 0..6 {
        append_value(&log, b"abc");
    }
    let highest = log.highest_offset();
    log.close().unwrap();
    drop(log);

    let log = Log::open(temp_dir.path(), config).unwrap();
    assert_eq!(log.lowest_offset(), 0);
    assert_eq!(log.highest_offset(), highest);
    for i in 0..=highest {
        assert_eq!(log.read(i).unwrap().offset, i);
    }
}

// =============================================================================
// Truncate Tests
// =============================================================================

#[test]
fn test_truncate_removes_low_segments() {
    let config = log_config(32, 1024);
    let (temp_dir, log) = setup_log(&config);

    // "abc" envelopes roll the segment every second append:
    // segments at base offsets 0, 2, 4
    for _ in 0..5 {
        append_value(&log, b"abc");
    }
    assert!(temp_dir.path().join("0.store").exists());

    log.truncate(1).unwrap();

    assert_eq!(log.lowest_offset(), 2);
    assert!(!temp_dir.path().join("0.store").exists());
    assert!(!temp_dir.path().join("0.index").exists());

    assert!(matches!(
        log.read(0),
        Err(RiftError::OffsetOutOfRange { offset: 0 })
    ));
    assert!(matches!(
        log.read(1),
        Err(RiftError::OffsetOutOfRange { offset: 1 })
    ));
    for i in 2..=4 {
        assert_eq!(log.read(i).unwrap().value, b"abc".to_vec());
    }
}

#[test]
fn test_truncate_never_removes_active_segment() {
    let config = log_config(1024, 1024);
    let (_temp, log) = setup_log(&config);

    append_value(&log, b"abc");
    log.truncate(1000).unwrap();

    // The lone active segment survived and keeps accepting appends
    assert_eq!(log.lowest_offset(), 0);
    assert_eq!(append_value(&log, b"def"), 1);
}

// =============================================================================
// Reader Tests
// =============================================================================

#[test]
fn test_reader_streams_all_stores() {
    let config = log_config(32, 1024);
    let (_temp, log) = setup_log(&config);

    let values: &[&[u8]] = &[b"one", b"two", b"three"];
    let mut expected = Vec::new();
    for v in values {
        let mut record = Record::new(v.to_vec());
        log.append(&mut record).unwrap();
        expected.push(record);
    }

    let mut bytes = Vec::new();
    log.reader().read_to_end(&mut bytes).unwrap();

    let total: usize = expected
        .iter()
        .map(|r| LEN_WIDTH as usize + r.encoded_len())
        .sum();
    assert_eq!(bytes.len(), total);

    // The stream is the stores' raw length-prefixed entries in order
    let mut at = 0;
    for record in &expected {
        let len =
            u64::from_be_bytes(bytes[at..at + LEN_WIDTH as usize].try_into().unwrap()) as usize;
        at += LEN_WIDTH as usize;

        let decoded = Record::decode(&bytes[at..at + len]).unwrap();
        assert_eq!(&decoded, record);
        at += len;
    }
    assert_eq!(at, bytes.len());
}

// =============================================================================
// Reset Tests
// =============================================================================

#[test]
fn test_reset_starts_fresh() {
    let config = log_config(1024, 1024);
    let (_temp, log) = setup_log(&config);

    for _ in 0..3 {
        append_value(&log, b"abc");
    }
    log.reset().unwrap();

    assert_eq!(log.lowest_offset(), 0);
    assert_eq!(append_value(&log, b"fresh"), 0);
}
