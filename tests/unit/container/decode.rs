use super::*;
use crate::foundation::error::LdiError;
use crate::test_fixture::build_container;

fn three_fields() -> Vec<(u32, Vec<u8>)> {
    vec![
        (5, b"alpha".to_vec()),
        (7, vec![]),
        (5, vec![0xde, 0xad, 0xbe, 0xef]),
    ]
}

fn format_err(bytes: Vec<u8>) -> FormatError {
    match decode_container(bytes.into()) {
        Err(LdiError::Format(e)) => e,
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn three_field_container_recovers_fields_in_order() {
    let src = three_fields();
    let bytes = build_container(b"prefix", &src);
    let c = Container::decode(bytes.clone()).unwrap();

    assert_eq!(c.full_size(), bytes.len());
    assert_eq!(c.len(), 3);
    let got: Vec<(u32, Vec<u8>)> = c.fields().map(|f| (f.field_type, f.data.to_vec())).collect();
    assert_eq!(got, src);
    assert_eq!(c.field(1).unwrap().index, 1);
    assert!(c.field(3).is_none());
    assert_eq!(c.source_bytes(), bytes.as_slice());
}

#[test]
fn lookup_by_type_takes_first_match() {
    let c = Container::decode(build_container(b"", &three_fields())).unwrap();
    let first = c.field_by_type(5).unwrap();
    assert_eq!(first.index, 0);
    assert_eq!(first.data, b"alpha");
    assert_eq!(c.fields_by_type(5).count(), 2);
    assert!(c.field_by_type(99).is_none());
}

#[test]
fn empty_directory_is_valid() {
    let c = Container::decode(build_container(b"jpeg", &[])).unwrap();
    assert!(c.is_empty());
    assert_eq!(c.region_offset(), 10);
}

#[test]
fn flipping_any_marker_bit_is_not_container_format() {
    let good = build_container(b"x", &three_fields());
    let n = good.len();
    for byte in [n - 2, n - 1] {
        for bit in 0..8 {
            let mut bad = good.clone();
            bad[byte] ^= 1 << bit;
            assert!(matches!(
                format_err(bad),
                FormatError::NotContainerFormat {
                    expected: END_MARKER,
                    ..
                }
            ));
        }
    }
}

#[test]
fn tiny_buffers_are_rejected() {
    assert!(matches!(
        format_err(vec![]),
        FormatError::NotContainerFormat { found: 0, .. }
    ));
    assert!(matches!(
        format_err(vec![0x1e]),
        FormatError::NotContainerFormat { .. }
    ));
    assert!(matches!(
        format_err(vec![0x00, 0x1e, 0x1a]),
        FormatError::Truncated { .. }
    ));
}

#[test]
fn missing_field_bytes_are_truncated_not_partial() {
    // Declare three fields but only provide two of them.
    let mut bytes = build_container(b"", &three_fields()[..2]);
    let n = bytes.len();
    let region_offset = u32::from_be_bytes(bytes[n - 6..n - 2].try_into().unwrap());
    let dir_start = n - region_offset as usize;
    bytes[dir_start..dir_start + 4].copy_from_slice(&3u32.to_be_bytes());
    assert!(matches!(format_err(bytes), FormatError::Truncated { .. }));
}

#[test]
fn oversized_field_is_truncated() {
    let mut bytes = build_container(b"", &[(1, vec![1, 2, 3])]);
    let n = bytes.len();
    let dir_start = n - 6 - (4 + 8 + 3);
    // size field of the only record
    bytes[dir_start + 8..dir_start + 12].copy_from_slice(&1000u32.to_be_bytes());
    assert!(matches!(
        format_err(bytes),
        FormatError::Truncated { needed: 1000, .. }
    ));
}

#[test]
fn absurd_field_count_is_rejected_before_allocation() {
    let mut bytes = build_container(b"", &[]);
    let n = bytes.len();
    bytes[n - 10..n - 6].copy_from_slice(&u32::MAX.to_be_bytes());
    assert!(matches!(format_err(bytes), FormatError::Truncated { .. }));
}

#[test]
fn region_offset_past_start_is_truncated() {
    let mut bytes = build_container(b"", &three_fields());
    let n = bytes.len();
    bytes[n - 6..n - 2].copy_from_slice(&(n as u32 + 1).to_be_bytes());
    assert!(matches!(format_err(bytes), FormatError::Truncated { .. }));
}

#[test]
fn region_offset_inside_trailer_is_truncated() {
    let mut bytes = build_container(b"", &three_fields());
    let n = bytes.len();
    bytes[n - 6..n - 2].copy_from_slice(&2u32.to_be_bytes());
    assert!(matches!(format_err(bytes), FormatError::Truncated { .. }));
}

#[test]
fn unconsumed_directory_bytes_are_bad_field_count() {
    let mut bytes = build_container(b"", &three_fields());
    let n = bytes.len();
    let region_offset = u32::from_be_bytes(bytes[n - 6..n - 2].try_into().unwrap());
    let dir_start = n - region_offset as usize;
    bytes[dir_start..dir_start + 4].copy_from_slice(&2u32.to_be_bytes());
    assert_eq!(
        format_err(bytes),
        FormatError::BadFieldCount {
            declared: 2,
            trailing: 8 + 4
        }
    );
}
