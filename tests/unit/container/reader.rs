use super::*;

#[test]
fn reads_big_endian_in_sequence() {
    let data = [0x1e, 0x1a, 0x00, 0x00, 0x01, 0x02, 0xaa];
    let mut r = ByteReader::new(&data);
    assert_eq!(r.u16_be().unwrap(), 0x1e1a);
    assert_eq!(r.u32_be().unwrap(), 0x0000_0102);
    assert_eq!(r.position(), 6);
    assert_eq!(r.bytes(1).unwrap(), &[0xaa]);
    assert!(r.is_empty());
}

#[test]
fn short_read_reports_offset_and_does_not_advance() {
    let data = [0u8; 3];
    let mut r = ByteReader::new(&data);
    r.bytes(1).unwrap();
    let err = r.u32_be().unwrap_err();
    assert_eq!(
        err,
        FormatError::Truncated {
            offset: 1,
            needed: 4,
            available: 2
        }
    );
    assert_eq!(r.position(), 1);
}

#[test]
fn window_is_bounded_by_its_end() {
    let data = [1u8, 2, 3, 4, 5, 6];
    let mut r = ByteReader::window(&data, 2, 4).unwrap();
    assert_eq!(r.remaining(), 2);
    assert_eq!(r.bytes(2).unwrap(), &[3, 4]);
    assert!(r.bytes(1).is_err());
}

#[test]
fn window_outside_buffer_is_truncated() {
    let data = [0u8; 4];
    assert!(matches!(
        ByteReader::window(&data, 2, 8),
        Err(FormatError::Truncated { offset: 2, .. })
    ));
    assert!(ByteReader::window(&data, 3, 2).is_err());
}
