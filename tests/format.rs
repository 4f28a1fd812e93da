use bytehuff::{Error, compress, decompress};

#[test]
fn test_exact_bytes() {
    // a:2 b:1, so b merges first and lands on the left.
    let packed = compress(b"aab").unwrap();
    assert_eq!(
        packed,
        vec![
            0x00, 0x02, //
            b'a', 1, 0x80, //
            b'b', 1, 0x00, //
            0, 0, 0, 0, 0, 0, 0, 3, //
            0b1100_0000,
        ]
    );
}

#[test]
fn test_empty_input_is_header_only() {
    let packed = compress(b"").unwrap();
    assert_eq!(packed, vec![0; 10]);
    assert!(decompress(&packed).unwrap().is_empty());
}

#[test]
fn test_hand_written_file() {
    // x = 0, y = 10, z = 11; "xyzzx" = 0 10 11 11 0.
    let mut data = vec![0, 3, b'x', 1, 0x00, b'y', 2, 0x80, b'z', 2, 0xC0];
    data.extend_from_slice(&5u64.to_be_bytes());
    data.push(0b0101_1110);
    assert_eq!(decompress(&data).unwrap(), b"xyzzx");
}

#[test]
fn test_missing_table_with_symbols() {
    let mut data = vec![0, 0];
    data.extend_from_slice(&3u64.to_be_bytes());
    assert!(matches!(decompress(&data), Err(Error::EmptyAlphabet)));
}

#[test]
fn test_zero_length_code_rejected() {
    let mut data = vec![0, 2, b'x', 0, b'y', 1, 0x80];
    data.extend_from_slice(&1u64.to_be_bytes());
    data.push(0x80);
    assert!(matches!(decompress(&data), Err(Error::CorruptHeader(_))));
}

#[test]
fn test_header_without_payload() {
    let mut data = vec![0, 1, b'q', 1, 0x00];
    data.extend_from_slice(&4u64.to_be_bytes());
    assert!(matches!(decompress(&data), Err(Error::TruncatedStream)));
}
