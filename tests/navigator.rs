use mp4nav::boxes::{BoxHeader, FourCC};
use mp4nav::diag::MemorySink;
use mp4nav::navigator::{bytes_remaining, skip_to_end, skip_to_end_with_trace};
use mp4nav::parser::{ParseError, read_header, write_header, write_large_header};
use mp4nav::stream::{BoxStream, ReadStream, SeekStream};
use std::io::{Cursor, Read};

/// Sibling boxes with the given payload lengths, every payload byte set to
/// the box index. The third box uses the extended header.
fn siblings(payloads: &[u64]) -> (Vec<u8>, Vec<u64>) {
    let mut data = Vec::new();
    let mut sizes = Vec::new();
    for (i, &len) in payloads.iter().enumerate() {
        let typ = FourCC([b'b', b'x', b'0' + i as u8, b'_']);
        let size = if i == 2 {
            write_large_header(&mut data, typ, len).unwrap()
        } else {
            write_header(&mut data, typ, len).unwrap()
        };
        data.extend(std::iter::repeat(i as u8).take(len as usize));
        sizes.push(size);
    }
    (data, sizes)
}

#[test]
fn offsets_advance_by_each_sibling_size() {
    let (data, sizes) = siblings(&[0, 13, 7, 100, 1]);
    let mut prefix = vec![0u8; 3];
    prefix.extend(data);
    let mut s = SeekStream::new(Cursor::new(prefix)).unwrap();
    s.skip_forward(3).unwrap();

    // consume a different amount of each payload before realigning
    let mut expected = 3;
    for (i, size) in sizes.iter().enumerate() {
        let hdr = read_header(&mut s).unwrap();
        assert_eq!(hdr.start, expected);
        assert_eq!(hdr.size, *size);

        let mut buf = vec![0u8; (hdr.payload_len() as usize).min(i)];
        s.read_exact(&mut buf).unwrap();

        skip_to_end(&mut s, &hdr).unwrap();
        expected += size;
        assert_eq!(s.position(), expected);
    }
    assert!(s.at_end().unwrap());
}

#[test]
fn unseekable_stream_keeps_the_same_offsets() {
    let (data, sizes) = siblings(&[4, 0, 9]);
    let mut s = ReadStream::new(Cursor::new(data));

    let mut expected = 0;
    for size in sizes {
        let hdr = read_header(&mut s).unwrap();
        assert_eq!(hdr.start, expected);
        skip_to_end(&mut s, &hdr).unwrap();
        expected += size;
        assert_eq!(s.position(), expected);
    }
    assert!(s.at_end().unwrap());
}

#[test]
fn remaining_is_stable_and_zero_skip_does_not_move() {
    let (data, _) = siblings(&[10]);
    let mut s = SeekStream::new(Cursor::new(data)).unwrap();
    let hdr = read_header(&mut s).unwrap();

    assert_eq!(bytes_remaining(&s, &hdr), 10);
    assert_eq!(bytes_remaining(&s, &hdr), 10);

    s.skip_forward(10).unwrap();
    assert_eq!(bytes_remaining(&s, &hdr), 0);
    skip_to_end(&mut s, &hdr).unwrap();
    assert_eq!(s.position(), 18);
    skip_to_end(&mut s, &hdr).unwrap();
    assert_eq!(s.position(), 18);
}

#[test]
fn overrun_is_reported_not_skipped() {
    let hdr = BoxHeader { size: 10, typ: FourCC(*b"abcd"), header_size: 8, start: 0 };
    let mut s = SeekStream::new(Cursor::new(vec![0u8; 32])).unwrap();
    s.skip_forward(15).unwrap();

    assert_eq!(bytes_remaining(&s, &hdr), -5);
    let err = skip_to_end(&mut s, &hdr).unwrap_err();
    assert!(matches!(err, ParseError::Overrun { excess: 5, .. }));
    assert_eq!(s.position(), 15);

    let mut sink = MemorySink::new();
    let err = skip_to_end_with_trace(&mut s, &hdr, &mut sink).unwrap_err();
    assert!(matches!(err, ParseError::Overrun { excess: 5, .. }));
    assert!(sink.lines.is_empty());
}

#[test]
fn skip_past_stream_end_is_seek_failure() {
    // declares 64 bytes, stream holds 20
    let mut data = Vec::new();
    write_header(&mut data, FourCC(*b"mdat"), 56).unwrap();
    data.extend_from_slice(&[0u8; 12]);

    let mut s = SeekStream::new(Cursor::new(data.clone())).unwrap();
    let hdr = read_header(&mut s).unwrap();
    let err = skip_to_end(&mut s, &hdr).unwrap_err();
    assert!(matches!(err, ParseError::SeekFailure { offset: 8, wanted: 56, .. }));
    assert!(!err.is_structural());

    let mut s = ReadStream::new(Cursor::new(data));
    let hdr = read_header(&mut s).unwrap();
    let err = skip_to_end(&mut s, &hdr).unwrap_err();
    assert!(matches!(err, ParseError::SeekFailure { wanted: 56, .. }));
}

#[test]
fn traced_skip_reports_the_unread_payload() {
    let mut data = Vec::new();
    write_header(&mut data, FourCC(*b"udta"), 6).unwrap();
    data.extend_from_slice(b"abcdef");
    let mut s = SeekStream::new(Cursor::new(data)).unwrap();
    let hdr = read_header(&mut s).unwrap();

    let mut two = [0u8; 2];
    s.read_exact(&mut two).unwrap();

    let mut sink = MemorySink::new();
    skip_to_end_with_trace(&mut s, &hdr, &mut sink).unwrap();
    assert_eq!(s.position(), 14);
    assert_eq!(sink.lines.len(), 1);
    assert!(sink.lines[0].starts_with("skipped 4 bytes at 0xa"));
    assert!(sink.lines[0].contains("|cdef|"));
}
