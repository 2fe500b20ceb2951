use mp4nav::boxes::FourCC;
use mp4nav::diag::MemorySink;
use mp4nav::parser::{read_header, write_header};
use mp4nav::stream::{BoxStream, SeekStream};
use mp4nav::unknown::{handle_unknown, handle_unknown_traced};
use std::io::{Cursor, Read};

fn two_boxes() -> Vec<u8> {
    let mut v = Vec::new();
    write_header(&mut v, FourCC(*b"xyz1"), 12).unwrap();
    v.extend_from_slice(&[7u8; 12]);
    write_header(&mut v, FourCC(*b"free"), 0).unwrap();
    v
}

#[test]
fn top_level_unknown_is_reported_and_skipped() {
    let mut s = SeekStream::new(Cursor::new(two_boxes())).unwrap();
    let mut sink = MemorySink::new();

    let hdr = read_header(&mut s).unwrap();
    handle_unknown(&mut s, &hdr, None, &mut sink).unwrap();

    assert_eq!(sink.lines, vec!["unknown box 'xyz1' at top level".to_string()]);
    assert_eq!(s.position(), 20);
    assert_eq!(read_header(&mut s).unwrap().typ, FourCC(*b"free"));
}

#[test]
fn nested_unknown_names_size_and_parent() {
    let mut s = SeekStream::new(Cursor::new(two_boxes())).unwrap();
    let mut sink = MemorySink::new();

    let hdr = read_header(&mut s).unwrap();
    // a payload consumer that gave up part way
    let mut partial = [0u8; 5];
    s.read_exact(&mut partial).unwrap();
    handle_unknown(&mut s, &hdr, Some(FourCC(*b"trak")), &mut sink).unwrap();

    assert_eq!(sink.lines, vec!["unknown box 'xyz1' (size 20) inside 'trak'".to_string()]);
    assert_eq!(s.position(), 20);
}

#[test]
fn traced_variant_dumps_payload_after_the_report() {
    let mut s = SeekStream::new(Cursor::new(two_boxes())).unwrap();
    let mut sink = MemorySink::new();

    let hdr = read_header(&mut s).unwrap();
    handle_unknown_traced(&mut s, &hdr, None, &mut sink).unwrap();

    assert_eq!(sink.lines.len(), 2);
    assert_eq!(sink.lines[0], "unknown box 'xyz1' at top level");
    assert!(sink.lines[1].starts_with("skipped 12 bytes at 0x8"));
    assert_eq!(s.position(), 20);
}

#[test]
fn truncated_unknown_still_reports_before_failing() {
    let mut v = Vec::new();
    write_header(&mut v, FourCC(*b"xyz1"), 100).unwrap();
    v.extend_from_slice(&[0u8; 10]);
    let mut s = SeekStream::new(Cursor::new(v)).unwrap();
    let mut sink = MemorySink::new();

    let hdr = read_header(&mut s).unwrap();
    assert!(handle_unknown(&mut s, &hdr, None, &mut sink).is_err());
    assert_eq!(sink.lines.len(), 1);
}
