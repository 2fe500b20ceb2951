use crate::boxes::{BoxHeader, FourCC};
use crate::stream::BoxStream;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Write};

/// 4-byte size + 4-byte type
pub const HEADER_LEN: u64 = 8;
/// 4-byte size + 4-byte type + 8-byte extended size
pub const LARGE_HEADER_LEN: u64 = 16;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("truncated box header at offset {offset:#x}")]
    TruncatedHeader { offset: u64 },
    #[error("'{typ}' overran its end by {excess} bytes")]
    Overrun { typ: FourCC, excess: u64 },
    #[error("cannot skip {wanted} bytes at offset {offset:#x}: {source}")]
    SeekFailure {
        offset: u64,
        wanted: u64,
        #[source]
        source: io::Error,
    },
    #[error("'{typ}' declares invalid size {size} ({header_size} byte header)")]
    InvalidSize { typ: FourCC, size: u64, header_size: u64 },
    #[error("'{typ}' at {offset:#x} runs to end of an unbounded region")]
    UnboundedBox { typ: FourCC, offset: u64 },
    #[error("'{typ}' ends at {end:#x}, past its parent's end {parent_end:#x}")]
    EscapesParent { typ: FourCC, end: u64, parent_end: u64 },
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    /// Malformed-structure errors. The stream is still usable; only the
    /// enclosing subtree is suspect.
    pub fn is_structural(&self) -> bool {
        !matches!(self, ParseError::SeekFailure { .. } | ParseError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

fn truncated(offset: u64) -> impl FnOnce(io::Error) -> ParseError {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ParseError::TruncatedHeader { offset }
        } else {
            ParseError::Io(e)
        }
    }
}

/// Read the header at the stream's position.
///
/// A wire size of 0 has no enclosing bound here and fails with
/// [`ParseError::UnboundedBox`]; use [`read_header_within`] to resolve it.
pub fn read_header<S: BoxStream + ?Sized>(s: &mut S) -> Result<BoxHeader> {
    read_header_within(s, None)
}

/// Read the header at the stream's position, resolving size 0 against
/// `region_end`.
///
/// Consumes exactly 8 or 16 bytes on success, and never reads past
/// `region_end`. On `TruncatedHeader` the stream is left wherever the short
/// read stopped.
pub fn read_header_within<S: BoxStream + ?Sized>(
    s: &mut S,
    region_end: Option<u64>,
) -> Result<BoxHeader> {
    let start = s.position();
    let size32 = s.read_u32::<BigEndian>().map_err(truncated(start))?;
    let mut typ = [0u8; 4];
    s.read_exact(&mut typ).map_err(truncated(start))?;
    let typ = FourCC(typ);

    let (size, header_size) = match size32 {
        1 => {
            // the extended size must not come from past the region
            if region_end.is_some_and(|end| end.saturating_sub(start) < LARGE_HEADER_LEN) {
                return Err(ParseError::TruncatedHeader { offset: start });
            }
            let size64 = s.read_u64::<BigEndian>().map_err(truncated(start))?;
            (size64, LARGE_HEADER_LEN)
        }
        // valid only as the last box of its region, usually mdat
        0 => {
            let end = region_end.ok_or(ParseError::UnboundedBox { typ, offset: start })?;
            (end.saturating_sub(start), HEADER_LEN)
        }
        n => (u64::from(n), HEADER_LEN),
    };

    if size < header_size || size > i64::MAX as u64 {
        return Err(ParseError::InvalidSize { typ, size, header_size });
    }

    Ok(BoxHeader { size, typ, header_size, start })
}

/// Header length needed for a payload of `payload_len` bytes.
pub fn header_len_for(payload_len: u64) -> u64 {
    if payload_len.saturating_add(HEADER_LEN) <= u64::from(u32::MAX) {
        HEADER_LEN
    } else {
        LARGE_HEADER_LEN
    }
}

/// Write a header for a payload of `payload_len` bytes, using the compact
/// form when the total fits in 32 bits. Returns the box's total size.
pub fn write_header<W: Write>(w: &mut W, typ: FourCC, payload_len: u64) -> io::Result<u64> {
    if header_len_for(payload_len) == LARGE_HEADER_LEN {
        return write_large_header(w, typ, payload_len);
    }
    let size = payload_len + HEADER_LEN;
    w.write_u32::<BigEndian>(size as u32)?;
    w.write_all(&typ.0)?;
    Ok(size)
}

/// Write the 16-byte extended form regardless of size.
pub fn write_large_header<W: Write>(w: &mut W, typ: FourCC, payload_len: u64) -> io::Result<u64> {
    let size = payload_len
        .checked_add(LARGE_HEADER_LEN)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "box size overflows u64"))?;
    w.write_u32::<BigEndian>(1)?;
    w.write_all(&typ.0)?;
    w.write_u64::<BigEndian>(size)?;
    Ok(size)
}
