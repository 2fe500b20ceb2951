//! Keeping the stream aligned on box boundaries.
//!
//! Payload consumers may read any amount of a box body. Calling
//! [`skip_to_end`] once afterwards leaves the stream at the next sibling.

use crate::boxes::BoxHeader;
use crate::diag::DiagnosticSink;
use crate::parser::{ParseError, Result};
use crate::stream::BoxStream;

fn as_signed(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Bytes of `hdr`'s box not yet consumed. Negative once a consumer has read
/// past the declared end.
pub fn bytes_remaining<S: BoxStream + ?Sized>(s: &S, hdr: &BoxHeader) -> i64 {
    let consumed = as_signed(s.position()).saturating_sub(as_signed(hdr.start));
    as_signed(hdr.size).saturating_sub(consumed)
}

fn checked_remaining<S: BoxStream + ?Sized>(s: &S, hdr: &BoxHeader) -> Result<u64> {
    let left = bytes_remaining(s, hdr);
    if left < 0 {
        return Err(ParseError::Overrun { typ: hdr.typ, excess: left.unsigned_abs() });
    }
    Ok(left as u64)
}

/// Move the stream to the end of `hdr`'s box.
pub fn skip_to_end<S: BoxStream + ?Sized>(s: &mut S, hdr: &BoxHeader) -> Result<()> {
    let left = checked_remaining(s, hdr)?;
    if left == 0 {
        return Ok(());
    }
    let offset = s.position();
    s.skip_forward(left)
        .map_err(|source| ParseError::SeekFailure { offset, wanted: left, source })
}

/// [`skip_to_end`], with the skipped bytes reported to `sink`.
pub fn skip_to_end_with_trace<S: BoxStream + ?Sized>(
    s: &mut S,
    hdr: &BoxHeader,
    sink: &mut dyn DiagnosticSink,
) -> Result<()> {
    let left = checked_remaining(s, hdr)?;
    if left == 0 {
        return Ok(());
    }
    let offset = s.position();
    s.skip_forward_with_trace(left, sink)
        .map_err(|source| ParseError::SeekFailure { offset, wanted: left, source })
}
