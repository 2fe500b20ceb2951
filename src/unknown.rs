use crate::boxes::{BoxHeader, FourCC};
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::navigator::{skip_to_end, skip_to_end_with_trace};
use crate::parser::Result;
use crate::stream::BoxStream;

/// Report a box nobody handles and skip it.
///
/// Unknown boxes are expected in forward-compatible files; the only errors
/// returned are the navigator's.
pub fn handle_unknown<S: BoxStream + ?Sized>(
    s: &mut S,
    hdr: &BoxHeader,
    parent: Option<FourCC>,
    sink: &mut dyn DiagnosticSink,
) -> Result<()> {
    report(hdr, parent, sink);
    skip_to_end(s, hdr)
}

/// [`handle_unknown`], dumping the skipped payload to `sink` as well.
pub fn handle_unknown_traced<S: BoxStream + ?Sized>(
    s: &mut S,
    hdr: &BoxHeader,
    parent: Option<FourCC>,
    sink: &mut dyn DiagnosticSink,
) -> Result<()> {
    report(hdr, parent, sink);
    skip_to_end_with_trace(s, hdr, sink)
}

fn report(hdr: &BoxHeader, parent: Option<FourCC>, sink: &mut dyn DiagnosticSink) {
    sink.record(&Diagnostic::UnknownBox { typ: hdr.typ, size: hdr.size, parent });
}
