use crate::boxes::{BoxHeader, FourCC};
use crate::util::hex_dump;
use std::fmt;

const LOG_TARGET: &str = "mp4nav";

/// One advisory record produced while walking a box tree.
///
/// Records never influence control flow; they only describe it.
#[derive(Debug)]
pub enum Diagnostic<'a> {
    /// A box nobody claimed, about to be skipped.
    UnknownBox { typ: FourCC, size: u64, parent: Option<FourCC> },
    /// A header just read, at the given nesting depth.
    Header { header: &'a BoxHeader, depth: usize },
    /// Bytes passed over by a traced skip.
    Skipped { offset: u64, bytes: &'a [u8] },
    /// A container whose children failed to parse; the walk resumed after it.
    Abandoned { typ: FourCC, start: u64, reason: String },
    /// A container whose children sit below the depth limit.
    DepthLimited { typ: FourCC, start: u64, depth: usize },
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownBox { typ, parent: None, .. } => {
                write!(f, "unknown box '{typ}' at top level")
            }
            Diagnostic::UnknownBox { typ, size, parent: Some(p) } => {
                write!(f, "unknown box '{typ}' (size {size}) inside '{p}'")
            }
            Diagnostic::Header { header, depth } => f.write_str(&format_header(header, *depth)),
            Diagnostic::Skipped { offset, bytes } => {
                write!(f, "skipped {} bytes at {:#x}\n{}", bytes.len(), offset, hex_dump(bytes, *offset))
            }
            Diagnostic::Abandoned { typ, start, reason } => {
                write!(f, "abandoned '{typ}' at {start:#x}: {reason}")
            }
            Diagnostic::DepthLimited { typ, start, depth } => {
                write!(f, "depth limit {depth} reached, children of '{typ}' at {start:#x} not walked")
            }
        }
    }
}

/// Where diagnostics go. Passed explicitly to everything that emits them.
pub trait DiagnosticSink {
    fn record(&mut self, diag: &Diagnostic<'_>);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn record(&mut self, diag: &Diagnostic<'_>) {
        (**self).record(diag)
    }
}

/// Forwards records to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&mut self, diag: &Diagnostic<'_>) {
        match diag {
            Diagnostic::UnknownBox { .. } | Diagnostic::DepthLimited { .. } => log::debug!(target: LOG_TARGET, "{diag}"),
            Diagnostic::Abandoned { .. } => log::warn!(target: LOG_TARGET, "{diag}"),
            Diagnostic::Header { .. } => log::trace!(target: LOG_TARGET, "{diag}"),
            // one line per chunk keeps the log greppable
            Diagnostic::Skipped { offset, bytes } => {
                log::trace!(target: LOG_TARGET, "skip {:#x}+{}: {}", offset, bytes.len(), hex::encode(bytes))
            }
        }
    }
}

/// Keeps every record as rendered text.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&mut self, diag: &Diagnostic<'_>) {
        self.lines.push(diag.to_string());
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _diag: &Diagnostic<'_>) {}
}

/// Render a header as one trace line: start offset, total size, tag.
///
/// Indented two spaces per nesting level.
pub fn format_header(hdr: &BoxHeader, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    format!(
        "{indent}{:>8} {:>10} {}",
        format!("{:#x}", hdr.start),
        hdr.size,
        hdr.typ
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hdr(typ: &[u8; 4], size: u64, start: u64) -> BoxHeader {
        BoxHeader { size, typ: FourCC(*typ), header_size: 8, start }
    }

    #[test]
    fn format_header_indents_by_depth() {
        let h = hdr(b"trak", 512, 0x40);
        assert_eq!(format_header(&h, 0), "    0x40        512 trak");
        assert_eq!(format_header(&h, 2), "        0x40        512 trak");
    }

    #[test]
    fn format_header_masks_unprintable_tags() {
        let h = hdr(&[0xa9, b'n', b'a', b'm'], 20, 0);
        assert!(format_header(&h, 0).ends_with(".nam"));
    }

    #[test]
    fn unknown_box_wording() {
        let top = Diagnostic::UnknownBox { typ: FourCC(*b"zzzz"), size: 8, parent: None };
        assert_eq!(top.to_string(), "unknown box 'zzzz' at top level");

        let nested = Diagnostic::UnknownBox {
            typ: FourCC(*b"zzzz"),
            size: 24,
            parent: Some(FourCC(*b"moov")),
        };
        assert_eq!(nested.to_string(), "unknown box 'zzzz' (size 24) inside 'moov'");
    }

    #[test]
    fn memory_sink_collects_in_order() {
        let mut sink = MemorySink::new();
        let h = hdr(b"free", 8, 0);
        sink.record(&Diagnostic::Header { header: &h, depth: 0 });
        sink.record(&Diagnostic::UnknownBox { typ: FourCC(*b"abcd"), size: 8, parent: None });
        assert_eq!(sink.lines.len(), 2);
        assert!(sink.lines[0].ends_with("free"));
        assert!(sink.lines[1].contains("abcd"));
    }
}
