//! Tree walking on top of the header codec and navigator.
//!
//! Every box visited ends with exactly one navigator call, so a payload
//! decoder reading too little never shifts the next sibling.

use crate::boxes::{BoxHeader, BoxRef, FourCC, NodeKind};
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::known_boxes::KnownBox;
use crate::navigator::{bytes_remaining, skip_to_end, skip_to_end_with_trace};
use crate::parser::{HEADER_LEN, ParseError, Result, read_header_within};
use crate::registry::Registry;
use crate::stream::BoxStream;
use crate::unknown::{handle_unknown, handle_unknown_traced};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Containers deeper than this are skipped whole.
    pub max_depth: usize,
    /// Run registered payload decoders.
    pub decode: bool,
    /// Report skipped payload bytes to the sink.
    pub trace_skips: bool,
    /// A structural error inside a container abandons that container only.
    pub lenient: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self { max_depth: 64, decode: false, trace_skips: false, lenient: false }
    }
}

pub struct Walker<'a> {
    registry: &'a Registry,
    sink: &'a mut dyn DiagnosticSink,
    opts: WalkOptions,
}

impl<'a> Walker<'a> {
    pub fn new(registry: &'a Registry, sink: &'a mut dyn DiagnosticSink, opts: WalkOptions) -> Self {
        Self { registry, sink, opts }
    }

    /// Walk every top-level box from the stream's position to its end.
    pub fn walk<S: BoxStream>(&mut self, s: &mut S) -> Result<Vec<BoxRef>> {
        let end = s.len();
        self.children(s, None, end, 0)
    }

    /// Walk the boxes of a region ending at `region_end` (or at end of
    /// stream when `None`).
    pub fn children<S: BoxStream>(
        &mut self,
        s: &mut S,
        parent: Option<FourCC>,
        region_end: Option<u64>,
        depth: usize,
    ) -> Result<Vec<BoxRef>> {
        let mut kids = Vec::new();
        while more(s, region_end)? {
            kids.push(self.visit(s, parent, region_end, depth)?);
        }
        Ok(kids)
    }

    fn visit<S: BoxStream>(
        &mut self,
        s: &mut S,
        parent: Option<FourCC>,
        region_end: Option<u64>,
        depth: usize,
    ) -> Result<BoxRef> {
        let pos = s.position();
        if let Some(end) = region_end {
            // a header straddling the region end would read into the next box
            if end - pos < HEADER_LEN {
                return Err(ParseError::TruncatedHeader { offset: pos });
            }
        }
        let hdr = read_header_within(s, region_end)?;
        if let Some(parent_end) = region_end {
            if hdr.end() > parent_end {
                return Err(ParseError::EscapesParent { typ: hdr.typ, end: hdr.end(), parent_end });
            }
        }
        self.sink.record(&Diagnostic::Header { header: &hdr, depth });

        let known = KnownBox::from(hdr.typ);
        let mut decoded = None;
        let kind = if known.is_container() {
            self.container(s, &hdr, known, depth)?
        } else if known.is_full_box() && hdr.payload_len() >= 4 {
            let version = s.read_u8()?;
            let flags = s.read_u24::<BigEndian>()?;
            let data_offset = s.position();
            decoded = self.decode(s, &hdr, Some(version), Some(flags));
            NodeKind::FullBox { version, flags, data_offset, data_len: hdr.end() - data_offset }
        } else if let KnownBox::Unknown(_) = known {
            if self.opts.trace_skips {
                handle_unknown_traced(s, &hdr, parent, &mut *self.sink)?;
            } else {
                handle_unknown(s, &hdr, parent, &mut *self.sink)?;
            }
            let kind = NodeKind::Unknown { data_offset: hdr.payload_offset(), data_len: hdr.payload_len() };
            return Ok(BoxRef { hdr, kind, decoded: None });
        } else {
            decoded = self.decode(s, &hdr, None, None);
            NodeKind::Leaf { data_offset: hdr.payload_offset(), data_len: hdr.payload_len() }
        };

        self.finish(s, &hdr)?;
        Ok(BoxRef { hdr, kind, decoded })
    }

    fn container<S: BoxStream>(
        &mut self,
        s: &mut S,
        hdr: &BoxHeader,
        known: KnownBox,
        depth: usize,
    ) -> Result<NodeKind> {
        if depth + 1 > self.opts.max_depth {
            self.sink.record(&Diagnostic::DepthLimited { typ: hdr.typ, start: hdr.start, depth: self.opts.max_depth });
            return Ok(NodeKind::DepthLimited);
        }
        let prefix = known.children_offset();
        if hdr.payload_len() < prefix {
            return Err(ParseError::InvalidSize { typ: hdr.typ, size: hdr.size, header_size: hdr.header_size + prefix });
        }
        let mut skipped = [0u8; 8];
        s.read_exact(&mut skipped[..prefix as usize])?;

        match self.children(s, Some(hdr.typ), Some(hdr.end()), depth + 1) {
            Ok(kids) => Ok(NodeKind::Container(kids)),
            Err(e) if self.opts.lenient && e.is_structural() => {
                let reason = e.to_string();
                self.sink.record(&Diagnostic::Abandoned { typ: hdr.typ, start: hdr.start, reason: reason.clone() });
                Ok(NodeKind::Abandoned { reason })
            }
            Err(e) => Err(e),
        }
    }

    fn decode<S: BoxStream>(
        &mut self,
        s: &mut S,
        hdr: &BoxHeader,
        version: Option<u8>,
        flags: Option<u32>,
    ) -> Option<String> {
        if !self.opts.decode || !self.registry.contains(&hdr.typ) {
            return None;
        }
        let left = bytes_remaining(s, hdr).max(0) as u64;
        let mut bounded = (&mut *s).take(left);
        match self.registry.decode(&hdr.typ, &mut bounded, hdr, version, flags)? {
            Ok(v) => Some(v.to_string()),
            Err(e) => Some(format!("[decode error: {}]", e)),
        }
    }

    fn finish<S: BoxStream>(&mut self, s: &mut S, hdr: &BoxHeader) -> Result<()> {
        if self.opts.trace_skips {
            skip_to_end_with_trace(s, hdr, &mut *self.sink)
        } else {
            skip_to_end(s, hdr)
        }
    }
}

fn more<S: BoxStream>(s: &mut S, region_end: Option<u64>) -> Result<bool> {
    match region_end {
        Some(end) => Ok(s.position() < end),
        None => Ok(!s.at_end()?),
    }
}
