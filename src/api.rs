use crate::{
    boxes::{BoxRef, NodeKind},
    diag::DiagnosticSink,
    known_boxes::KnownBox,
    registry::default_registry,
    stream::BoxStream,
    walk::{WalkOptions, Walker},
};
use serde::Serialize;

/// A JSON-serializable representation of a single box.
///
/// This structure carries the geometry the navigator worked out for a box,
/// making it suitable for serialization to JSON for use in web UIs, CLIs, or APIs.
#[derive(Debug, Serialize)]
pub struct Box {
    /// Absolute byte offset of this box in the stream
    pub offset: u64,
    /// Total size of this box including header and payload
    pub size: u64,
    /// Size of just the box header (8, or 16 for the extended size form)
    pub header_size: u64,
    /// Absolute offset where payload data starts (None for containers)
    pub payload_offset: Option<u64>,
    /// Size of payload data (None for containers)
    pub payload_size: Option<u64>,

    /// Four-character box type code (e.g., "ftyp", "moov")
    pub typ: String,
    /// Version field for FullBox types
    pub version: Option<u8>,
    /// Flags field for FullBox types
    pub flags: Option<u32>,
    /// Box classification: "leaf", "full", "container", "unknown" or "abandoned"
    pub kind: String,
    /// Human-readable box type name (e.g., "File Type Box")
    pub full_name: String,
    /// Decoder output if decoding was requested and a decoder exists
    pub decoded: Option<String>,
    /// Why the subtree was given up on, for abandoned containers
    pub error: Option<String>,
    /// Child boxes for container types
    pub children: Option<Vec<Box>>,
}

/// Walk a stream and return the box tree as JSON-serializable structures.
///
/// # Parameters
/// - `s`: any [`BoxStream`]; wrap files in [`SeekStream`](crate::SeekStream)
///   and pipes in [`ReadStream`](crate::ReadStream)
/// - `opts`: walk configuration; `opts.decode` runs the default registry
/// - `sink`: receives diagnostics (unknown boxes, traces)
///
/// # Example
/// ```no_run
/// use mp4nav::{get_boxes, LogSink, SeekStream, WalkOptions};
/// use std::fs::File;
///
/// let mut s = SeekStream::new(File::open("video.mp4")?)?;
/// let opts = WalkOptions { decode: true, ..WalkOptions::default() };
/// let boxes = get_boxes(&mut s, opts, &mut LogSink)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_boxes<S: BoxStream>(
    s: &mut S,
    opts: WalkOptions,
    sink: &mut dyn DiagnosticSink,
) -> anyhow::Result<Vec<Box>> {
    let reg = default_registry();
    let tree = Walker::new(&reg, sink, opts).walk(s)?;
    Ok(tree.iter().map(build_box).collect())
}

fn build_box(b: &BoxRef) -> Box {
    let hdr = &b.hdr;
    let full_name = KnownBox::from(hdr.typ).full_name().to_string();

    let (payload_offset, payload_size) = match &b.kind {
        NodeKind::FullBox { data_offset, data_len, .. }
        | NodeKind::Leaf { data_offset, data_len }
        | NodeKind::Unknown { data_offset, data_len } => (Some(*data_offset), Some(*data_len)),
        NodeKind::Container(_) | NodeKind::Abandoned { .. } | NodeKind::DepthLimited => (None, None),
    };

    let (version, flags, kind_str, error, children) = match &b.kind {
        NodeKind::FullBox { version, flags, .. } => {
            (Some(*version), Some(*flags), "full", None, None)
        }
        NodeKind::Leaf { .. } => (None, None, "leaf", None, None),
        NodeKind::Unknown { .. } => (None, None, "unknown", None, None),
        NodeKind::Abandoned { reason } => (None, None, "abandoned", Some(reason.clone()), None),
        NodeKind::DepthLimited => (None, None, "depth-limited", None, None),
        NodeKind::Container(kids) => {
            let child_nodes = kids.iter().map(build_box).collect();
            (None, None, "container", None, Some(child_nodes))
        }
    };

    Box {
        offset: hdr.start,
        size: hdr.size,
        header_size: hdr.header_size,
        payload_offset,
        payload_size,

        typ: hdr.typ.to_string(),
        version,
        flags,
        kind: kind_str.to_string(),
        full_name,
        decoded: b.decoded.clone(),
        error,
        children,
    }
}
