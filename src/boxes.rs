use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else { None }
    }
    /// The tag as one big-endian integer, for dispatch tables keyed by number.
    pub fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }
    pub fn as_str_lossy(&self) -> String {
        self.0.iter().map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
}
impl From<u32> for FourCC { fn from(v: u32) -> Self { FourCC(v.to_be_bytes()) } }
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

/// One box header as read off the stream.
///
/// Headers are transient: read, dispatched on, then dropped once the
/// navigator has moved past the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHeader {
    pub size: u64,          // total size including header, size=0 already resolved
    pub typ: FourCC,
    pub header_size: u64,   // 8 or 16
    pub start: u64,         // stream offset of header start
}

impl BoxHeader {
    /// Offset one past the last byte of the box.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size)
    }
    pub fn payload_offset(&self) -> u64 {
        self.start + self.header_size
    }
    pub fn payload_len(&self) -> u64 {
        self.size.saturating_sub(self.header_size)
    }
}

#[derive(Debug)]
pub enum NodeKind {
    Container(Vec<BoxRef>),
    FullBox { version: u8, flags: u32, data_offset: u64, data_len: u64 },
    Leaf { data_offset: u64, data_len: u64 },
    Unknown { data_offset: u64, data_len: u64 },
    /// A container whose subtree failed to parse; the walk resumed at its end.
    Abandoned { reason: String },
    /// A container below `WalkOptions::max_depth`; skipped without reading
    /// its children.
    DepthLimited,
}

#[derive(Debug)]
pub struct BoxRef {
    pub hdr: BoxHeader,
    pub kind: NodeKind,
    /// Output of a registered payload decoder, if one ran.
    pub decoded: Option<String>,
}

impl BoxRef {
    pub fn children(&self) -> &[BoxRef] {
        match &self.kind {
            NodeKind::Container(kids) => kids,
            _ => &[],
        }
    }
}
