use crate::boxes::{BoxHeader, FourCC};
use byteorder::{BigEndian, ReadBytesExt};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read};

/// A value returned from a box decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxValue {
    Text(String),
    /// Length of a payload that is not worth keeping.
    Length(u64),
}

impl fmt::Display for BoxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoxValue::Text(s) => f.write_str(s),
            BoxValue::Length(n) => write!(f, "{} bytes", n),
        }
    }
}

/// Payload handler for one box type.
///
/// `r` is bounded to the unread part of the box. Decoders may stop early;
/// the walker realigns the stream afterwards. For FullBoxes the version and
/// flags have already been consumed and are passed in.
pub trait BoxDecoder: Send + Sync {
    fn decode(
        &self,
        r: &mut dyn Read,
        hdr: &BoxHeader,
        version: Option<u8>,
        flags: Option<u32>,
    ) -> anyhow::Result<BoxValue>;
}

/// Registry of decoders keyed by type tag.
///
/// The registry is immutable once constructed; use [`Registry::with_decoder`]
/// to build it fluently.
pub struct Registry {
    map: HashMap<FourCC, BoxDecoderEntry>,
}

struct BoxDecoderEntry {
    inner: Box<dyn BoxDecoder>,
    name: String,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Return a new registry with the given decoder added.
    ///
    /// `name` is human-readable and used only for debugging / logging.
    pub fn with_decoder(mut self, key: FourCC, name: &str, dec: Box<dyn BoxDecoder>) -> Self {
        self.map.insert(
            key,
            BoxDecoderEntry {
                inner: dec,
                name: name.to_string(),
            },
        );
        self
    }

    pub fn contains(&self, key: &FourCC) -> bool {
        self.map.contains_key(key)
    }

    /// Try to decode the payload of a box using a registered decoder.
    ///
    /// Returns `None` if no decoder exists for the given key.
    pub fn decode(
        &self,
        key: &FourCC,
        r: &mut dyn Read,
        hdr: &BoxHeader,
        version: Option<u8>,
        flags: Option<u32>,
    ) -> Option<anyhow::Result<BoxValue>> {
        self.map
            .get(key)
            .map(|d| {
                log::debug!(target: "mp4nav", "decoding '{}' at {:#x} with {}", key, hdr.start, d.name);
                d.inner.decode(r, hdr, version, flags)
            })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------- Helpers ----------

fn lang_from_u16(code: u16) -> String {
    if code == 0 {
        return "und".to_string();
    }
    let c1 = ((code >> 10) & 0x1F) as u8 + 0x60;
    let c2 = ((code >> 5) & 0x1F) as u8 + 0x60;
    let c3 = (code & 0x1F) as u8 + 0x60;
    format!("{}{}{}", c1 as char, c2 as char, c3 as char)
}

/// Timescale and duration from the shared mvhd/mdhd layout. Version 0
/// durations are widened.
fn read_times(r: &mut dyn Read, version: Option<u8>) -> anyhow::Result<(u32, u64)> {
    if version == Some(1) {
        let _creation = r.read_u64::<BigEndian>()?;
        let _modification = r.read_u64::<BigEndian>()?;
        let timescale = r.read_u32::<BigEndian>()?;
        let duration = r.read_u64::<BigEndian>()?;
        Ok((timescale, duration))
    } else {
        let _creation = r.read_u32::<BigEndian>()?;
        let _modification = r.read_u32::<BigEndian>()?;
        let timescale = r.read_u32::<BigEndian>()?;
        let duration = r.read_u32::<BigEndian>()?;
        Ok((timescale, u64::from(duration)))
    }
}

// ---------- Decoders ----------

// ftyp: major + minor + compatible brands
pub struct FtypDecoder;

impl BoxDecoder for FtypDecoder {
    fn decode(
        &self,
        r: &mut dyn Read,
        _hdr: &BoxHeader,
        _version: Option<u8>,
        _flags: Option<u32>,
    ) -> anyhow::Result<BoxValue> {
        let mut buf = Vec::new();
        r.read_to_end(&mut buf)?;
        if buf.len() < 8 {
            return Ok(BoxValue::Text(format!(
                "ftyp: payload too short ({} bytes)",
                buf.len()
            )));
        }

        let major = FourCC([buf[0], buf[1], buf[2], buf[3]]);
        let minor = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let brands: Vec<String> = buf[8..]
            .chunks_exact(4)
            .map(|c| FourCC([c[0], c[1], c[2], c[3]]).to_string())
            .collect();

        Ok(BoxValue::Text(format!(
            "major={} minor={} compatible={:?}",
            major, minor, brands
        )))
    }
}

// mvhd: timescale + duration
pub struct MvhdDecoder;

impl BoxDecoder for MvhdDecoder {
    fn decode(
        &self,
        r: &mut dyn Read,
        _hdr: &BoxHeader,
        version: Option<u8>,
        _flags: Option<u32>,
    ) -> anyhow::Result<BoxValue> {
        // the rest (rate, volume, matrix, next_track_id) is left for the navigator
        let (timescale, duration) = read_times(r, version)?;
        Ok(BoxValue::Text(format!(
            "timescale={} duration={}",
            timescale, duration
        )))
    }
}

// tkhd: track id + duration
pub struct TkhdDecoder;

impl BoxDecoder for TkhdDecoder {
    fn decode(
        &self,
        r: &mut dyn Read,
        _hdr: &BoxHeader,
        version: Option<u8>,
        flags: Option<u32>,
    ) -> anyhow::Result<BoxValue> {
        let (track_id, duration) = if version == Some(1) {
            let _creation = r.read_u64::<BigEndian>()?;
            let _modification = r.read_u64::<BigEndian>()?;
            let track_id = r.read_u32::<BigEndian>()?;
            let _reserved = r.read_u32::<BigEndian>()?;
            (track_id, r.read_u64::<BigEndian>()?)
        } else {
            let _creation = r.read_u32::<BigEndian>()?;
            let _modification = r.read_u32::<BigEndian>()?;
            let track_id = r.read_u32::<BigEndian>()?;
            let _reserved = r.read_u32::<BigEndian>()?;
            (track_id, u64::from(r.read_u32::<BigEndian>()?))
        };
        let enabled = flags.unwrap_or(0) & 1 != 0;

        Ok(BoxValue::Text(format!(
            "track_id={} duration={} enabled={}",
            track_id, duration, enabled
        )))
    }
}

// mdhd: timescale, duration, language
pub struct MdhdDecoder;

impl BoxDecoder for MdhdDecoder {
    fn decode(
        &self,
        r: &mut dyn Read,
        _hdr: &BoxHeader,
        version: Option<u8>,
        _flags: Option<u32>,
    ) -> anyhow::Result<BoxValue> {
        let (timescale, duration) = read_times(r, version)?;
        let language = lang_from_u16(r.read_u16::<BigEndian>()?);

        Ok(BoxValue::Text(format!(
            "timescale={} duration={} language={}",
            timescale, duration, language
        )))
    }
}

// hdlr: handler type + name
pub struct HdlrDecoder;

impl BoxDecoder for HdlrDecoder {
    fn decode(
        &self,
        r: &mut dyn Read,
        _hdr: &BoxHeader,
        _version: Option<u8>,
        _flags: Option<u32>,
    ) -> anyhow::Result<BoxValue> {
        // pre_defined (4 bytes) + handler_type (4 bytes)
        let _pre_defined = r.read_u32::<BigEndian>()?;
        let handler_type = FourCC::from(r.read_u32::<BigEndian>()?);

        // reserved (3 * 4 bytes)
        let mut reserved = [0u8; 12];
        r.read_exact(&mut reserved)?;

        // name: null-terminated string (or just rest of box)
        let mut name_bytes = Vec::new();
        r.read_to_end(&mut name_bytes)?;
        if let Some(nul) = name_bytes.iter().position(|&b| b == 0) {
            name_bytes.truncate(nul);
        }
        let name = String::from_utf8_lossy(&name_bytes);

        Ok(BoxValue::Text(format!(
            "handler={} name={:?}",
            handler_type, name
        )))
    }
}

// free/skip: padding, reported by length only
pub struct PaddingDecoder;

impl BoxDecoder for PaddingDecoder {
    fn decode(
        &self,
        r: &mut dyn Read,
        _hdr: &BoxHeader,
        _version: Option<u8>,
        _flags: Option<u32>,
    ) -> anyhow::Result<BoxValue> {
        // counted, not buffered; reserve areas can be megabytes
        let n = io::copy(r, &mut io::sink())?;
        Ok(BoxValue::Length(n))
    }
}

pub fn default_registry() -> Registry {
    Registry::new()
        .with_decoder(FourCC(*b"ftyp"), "ftyp", Box::new(FtypDecoder))
        .with_decoder(FourCC(*b"mvhd"), "mvhd", Box::new(MvhdDecoder))
        .with_decoder(FourCC(*b"tkhd"), "tkhd", Box::new(TkhdDecoder))
        .with_decoder(FourCC(*b"mdhd"), "mdhd", Box::new(MdhdDecoder))
        .with_decoder(FourCC(*b"hdlr"), "hdlr", Box::new(HdlrDecoder))
        .with_decoder(FourCC(*b"free"), "free", Box::new(PaddingDecoder))
        .with_decoder(FourCC(*b"skip"), "skip", Box::new(PaddingDecoder))
}
