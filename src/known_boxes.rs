use crate::boxes::FourCC;

/// Typed view over the box types the walker understands structurally.
///
/// Anything not in this list becomes `KnownBox::Unknown(fourcc)` and is
/// routed to the unknown-box handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownBox {
    // File-level / top-level
    Ftyp,
    Moov,
    Mdat,
    Free,
    Skip,
    Wide,
    Meta,
    Sidx,
    Styp,
    Moof,
    Mfra,

    // moov / trak
    Mvhd,
    Trak,
    Tkhd,
    Tref,
    Edts,
    Elst,
    Mdia,
    Mvex,
    Trex,
    Udta,

    // mdia / minf
    Mdhd,
    Hdlr,
    Minf,
    Vmhd,
    Smhd,
    Nmhd,
    Gmhd,
    Dinf,
    Dref,

    // stbl
    Stbl,
    Stsd,
    Stts,
    Ctts,
    Stsc,
    Stsz,
    Stco,
    Co64,
    Stss,
    Sdtp,

    // fragments
    Mfhd,
    Traf,
    Tfhd,
    Tfdt,
    Trun,
    Mfro,

    // metadata
    Ilst,

    // Anything else
    Unknown(FourCC),
}

impl From<FourCC> for KnownBox {
    fn from(cc: FourCC) -> Self {
        match &cc.0 {
            b"ftyp" => KnownBox::Ftyp,
            b"moov" => KnownBox::Moov,
            b"mdat" => KnownBox::Mdat,
            b"free" => KnownBox::Free,
            b"skip" => KnownBox::Skip,
            b"wide" => KnownBox::Wide,
            b"meta" => KnownBox::Meta,
            b"sidx" => KnownBox::Sidx,
            b"styp" => KnownBox::Styp,
            b"moof" => KnownBox::Moof,
            b"mfra" => KnownBox::Mfra,

            b"mvhd" => KnownBox::Mvhd,
            b"trak" => KnownBox::Trak,
            b"tkhd" => KnownBox::Tkhd,
            b"tref" => KnownBox::Tref,
            b"edts" => KnownBox::Edts,
            b"elst" => KnownBox::Elst,
            b"mdia" => KnownBox::Mdia,
            b"mvex" => KnownBox::Mvex,
            b"trex" => KnownBox::Trex,
            b"udta" => KnownBox::Udta,

            b"mdhd" => KnownBox::Mdhd,
            b"hdlr" => KnownBox::Hdlr,
            b"minf" => KnownBox::Minf,
            b"vmhd" => KnownBox::Vmhd,
            b"smhd" => KnownBox::Smhd,
            b"nmhd" => KnownBox::Nmhd,
            b"gmhd" => KnownBox::Gmhd,
            b"dinf" => KnownBox::Dinf,
            b"dref" => KnownBox::Dref,

            b"stbl" => KnownBox::Stbl,
            b"stsd" => KnownBox::Stsd,
            b"stts" => KnownBox::Stts,
            b"ctts" => KnownBox::Ctts,
            b"stsc" => KnownBox::Stsc,
            b"stsz" => KnownBox::Stsz,
            b"stco" => KnownBox::Stco,
            b"co64" => KnownBox::Co64,
            b"stss" => KnownBox::Stss,
            b"sdtp" => KnownBox::Sdtp,

            b"mfhd" => KnownBox::Mfhd,
            b"traf" => KnownBox::Traf,
            b"tfhd" => KnownBox::Tfhd,
            b"tfdt" => KnownBox::Tfdt,
            b"trun" => KnownBox::Trun,
            b"mfro" => KnownBox::Mfro,

            b"ilst" => KnownBox::Ilst,

            _ => KnownBox::Unknown(cc),
        }
    }
}

impl KnownBox {
    /// Does this box *contain* child boxes (container semantics)?
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            KnownBox::Moov
                | KnownBox::Trak
                | KnownBox::Edts
                | KnownBox::Mdia
                | KnownBox::Minf
                | KnownBox::Dinf
                | KnownBox::Stbl
                | KnownBox::Udta
                | KnownBox::Meta
                | KnownBox::Mvex
                | KnownBox::Moof
                | KnownBox::Traf
                | KnownBox::Mfra
                | KnownBox::Gmhd
                | KnownBox::Ilst
        )
    }

    /// Is this a FullBox (version + flags)?
    pub fn is_full_box(&self) -> bool {
        matches!(
            self,
            KnownBox::Mvhd
                | KnownBox::Tkhd
                | KnownBox::Elst
                | KnownBox::Trex
                | KnownBox::Mdhd
                | KnownBox::Hdlr
                | KnownBox::Vmhd
                | KnownBox::Smhd
                | KnownBox::Nmhd
                | KnownBox::Dref
                | KnownBox::Stsd
                | KnownBox::Stts
                | KnownBox::Ctts
                | KnownBox::Stsc
                | KnownBox::Stsz
                | KnownBox::Stco
                | KnownBox::Co64
                | KnownBox::Stss
                | KnownBox::Sdtp
                | KnownBox::Sidx
                | KnownBox::Mfhd
                | KnownBox::Tfhd
                | KnownBox::Tfdt
                | KnownBox::Trun
                | KnownBox::Mfro
        )
    }

    /// Bytes between a container's header and its first child.
    pub fn children_offset(&self) -> u64 {
        match self {
            // version + flags
            KnownBox::Meta => 4,
            _ => 0,
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            KnownBox::Ftyp => "File Type Box",
            KnownBox::Moov => "Movie Box",
            KnownBox::Mdat => "Media Data Box",
            KnownBox::Free => "Free Space Box",
            KnownBox::Skip => "Skip Box",
            KnownBox::Wide => "Wide Box",
            KnownBox::Meta => "Meta Box",
            KnownBox::Sidx => "Segment Index Box",
            KnownBox::Styp => "Segment Type Box",
            KnownBox::Moof => "Movie Fragment Box",
            KnownBox::Mfra => "Movie Fragment Random Access Box",

            KnownBox::Mvhd => "Movie Header Box",
            KnownBox::Trak => "Track Box",
            KnownBox::Tkhd => "Track Header Box",
            KnownBox::Tref => "Track Reference Box",
            KnownBox::Edts => "Edit Box",
            KnownBox::Elst => "Edit List Box",
            KnownBox::Mdia => "Media Box",
            KnownBox::Mvex => "Movie Extends Box",
            KnownBox::Trex => "Track Extends Box",
            KnownBox::Udta => "User Data Box",

            KnownBox::Mdhd => "Media Header Box",
            KnownBox::Hdlr => "Handler Reference Box",
            KnownBox::Minf => "Media Information Box",
            KnownBox::Vmhd => "Video Media Header Box",
            KnownBox::Smhd => "Sound Media Header Box",
            KnownBox::Nmhd => "Null Media Header Box",
            KnownBox::Gmhd => "Base Media Information Header Box",
            KnownBox::Dinf => "Data Information Box",
            KnownBox::Dref => "Data Reference Box",

            KnownBox::Stbl => "Sample Table Box",
            KnownBox::Stsd => "Sample Description Box",
            KnownBox::Stts => "Decoding Time to Sample Box",
            KnownBox::Ctts => "Composition Time to Sample Box",
            KnownBox::Stsc => "Sample To Chunk Box",
            KnownBox::Stsz => "Sample Size Box",
            KnownBox::Stco => "Chunk Offset Box",
            KnownBox::Co64 => "64-bit Chunk Offset Box",
            KnownBox::Stss => "Sync Sample Box",
            KnownBox::Sdtp => "Independent and Disposable Samples Box",

            KnownBox::Mfhd => "Movie Fragment Header Box",
            KnownBox::Traf => "Track Fragment Box",
            KnownBox::Tfhd => "Track Fragment Header Box",
            KnownBox::Tfdt => "Track Fragment Decode Time Box",
            KnownBox::Trun => "Track Run Box",
            KnownBox::Mfro => "Movie Fragment Random Access Offset Box",

            KnownBox::Ilst => "Metadata Item List Box",

            KnownBox::Unknown(_) => "Unknown Box",
        }
    }
}
