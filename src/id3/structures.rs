use byteorder::{BigEndian, ByteOrder};

use super::synchsafe;

/// ID3v2 major versions understood by this reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagVersion {
    V2_2,
    V2_3,
    V2_4,
}

impl TagVersion {
    /// Classify the leading bytes of a buffer.
    ///
    /// Only a marker at offset 0 counts as a tag; byte 3 must name a
    /// supported major version. The revision byte (4) and flags byte (5)
    /// are not validated. `None` means "no tag", which is a normal outcome,
    /// not an error.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() < 4 || !data.starts_with(TagHeader::SIGNATURE) {
            return None;
        }

        match data[3] {
            2 => Some(TagVersion::V2_2),
            3 => Some(TagVersion::V2_3),
            4 => Some(TagVersion::V2_4),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TagVersion::V2_2 => "ID3v2.2",
            TagVersion::V2_3 => "ID3v2.3",
            TagVersion::V2_4 => "ID3v2.4",
        }
    }
}

/// Outer tag header - 10 bytes at the start of the stream
#[derive(Debug, Clone, Copy)]
pub struct TagHeader {
    pub version: TagVersion,
    /// Synchsafe-decoded size field (bytes 6-9), read as the tag's total
    /// extent measured from the start of the buffer
    pub tag_size: u32,
}

impl TagHeader {
    pub const SIGNATURE: &'static [u8] = b"ID3";
    pub const SIZE: usize = 10;

    /// Parse the fixed header at the start of `data`.
    ///
    /// Returns `None` when there is no usable tag: missing marker,
    /// unsupported major version, or a buffer too short to carry the
    /// 10-byte header.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let version = TagVersion::detect(data)?;
        if data.len() < Self::SIZE {
            return None;
        }

        let tag_size = synchsafe::decode(BigEndian::read_u32(&data[6..10]));
        Some(Self { version, tag_size })
    }
}

/// Per-version frame header geometry.
///
/// v2.2 frames carry a 3-character id and a 3-byte size; v2.3 and v2.4
/// carry a 4-character id, a 4-byte size, and two flag bytes this reader
/// ignores. The size word is always read as 4 big-endian bytes at
/// `size_offset` and then masked, so the v2.2 read covers the last id byte
/// plus its 3 size bytes and masks the id byte away. v2.4 sizes are
/// additionally synchsafe.
#[derive(Debug, Clone, Copy)]
pub struct FrameLayout {
    /// Frame id length in bytes
    pub id_len: usize,
    /// Full frame header length in bytes
    pub header_len: usize,
    /// Offset of the 4-byte size word within the frame
    pub size_offset: usize,
    /// Mask applied to the size word
    pub size_mask: u32,
    /// Whether the masked size is synchsafe-encoded
    pub size_synchsafe: bool,
}

impl FrameLayout {
    pub const fn for_version(version: TagVersion) -> Self {
        match version {
            TagVersion::V2_2 => FrameLayout {
                id_len: 3,
                header_len: 6,
                size_offset: 2,
                size_mask: 0x00FF_FFFF,
                size_synchsafe: false,
            },
            TagVersion::V2_3 => FrameLayout {
                id_len: 4,
                header_len: 10,
                size_offset: 4,
                size_mask: 0xFFFF_FFFF,
                size_synchsafe: false,
            },
            TagVersion::V2_4 => FrameLayout {
                id_len: 4,
                header_len: 10,
                size_offset: 4,
                size_mask: 0xFFFF_FFFF,
                size_synchsafe: true,
            },
        }
    }
}

/// A single raw frame borrowed from the tag body, header included.
///
/// Valid only for the lifetime of the source buffer; decoded values are
/// copied out before they outlive it.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    pub(crate) bytes: &'a [u8],
    pub(crate) version: TagVersion,
}

impl<'a> RawFrame<'a> {
    /// Frame id with trailing NUL padding stripped.
    ///
    /// Empty for padding pseudo-frames.
    pub fn id(&self) -> &'a [u8] {
        let layout = FrameLayout::for_version(self.version);
        let id = &self.bytes[..layout.id_len];
        match id.iter().position(|&b| b == 0) {
            Some(n) => &id[..n],
            None => id,
        }
    }

    /// Frame payload (everything after the header).
    pub fn payload(&self) -> &'a [u8] {
        let layout = FrameLayout::for_version(self.version);
        &self.bytes[layout.header_len..]
    }

    /// Total frame length, header included.
    pub fn total_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn version(&self) -> TagVersion {
        self.version
    }
}

/// Named text fields a frame id can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    Date,
    Track,
    Disc,
    Description,
    Language,
    Copyright,
    Publisher,
    Encoder,
}

impl TextField {
    /// Map a frame id to its field.
    ///
    /// One table serves every version: 3-character v2.2 ids and 4-character
    /// v2.3/v2.4 ids are disjoint byte strings. Unknown ids map to `None`
    /// and the frame contributes nothing.
    pub fn for_id(id: &[u8]) -> Option<Self> {
        match id {
            b"TIT2" | b"TT2" => Some(TextField::Title),
            b"TPE1" | b"TP1" => Some(TextField::Artist),
            b"TALB" | b"TAL" => Some(TextField::Album),
            b"TPE2" | b"TP2" => Some(TextField::AlbumArtist),
            b"TCON" | b"TCO" => Some(TextField::Genre),
            b"TDRC" | b"TYER" | b"TYE" => Some(TextField::Date),
            b"TRCK" | b"TRK" => Some(TextField::Track),
            b"TPOS" | b"TPA" => Some(TextField::Disc),
            b"TIT3" | b"TT3" => Some(TextField::Description),
            b"TLAN" | b"TLA" => Some(TextField::Language),
            b"TCOP" | b"TCR" => Some(TextField::Copyright),
            b"TPUB" | b"TPB" => Some(TextField::Publisher),
            b"TENC" | b"TEN" => Some(TextField::Encoder),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Artist => "artist",
            TextField::Album => "album",
            TextField::AlbumArtist => "album artist",
            TextField::Genre => "genre",
            TextField::Date => "date",
            TextField::Track => "track",
            TextField::Disc => "disc",
            TextField::Description => "description",
            TextField::Language => "language",
            TextField::Copyright => "copyright",
            TextField::Publisher => "publisher",
            TextField::Encoder => "encoder",
        }
    }
}

/// Picture frame ids: `APIC` for v2.3/v2.4, `PIC` for v2.2
pub fn is_picture_id(id: &[u8]) -> bool {
    id == b"APIC" || id == b"PIC"
}

/// Embedded artwork format, detected by magic number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

/// Embedded artwork: raw image bytes plus the detected format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub data: Vec<u8>,
    pub format: ImageFormat,
}

/// One successfully decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedField {
    Text(TextField, String),
    Picture(Picture),
}

/// Coarse frame classification for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Picture,
    Unknown,
}

impl FrameKind {
    pub fn for_id(id: &[u8]) -> Self {
        if is_picture_id(id) {
            FrameKind::Picture
        } else if TextField::for_id(id).is_some() {
            FrameKind::Text
        } else {
            FrameKind::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FrameKind::Text => "text",
            FrameKind::Picture => "picture",
            FrameKind::Unknown => "-",
        }
    }
}

/// Owned frame listing entry
#[derive(Debug, Clone)]
pub struct FrameInfo {
    /// Frame id rendered as text
    pub id: String,
    /// Payload length in bytes, header excluded
    pub size: u64,
    /// Full frame length in bytes, header included
    pub total: u64,
    /// Coarse classification
    pub kind: FrameKind,
}

/// Decoded tag metadata.
///
/// Every field stays `None` when the tag carries no usable frame for it; a
/// record with only `version` set is still a valid result and distinct from
/// "no tag found".
#[derive(Debug, Clone)]
pub struct Metadata {
    /// Tag version the fields were decoded from
    pub version: TagVersion,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,
    pub track: Option<String>,
    pub disc: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub copyright: Option<String>,
    pub publisher: Option<String>,
    pub encoder: Option<String>,
    pub picture: Option<Picture>,
}

impl Metadata {
    /// Empty record for a detected tag.
    pub fn new(version: TagVersion) -> Self {
        Self {
            version,
            title: None,
            artist: None,
            album: None,
            album_artist: None,
            genre: None,
            date: None,
            track: None,
            disc: None,
            description: None,
            language: None,
            copyright: None,
            publisher: None,
            encoder: None,
            picture: None,
        }
    }

    /// Store one decoded frame.
    ///
    /// Later frames overwrite earlier ones that map to the same field
    /// (last writer wins, in tag byte order).
    pub fn assign(&mut self, field: DecodedField) {
        match field {
            DecodedField::Text(kind, value) => {
                let slot = match kind {
                    TextField::Title => &mut self.title,
                    TextField::Artist => &mut self.artist,
                    TextField::Album => &mut self.album,
                    TextField::AlbumArtist => &mut self.album_artist,
                    TextField::Genre => &mut self.genre,
                    TextField::Date => &mut self.date,
                    TextField::Track => &mut self.track,
                    TextField::Disc => &mut self.disc,
                    TextField::Description => &mut self.description,
                    TextField::Language => &mut self.language,
                    TextField::Copyright => &mut self.copyright,
                    TextField::Publisher => &mut self.publisher,
                    TextField::Encoder => &mut self.encoder,
                };
                *slot = Some(value);
            }
            DecodedField::Picture(picture) => self.picture = Some(picture),
        }
    }

    /// All text fields in display order, present or not.
    pub fn fields(&self) -> [(TextField, Option<&str>); 13] {
        [
            (TextField::Title, self.title.as_deref()),
            (TextField::Artist, self.artist.as_deref()),
            (TextField::Album, self.album.as_deref()),
            (TextField::AlbumArtist, self.album_artist.as_deref()),
            (TextField::Genre, self.genre.as_deref()),
            (TextField::Date, self.date.as_deref()),
            (TextField::Track, self.track.as_deref()),
            (TextField::Disc, self.disc.as_deref()),
            (TextField::Description, self.description.as_deref()),
            (TextField::Language, self.language.as_deref()),
            (TextField::Copyright, self.copyright.as_deref()),
            (TextField::Publisher, self.publisher.as_deref()),
            (TextField::Encoder, self.encoder.as_deref()),
        ]
    }
}
