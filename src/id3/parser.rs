//! Tag body parsing.
//!
//! The walker steps the frame sequence that begins right after the 10-byte
//! tag header and ends at the header's decoded size field, treated as the
//! tag's total extent within the buffer. Walking is forgiving: a frame that
//! fails to decode is skipped, a frame that overruns the available bytes
//! ends the walk, and whatever decoded before the damage is kept.

use byteorder::{BigEndian, ByteOrder};

use super::structures::{
    DecodedField, FrameLayout, ImageFormat, Metadata, Picture, RawFrame, TagHeader, TagVersion,
    TextField, is_picture_id,
};
use super::synchsafe;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];

/// Decode every recognized frame in `data` into one metadata record.
///
/// `data` is the file prefix starting at offset 0. Returns `None` when no
/// supported tag header is present; otherwise always returns a record, even
/// if every frame was damaged or unrecognized.
pub fn parse_metadata(data: &[u8]) -> Option<Metadata> {
    let header = TagHeader::from_bytes(data)?;
    let mut metadata = Metadata::new(header.version);

    for frame in FrameWalker::new(data, &header) {
        if let Some(field) = decode_frame(&frame) {
            metadata.assign(field);
        }
    }

    Some(metadata)
}

/// Iterator over the raw frames of one tag.
///
/// Yields each frame as a borrowed slice, header included. Stops at the tag
/// extent, at the end of the buffer, or at the first zero-size frame
/// (padding). Never panics on hostile size fields.
pub struct FrameWalker<'a> {
    data: &'a [u8],
    version: TagVersion,
    layout: FrameLayout,
    cursor: usize,
    end: usize,
}

impl<'a> FrameWalker<'a> {
    pub fn new(data: &'a [u8], header: &TagHeader) -> Self {
        // The size field counts the whole tag, so it doubles as the end
        // offset. A short buffer clamps the walk rather than failing it.
        let end = (header.tag_size as usize).min(data.len());
        Self {
            data,
            version: header.version,
            layout: FrameLayout::for_version(header.version),
            cursor: TagHeader::SIZE,
            end,
        }
    }

    /// Payload length of the frame at the cursor, or `None` when there is
    /// no room left for a full frame header.
    fn payload_len_at(&self) -> Option<u32> {
        let header_end = self.cursor.checked_add(self.layout.header_len)?;
        if header_end > self.end {
            return None;
        }

        let word = BigEndian::read_u32(&self.data[self.cursor + self.layout.size_offset..]);
        let masked = word & self.layout.size_mask;
        if self.layout.size_synchsafe {
            Some(synchsafe::decode(masked))
        } else {
            Some(masked)
        }
    }
}

impl<'a> Iterator for FrameWalker<'a> {
    type Item = RawFrame<'a>;

    fn next(&mut self) -> Option<RawFrame<'a>> {
        let payload_len = self.payload_len_at()?;
        if payload_len == 0 {
            // Zero-size frame: either padding or a corrupt header. Nothing
            // past this point can be trusted.
            return None;
        }

        // Hostile size fields can approach u32::MAX; the sum must not wrap.
        let frame_end = self.cursor as u64 + self.layout.header_len as u64 + payload_len as u64;
        if frame_end > self.end as u64 {
            return None;
        }
        let frame_end = frame_end as usize;

        let frame = RawFrame {
            bytes: &self.data[self.cursor..frame_end],
            version: self.version,
        };
        self.cursor = frame_end;
        Some(frame)
    }
}

/// Decode one raw frame into a field, or `None` when the frame is
/// unrecognized or its payload is damaged.
pub fn decode_frame(frame: &RawFrame) -> Option<DecodedField> {
    let id = frame.id();
    if id.is_empty() {
        return None;
    }

    if is_picture_id(id) {
        return decode_picture(frame.payload()).map(DecodedField::Picture);
    }

    let field = TextField::for_id(id)?;
    let text = decode_text(frame.payload(), frame.version())?;
    Some(DecodedField::Text(field, text))
}

/// Extract embedded artwork from a picture frame payload.
///
/// The image is located by magic number rather than by stepping the frame's
/// MIME/description preamble, which varies across versions and is often
/// written loosely. JPEG is probed first; a PNG match only counts when no
/// JPEG signature appears anywhere in the payload. The image runs from the
/// magic to the end of the frame.
fn decode_picture(payload: &[u8]) -> Option<Picture> {
    for (magic, format) in [(JPEG_MAGIC, ImageFormat::Jpeg), (PNG_MAGIC, ImageFormat::Png)] {
        if let Some(pos) = payload.windows(magic.len()).position(|w| w == magic) {
            return Some(Picture {
                data: payload[pos..].to_vec(),
                format,
            });
        }
    }
    None
}

/// Decode a text frame payload: one encoding selector byte, then the text.
///
/// Selector 0x00 is Latin-1, 0x01 is UTF-16 with optional BOM, and 0x03 is
/// UTF-8 (v2.4 only). Unrecognized selectors fall back to Latin-1, which
/// cannot fail, so a stray selector yields mojibake instead of dropping the
/// frame. Malformed UTF-8/UTF-16 drops the frame.
fn decode_text(payload: &[u8], version: TagVersion) -> Option<String> {
    let (selector, text) = payload.split_first()?;

    let decoded = match (version, *selector) {
        (TagVersion::V2_4, 0x03) => String::from_utf8(text.to_vec()).ok()?,
        (_, 0x01) => decode_utf16(text)?,
        _ => decode_latin1(text),
    };

    Some(trim_nul(&decoded))
}

/// UTF-16 with BOM detection. A leading FF FE selects little-endian, FE FF
/// big-endian; without a BOM the stream is read big-endian. An odd trailing
/// byte is dropped. Unpaired surrogates fail the whole frame.
fn decode_utf16(data: &[u8]) -> Option<String> {
    let (big_endian, body) = match data {
        [0xFF, 0xFE, rest @ ..] => (false, rest),
        [0xFE, 0xFF, rest @ ..] => (true, rest),
        _ => (true, data),
    };

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if big_endian {
                BigEndian::read_u16(pair)
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16(&units).ok()
}

/// Latin-1: every byte is its own code point, so decoding is total.
fn decode_latin1(data: &[u8]) -> String {
    data.iter().map(|&b| char::from(b)).collect()
}

/// Strip NUL terminators and NUL padding from both ends. Interior NULs are
/// kept as-is.
fn trim_nul(text: &str) -> String {
    text.trim_matches('\0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v23_header(tag_size: u32) -> TagHeader {
        TagHeader {
            version: TagVersion::V2_3,
            tag_size,
        }
    }

    fn v23_frame(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::new();
        frame.extend_from_slice(id);
        frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(&[0, 0]);
        frame.extend_from_slice(payload);
        frame
    }

    fn tag_v23(frames: &[Vec<u8>]) -> Vec<u8> {
        let mut body = Vec::new();
        for frame in frames {
            body.extend_from_slice(frame);
        }
        let mut data = b"ID3\x03\x00\x00\x00\x00\x00\x00".to_vec();
        let total = (TagHeader::SIZE + body.len()) as u32;
        data[6] = ((total >> 21) & 0x7F) as u8;
        data[7] = ((total >> 14) & 0x7F) as u8;
        data[8] = ((total >> 7) & 0x7F) as u8;
        data[9] = (total & 0x7F) as u8;
        data.extend_from_slice(&body);
        data
    }

    #[test]
    fn walker_yields_consecutive_frames() {
        let data = tag_v23(&[
            v23_frame(b"TIT2", b"\x00Song"),
            v23_frame(b"TPE1", b"\x00Band"),
        ]);
        let header = TagHeader::from_bytes(&data).unwrap();

        let ids: Vec<&[u8]> = FrameWalker::new(&data, &header).map(|f| f.id()).collect();
        assert_eq!(ids, [b"TIT2".as_slice(), b"TPE1".as_slice()]);
    }

    #[test]
    fn walker_is_restartable() {
        let data = tag_v23(&[v23_frame(b"TIT2", b"\x00Song")]);
        let header = TagHeader::from_bytes(&data).unwrap();

        assert_eq!(FrameWalker::new(&data, &header).count(), 1);
        assert_eq!(FrameWalker::new(&data, &header).count(), 1);
    }

    #[test]
    fn walker_stops_at_zero_size_frame() {
        let mut frames = vec![v23_frame(b"TIT2", b"\x00Song")];
        frames.push(vec![0u8; 10]);
        frames.push(v23_frame(b"TPE1", b"\x00Band"));
        let data = tag_v23(&frames);
        let header = TagHeader::from_bytes(&data).unwrap();

        // The valid frame after the padding block is unreachable.
        assert_eq!(FrameWalker::new(&data, &header).count(), 1);
    }

    #[test]
    fn walker_stops_when_frame_overruns_extent() {
        let mut data = tag_v23(&[v23_frame(b"TIT2", b"\x00Song")]);
        // Inflate the first frame's size field past the tag end.
        data[14] = 0xFF;
        let header = TagHeader::from_bytes(&data).unwrap();

        assert_eq!(FrameWalker::new(&data, &header).count(), 0);
    }

    #[test]
    fn walker_survives_hostile_size_field() {
        let mut data = tag_v23(&[v23_frame(b"TIT2", b"\x00Song")]);
        for b in &mut data[14..18] {
            *b = 0xFF;
        }
        let header = TagHeader::from_bytes(&data).unwrap();

        assert_eq!(FrameWalker::new(&data, &header).count(), 0);
    }

    #[test]
    fn walker_clamps_to_short_buffer() {
        let data = tag_v23(&[
            v23_frame(b"TIT2", b"\x00Song"),
            v23_frame(b"TPE1", b"\x00Band"),
        ]);
        let header = TagHeader::from_bytes(&data).unwrap();
        // Drop the second frame's tail; the first must still come through.
        let cut = &data[..data.len() - 4];

        let ids: Vec<&[u8]> = FrameWalker::new(cut, &header).map(|f| f.id()).collect();
        assert_eq!(ids, [b"TIT2".as_slice()]);
    }

    #[test]
    fn walker_respects_extent_over_buffer_len() {
        // Wire size covers only the first frame; the second sits past the
        // declared extent and must not be yielded.
        let first = v23_frame(b"TIT2", b"\x00Song");
        let second = v23_frame(b"TPE1", b"\x00Band");
        let mut data = tag_v23(&[first.clone()]);
        data.extend_from_slice(&second);
        let header = TagHeader::from_bytes(&data).unwrap();

        let ids: Vec<&[u8]> = FrameWalker::new(&data, &header).map(|f| f.id()).collect();
        assert_eq!(ids, [b"TIT2".as_slice()]);
    }

    #[test]
    fn header_only_tag_has_no_frames() {
        let data = tag_v23(&[]);
        let header = TagHeader::from_bytes(&data).unwrap();
        assert_eq!(FrameWalker::new(&data, &header).count(), 0);
    }

    #[test]
    fn decode_latin1_text() {
        let payload = b"\x00Caf\xE9\x00";
        assert_eq!(
            decode_text(payload, TagVersion::V2_3).as_deref(),
            Some("Café")
        );
    }

    #[test]
    fn decode_utf8_only_in_v24() {
        let payload = "\u{03}Café".as_bytes();
        assert_eq!(
            decode_text(payload, TagVersion::V2_4).as_deref(),
            Some("Café")
        );
        // In v2.3 selector 0x03 falls back to Latin-1 and the UTF-8 bytes
        // come through as two code points.
        assert_eq!(
            decode_text(payload, TagVersion::V2_3).as_deref(),
            Some("Caf\u{C3}\u{A9}")
        );
    }

    #[test]
    fn invalid_utf8_drops_the_frame() {
        let payload = b"\x03\xFF\xFEbad";
        assert_eq!(decode_text(payload, TagVersion::V2_4), None);
    }

    #[test]
    fn decode_utf16_little_endian_bom() {
        let payload = b"\x01\xFF\xFEH\x00i\x00";
        assert_eq!(decode_text(payload, TagVersion::V2_3).as_deref(), Some("Hi"));
    }

    #[test]
    fn decode_utf16_big_endian_bom() {
        let payload = b"\x01\xFE\xFF\x00H\x00i";
        assert_eq!(decode_text(payload, TagVersion::V2_3).as_deref(), Some("Hi"));
    }

    #[test]
    fn decode_utf16_without_bom_is_big_endian() {
        let payload = b"\x01\x00H\x00i";
        assert_eq!(decode_text(payload, TagVersion::V2_3).as_deref(), Some("Hi"));
    }

    #[test]
    fn utf16_odd_tail_byte_is_dropped() {
        let payload = b"\x01\xFF\xFEH\x00i";
        assert_eq!(decode_text(payload, TagVersion::V2_3).as_deref(), Some("H"));
    }

    #[test]
    fn utf16_unpaired_surrogate_drops_the_frame() {
        let payload = b"\x01\xFE\xFF\xD8\x00";
        assert_eq!(decode_text(payload, TagVersion::V2_3), None);
    }

    #[test]
    fn unknown_selector_falls_back_to_latin1() {
        let payload = b"\x07Caf\xE9";
        assert_eq!(
            decode_text(payload, TagVersion::V2_4).as_deref(),
            Some("Café")
        );
    }

    #[test]
    fn empty_payload_drops_the_frame() {
        assert_eq!(decode_text(b"", TagVersion::V2_3), None);
    }

    #[test]
    fn selector_only_payload_is_empty_text() {
        assert_eq!(decode_text(b"\x00", TagVersion::V2_3).as_deref(), Some(""));
    }

    #[test]
    fn nul_padding_is_trimmed_at_both_ends() {
        let payload = b"\x00\x00Song\x00\x00";
        assert_eq!(
            decode_text(payload, TagVersion::V2_3).as_deref(),
            Some("Song")
        );
    }

    #[test]
    fn interior_nul_is_kept() {
        let payload = b"\x00A\x00B";
        assert_eq!(
            decode_text(payload, TagVersion::V2_3).as_deref(),
            Some("A\0B")
        );
    }

    #[test]
    fn picture_jpeg_after_preamble() {
        let mut payload = b"\x00image/jpeg\x00\x03desc\x00".to_vec();
        payload.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3]);
        let picture = decode_picture(&payload).unwrap();
        assert_eq!(picture.format, ImageFormat::Jpeg);
        assert_eq!(picture.data, [0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3]);
    }

    #[test]
    fn picture_png() {
        let mut payload = b"\x00image/png\x00\x03\x00".to_vec();
        payload.extend_from_slice(&[0x89, 0x50, 0x4E, 0x47, 9, 9]);
        let picture = decode_picture(&payload).unwrap();
        assert_eq!(picture.format, ImageFormat::Png);
        assert_eq!(picture.data[..4], [0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn picture_jpeg_wins_even_after_a_png_magic() {
        // A PNG signature inside the description must not shadow the real
        // JPEG image that follows it.
        let mut payload = b"\x00image/jpeg\x00\x03".to_vec();
        payload.extend_from_slice(&[0x89, 0x50, 0x4E, 0x47]);
        payload.push(0);
        payload.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0, 7]);
        let picture = decode_picture(&payload).unwrap();
        assert_eq!(picture.format, ImageFormat::Jpeg);
        assert_eq!(picture.data, [0xFF, 0xD8, 0xFF, 0xE0, 7]);
    }

    #[test]
    fn picture_without_magic_is_dropped() {
        assert_eq!(decode_picture(b"\x00image/bmp\x00\x03\x00BM??"), None);
    }

    #[test]
    fn parse_assembles_all_fields() {
        let data = tag_v23(&[
            v23_frame(b"TIT2", b"\x00Song\x00"),
            v23_frame(b"TPE1", b"\x00Band"),
            v23_frame(b"TYER", b"\x001999"),
        ]);
        let metadata = parse_metadata(&data).unwrap();
        assert_eq!(metadata.version, TagVersion::V2_3);
        assert_eq!(metadata.title.as_deref(), Some("Song"));
        assert_eq!(metadata.artist.as_deref(), Some("Band"));
        assert_eq!(metadata.date.as_deref(), Some("1999"));
        assert_eq!(metadata.album, None);
    }

    #[test]
    fn parse_skips_unknown_frames() {
        let data = tag_v23(&[
            v23_frame(b"PRIV", b"owner\x00blob"),
            v23_frame(b"TIT2", b"\x00Song"),
        ]);
        let metadata = parse_metadata(&data).unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Song"));
    }

    #[test]
    fn parse_without_tag_is_none() {
        assert!(parse_metadata(b"\xFF\xFB\x90\x00 not a tag").is_none());
        assert!(parse_metadata(b"").is_none());
    }
}
