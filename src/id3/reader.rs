use std::sync::Arc;

use anyhow::Result;

use super::parser::{FrameWalker, decode_frame, parse_metadata};
use super::structures::{DecodedField, FrameInfo, FrameKind, Metadata, Picture, TagHeader};
use crate::io::ReadPrefix;

/// High-level tag reader over any prefix source.
///
/// Fetches the 10-byte header first, then exactly the bytes the header's
/// size field covers. Over HTTP this keeps the transfer to the tag itself
/// instead of the whole file.
pub struct TagReader<R: ReadPrefix> {
    source: Arc<R>,
}

impl<R: ReadPrefix> TagReader<R> {
    pub fn new(source: Arc<R>) -> Self {
        Self { source }
    }

    /// Decode the tag into a metadata record.
    ///
    /// `Ok(None)` means the source carries no supported tag, which is the
    /// normal case for untagged files. I/O failures are errors.
    pub async fn read_metadata(&self) -> Result<Option<Metadata>> {
        let Some((_, data)) = self.fetch_tag().await? else {
            return Ok(None);
        };
        Ok(parse_metadata(&data))
    }

    /// Walk the tag and report each raw frame without decoding payloads.
    ///
    /// The empty vec covers both "no tag" and "tag with no frames"; use
    /// [`read_header`](Self::read_header) to tell them apart.
    pub async fn list_frames(&self) -> Result<Vec<FrameInfo>> {
        let Some((header, data)) = self.fetch_tag().await? else {
            return Ok(Vec::new());
        };

        let frames = FrameWalker::new(&data, &header)
            .map(|frame| FrameInfo {
                id: frame.id().iter().map(|&b| char::from(b)).collect(),
                size: frame.payload().len() as u64,
                total: frame.total_len() as u64,
                kind: FrameKind::for_id(frame.id()),
            })
            .collect();
        Ok(frames)
    }

    /// Extract the embedded artwork, if any frame carries one.
    ///
    /// When several frames carry artwork the last one wins, matching the
    /// picture [`read_metadata`](Self::read_metadata) reports.
    pub async fn read_picture(&self) -> Result<Option<Picture>> {
        let Some((header, data)) = self.fetch_tag().await? else {
            return Ok(None);
        };

        let mut picture = None;
        for frame in FrameWalker::new(&data, &header) {
            if let Some(DecodedField::Picture(found)) = decode_frame(&frame) {
                picture = Some(found);
            }
        }
        Ok(picture)
    }

    /// Read just the outer header.
    pub async fn read_header(&self) -> Result<Option<TagHeader>> {
        let prefix = self.source.read_prefix(TagHeader::SIZE).await?;
        Ok(TagHeader::from_bytes(&prefix))
    }

    /// Fetch the header plus the full tag extent.
    ///
    /// The second fetch re-reads from offset 0 so the returned buffer lines
    /// up with tag offsets. Sources shorter than the declared extent yield
    /// a short buffer; the walker clamps to it.
    async fn fetch_tag(&self) -> Result<Option<(TagHeader, Vec<u8>)>> {
        let prefix = self.source.read_prefix(TagHeader::SIZE).await?;
        let Some(header) = TagHeader::from_bytes(&prefix) else {
            return Ok(None);
        };

        let want = (header.tag_size as u64).min(self.source.size()) as usize;
        let data = self.source.read_prefix(want.max(TagHeader::SIZE)).await?;
        Ok(Some((header, data)))
    }
}
