mod http;
mod local;

pub use http::HttpRangeReader;
pub use local::LocalFileReader;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for reading a prefix of a data source.
///
/// ID3v2 tags live at the very start of the stream, so every source only
/// needs to serve "the first `len` bytes" plus its total size.
#[async_trait]
pub trait ReadPrefix: Send + Sync {
    /// Read up to `len` bytes from the start of the source.
    ///
    /// The result is shorter than `len` only when the source itself is.
    async fn read_prefix(&self, len: usize) -> Result<Vec<u8>>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}
