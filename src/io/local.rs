use super::ReadPrefix;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Local file reader serving prefix reads
pub struct LocalFileReader {
    file: std::fs::File,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

#[async_trait]
impl ReadPrefix for LocalFileReader {
    async fn read_prefix(&self, len: usize) -> Result<Vec<u8>> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;

            // pread leaves the shared handle's cursor alone, so repeated
            // prefix reads never interfere with each other.
            let mut buf = vec![0u8; len];
            let mut filled = 0;
            while filled < len {
                let n = self.file.read_at(&mut buf[filled..], filled as u64)?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            buf.truncate(filled);
            Ok(buf)
        }

        #[cfg(not(unix))]
        {
            use std::io::{Read, Seek, SeekFrom};

            // No pread here; &File shares one cursor, so rewind before
            // every read.
            let mut file = &self.file;
            file.seek(SeekFrom::Start(0))?;
            let mut buf = Vec::with_capacity(len);
            file.take(len as u64).read_to_end(&mut buf)?;
            Ok(buf)
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}
