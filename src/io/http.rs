use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::ReadPrefix;
use anyhow::{anyhow, bail, Result};

/// HTTP Range reader for remote audio files
#[derive(Debug)]
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
    transferred_bytes: AtomicU64,
    max_retry: u32,
}

impl HttpRangeReader {
    /// Create a new HTTP Range reader
    ///
    /// This will send a HEAD request to verify Range support and get file size
    pub async fn new(url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("rid3/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Send HEAD request to check capabilities
        let resp = client.head(&url).send().await?;

        if !resp.status().is_success() {
            bail!("HTTP request failed with status: {}", resp.status());
        }

        // Check if server supports Range requests
        let accept_ranges = resp
            .headers()
            .get("accept-ranges")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");

        if !accept_ranges.contains("bytes") {
            bail!("Remote server does not support Range requests");
        }

        // Get file size from Content-Length
        let size = resp
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| anyhow!("Remote server did not return Content-Length"))?;

        Ok(Self {
            client,
            url,
            size,
            transferred_bytes: AtomicU64::new(0),
            max_retry: 10,
        })
    }

    /// Get total bytes transferred from network
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ReadPrefix for HttpRangeReader {
    async fn read_prefix(&self, len: usize) -> Result<Vec<u8>> {
        if len == 0 || self.size == 0 {
            return Ok(Vec::new());
        }

        let end = (len as u64).min(self.size) - 1;
        let expected_size = (end + 1) as usize;

        let mut buf: Vec<u8> = Vec::with_capacity(expected_size);
        let mut retry_count = 0;

        while buf.len() < expected_size {
            let range = format!("bytes={}-{}", buf.len(), end);

            let result = self
                .client
                .get(&self.url)
                .header("Range", &range)
                .send()
                .await;

            match result {
                Ok(resp) if resp.status() == reqwest::StatusCode::PARTIAL_CONTENT => {
                    let bytes = resp.bytes().await?;
                    if bytes.is_empty() {
                        bail!("Remote server returned an empty range response");
                    }

                    self.transferred_bytes
                        .fetch_add(bytes.len() as u64, Ordering::Relaxed);

                    let chunk_len = bytes.len().min(expected_size - buf.len());
                    buf.extend_from_slice(&bytes[..chunk_len]);
                }
                Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                    // Server ignored the Range header and sent the whole
                    // body; keep the prefix we asked for.
                    let bytes = resp.bytes().await?;

                    self.transferred_bytes
                        .fetch_add(bytes.len() as u64, Ordering::Relaxed);

                    let chunk_len = bytes.len().min(expected_size);
                    buf = bytes[..chunk_len].to_vec();
                    break;
                }
                Ok(resp) => {
                    bail!("HTTP request failed with status: {}", resp.status());
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        bail!("Max retries exceeded");
                    }
                    eprintln!(
                        "Connection error, retry {}/{}: {}",
                        retry_count, self.max_retry, e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(buf)
    }

    fn size(&self) -> u64 {
        self.size
    }
}
