//! # rid3
//!
//! A Rust ID3v2 tag reader with HTTP URL support using Range requests.
//!
//! This library provides functionality to read ID3v2 metadata from MP3 files on
//! both the local filesystem and remote HTTP servers. For remote files, it uses
//! HTTP Range requests to download only the tag itself, making it suitable for
//! inspecting titles, artists, and artwork of large remote files without
//! downloading the audio.
//!
//! ## Features
//!
//! - Read ID3v2.2, v2.3, and v2.4 tags from local files
//! - Read tags from HTTP/HTTPS URLs using Range requests
//! - Latin-1, UTF-16, and UTF-8 text frame decoding
//! - Embedded JPEG/PNG artwork extraction
//! - Tolerant of damaged tags: bad frames are skipped, good ones kept
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use rid3::{HttpRangeReader, TagReader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Create a reader for a remote audio file
//!     let reader = Arc::new(HttpRangeReader::new("https://example.com/song.mp3".to_string()).await?);
//!
//!     // Create a tag reader
//!     let tags = TagReader::new(reader);
//!
//!     // Decode the tag, if the file carries one
//!     if let Some(metadata) = tags.read_metadata().await? {
//!         println!("{:?} {:?}", metadata.title, metadata.artist);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod id3;
pub mod io;

pub use cli::Cli;
pub use id3::{ImageFormat, Metadata, Picture, TagReader, TagVersion, parse_metadata};
pub use io::{HttpRangeReader, LocalFileReader, ReadPrefix};
