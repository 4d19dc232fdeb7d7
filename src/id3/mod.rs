//! ID3v2 tag parsing and metadata extraction.
//!
//! This module provides functionality for reading ID3v2 metadata tags from
//! MP3 files, supporting the v2.2, v2.3, and v2.4 tag formats.
//!
//! ## Architecture
//!
//! The module is organized into four main components:
//!
//! - [`structures`]: Data structures representing ID3v2 format elements (tag header, frames, metadata)
//! - [`synchsafe`]: Decoder for the format's 7-bits-per-byte integer encoding
//! - [`parser`]: Low-level parsing of tag bytes into decoded fields
//! - [`reader`]: High-level async reading API for end users
//!
//! ## ID3v2 Format Overview
//!
//! A tagged file consists of:
//! 1. A 10-byte tag header ("ID3", version, flags, synchsafe size)
//! 2. A sequence of frames, each with its own header and payload
//! 3. Optional padding, then the audio stream
//!
//! The tag always sits at the very start of the file with its total extent
//! declared in the header, so a reader can fetch the header first and then
//! exactly the tag bytes - perfect for HTTP Range requests.
//!
//! ## Supported Features
//!
//! - ID3v2.2, v2.3, and v2.4 frame layouts
//! - Latin-1, UTF-16 (with BOM detection), and UTF-8 text encodings
//! - Embedded JPEG and PNG artwork (APIC/PIC frames)
//! - Damaged-tag recovery: skips bad frames, keeps what decoded
//!
//! ## Limitations
//!
//! - No ID3v1 or ID3v2.x writing support
//! - No unsynchronization or extended-header handling
//! - No compressed or encrypted frames

mod parser;
mod reader;
mod structures;
pub mod synchsafe;

pub use parser::{FrameWalker, decode_frame, parse_metadata};
pub use reader::TagReader;
pub use structures::*;
