//! Main entry point for the rid3 CLI application.
//!
//! This binary provides a command-line interface for reading ID3v2 tags
//! from both local filesystem and remote HTTP URLs.

use anyhow::{Result, bail};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use rid3::{Cli, HttpRangeReader, LocalFileReader, Metadata, ReadPrefix, TagReader};

/// Application entry point.
///
/// Parses command-line arguments and dispatches to the appropriate handler
/// based on whether the input is a local file or HTTP URL.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_http_url() {
        // Handle remote audio file via HTTP Range requests
        let reader = HttpRangeReader::new(cli.file.clone()).await?;
        let transferred_before = reader.transferred_bytes();
        let reader = Arc::new(reader);

        process_tag(reader.clone(), &cli).await?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            let transferred = reader.transferred_bytes() - transferred_before;
            eprintln!("\nTotal bytes transferred: {}", format_size(transferred));
        }
    } else {
        // Handle local audio file
        let reader = Arc::new(LocalFileReader::new(Path::new(&cli.file))?);
        process_tag(reader, &cli).await?;
    }

    Ok(())
}

/// Process a tagged file based on CLI options.
///
/// This function dispatches between the three modes:
/// - Artwork mode (`-a` or `-p`): Extract the embedded picture
/// - List mode (`-l`): Display raw frames without decoding payloads
/// - Default mode: Decode and print the tag metadata
///
/// # Arguments
///
/// * `reader` - A reader implementing the `ReadPrefix` trait
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if processing fails.
async fn process_tag<R: ReadPrefix + 'static>(reader: Arc<R>, cli: &Cli) -> Result<()> {
    let reader = TagReader::new(reader);

    if cli.pipe || cli.artwork.is_some() {
        return extract_artwork(&reader, cli).await;
    }

    if cli.list {
        return list_frames(&reader, cli).await;
    }

    show_metadata(&reader, cli).await
}

/// Decode the tag and print its metadata fields.
///
/// A missing tag is reported on stderr but is not an error; untagged files
/// are a normal input.
async fn show_metadata<R: ReadPrefix>(reader: &TagReader<R>, cli: &Cli) -> Result<()> {
    if cli.verbose {
        if let Some(header) = reader.read_header().await? {
            println!(
                "tag: {}, {} bytes",
                header.version.as_str(),
                header.tag_size
            );
        }
    }

    match reader.read_metadata().await? {
        Some(metadata) => print_metadata(&metadata, cli),
        None => no_tag(cli),
    }

    Ok(())
}

/// Print decoded metadata as aligned `name: value` rows.
///
/// Absent fields are omitted entirely; embedded artwork is summarized by
/// type and size rather than dumped.
fn print_metadata(metadata: &Metadata, cli: &Cli) {
    if !cli.is_quiet() {
        println!("{}: {}", cli.file, metadata.version.as_str());
    }

    for (field, value) in metadata.fields() {
        if let Some(value) = value {
            println!("{:>12}: {}", field.name(), value);
        }
    }

    if let Some(ref picture) = metadata.picture {
        println!(
            "{:>12}: {}, {}",
            "artwork",
            picture.format.mime_type(),
            format_size(picture.data.len() as u64)
        );
    }
}

/// List the raw frames of the tag in table format.
///
/// Shows every frame the walker reaches, including ones the decoder would
/// skip, so damaged or exotic tags can be inspected.
async fn list_frames<R: ReadPrefix>(reader: &TagReader<R>, cli: &Cli) -> Result<()> {
    if reader.read_header().await?.is_none() {
        no_tag(cli);
        return Ok(());
    }

    let frames = reader.list_frames().await?;

    println!("{:>10}  {:>10}  {:>7}  Id", "Total", "Size", "Kind");
    println!("{}", "-".repeat(40));

    // Track totals for summary line
    let mut total_frame = 0u64;
    let mut total_payload = 0u64;

    for frame in &frames {
        total_frame += frame.total;
        total_payload += frame.size;
        println!(
            "{:>10}  {:>10}  {:>7}  {}",
            frame.total,
            frame.size,
            frame.kind.label(),
            frame.id
        );
    }

    println!("{}", "-".repeat(40));
    println!(
        "{:>10}  {:>10}  {:>7}  {} frames",
        total_frame,
        total_payload,
        "",
        frames.len()
    );

    Ok(())
}

/// Extract embedded artwork to stdout or a file.
///
/// Handles the two artwork options:
/// - Pipe mode (`-p`): Write image bytes to stdout, no messages
/// - File mode (`-a FILE`): Save to the given path, honoring `-o`
///
/// Unlike metadata display, a missing picture here is an error: the caller
/// asked for bytes this file cannot provide.
async fn extract_artwork<R: ReadPrefix>(reader: &TagReader<R>, cli: &Cli) -> Result<()> {
    let Some(picture) = reader.read_picture().await? else {
        bail!("{}: no embedded artwork found", cli.file);
    };

    // Pipe mode: write image bytes directly to stdout
    if cli.pipe {
        use tokio::io::AsyncWriteExt;
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&picture.data).await?;
        stdout.flush().await?;
        return Ok(());
    }

    // Only reachable with -a set
    let Some(output) = cli.artwork.as_deref() else {
        return Ok(());
    };
    let output_path = Path::new(output);

    // Handle existing files based on overwrite options
    if output_path.exists() && !cli.overwrite {
        if !cli.is_quiet() {
            eprintln!("Skipping: {} (use -o to overwrite)", output);
        }
        return Ok(());
    }

    if !cli.is_quiet() {
        println!("  extracting: {} ({})", output, picture.format.mime_type());
    }

    tokio::fs::write(output_path, &picture.data).await?;

    Ok(())
}

/// Report a missing tag on stderr unless `-qq` suppressed it.
fn no_tag(cli: &Cli) {
    if !cli.is_very_quiet() {
        eprintln!("{}: no ID3v2 tag found", cli.file);
    }
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(1048576), "1.00 MB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
