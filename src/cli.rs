use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "rid3")]
#[command(version)]
#[command(about = "A Rust ID3v2 tag reader with HTTP URL support", long_about = None)]
#[command(after_help = "Examples:\n  \
  rid3 song.mp3                  show the tag metadata of song.mp3\n  \
  rid3 -l song.mp3               list raw frames with sizes\n  \
  rid3 -a cover.jpg song.mp3     save embedded artwork to cover.jpg\n  \
  rid3 -p song.mp3 | feh -       send embedded artwork via pipe into feh\n  \
  rid3 https://example.com/song.mp3   read the tag from a remote file")]
pub struct Cli {
    /// Audio file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// List frames instead of decoding them
    #[arg(short = 'l')]
    pub list: bool,

    /// Show extra tag details
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Save embedded artwork to FILE
    #[arg(short = 'a', value_name = "FILE")]
    pub artwork: Option<String>,

    /// Write embedded artwork to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}
