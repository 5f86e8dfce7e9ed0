use clap::Parser;
use std::path::PathBuf;
use url::Url;

/// Inspect, validate and rewrite an HLS playlist.
#[derive(Debug, Parser)]
pub struct Args {
    /// Playlist to read
    pub path: PathBuf,

    /// URL the playlist was fetched from, for resolving relative URIs.
    /// Defaults to the file's own location.
    #[clap(long, short)]
    pub base_url: Option<Url>,

    /// Report validation issues
    #[clap(long, short)]
    pub validate: bool,

    /// Print the header, segment groups, footer and spans
    #[clap(long, short)]
    pub structure: bool,

    /// Print reports as JSON
    #[clap(long, short)]
    pub json: bool,

    /// Exit with an error when validation finds an error-level issue
    #[clap(long)]
    pub strict: bool,
}

impl Args {
    /// Without a report flag the playlist is written back out.
    pub fn rewrite(&self) -> bool {
        !self.validate && !self.structure && !self.strict
    }
}
