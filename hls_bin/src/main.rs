mod args;

use args::Args;
use clap::Parser;
use hls_playlist::{Playlist, PlaylistStructure, TagRegistry, ValidationIssue};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use url::Url;

#[derive(Serialize)]
struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    structure: Option<&'a PlaylistStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<&'a [ValidationIssue]>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Args::parse();
    let registry = TagRegistry::new();
    let base_url = match &args.base_url {
        Some(url) => url.clone(),
        None => file_url(&args.path)?,
    };

    let bytes = std::fs::read(&args.path)?;
    let playlist = Playlist::parse(&bytes, base_url, &registry)?;
    info!("loaded {} tags from {}", playlist.len(), playlist.url());

    if args.rewrite() {
        print!("{}", playlist.write(&registry)?);
        return Ok(());
    }

    let structure = playlist.structure();
    let issues = if args.validate || args.strict {
        Some(playlist.validate(&registry))
    } else {
        None
    };

    let report = Report {
        structure: args.structure.then_some(structure.as_ref()),
        issues: issues.as_deref(),
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&playlist, &report);
    }

    let errors = issues
        .iter()
        .flatten()
        .filter(|issue| issue.is_error())
        .count();
    if args.strict && errors > 0 {
        return Err(format!("playlist has {} validation errors", errors).into());
    }
    Ok(())
}

fn file_url(path: &Path) -> Result<Url, Box<dyn Error>> {
    let path = std::fs::canonicalize(path)?;
    Url::from_file_path(&path).map_err(|()| format!("{} is not an absolute path", path.display()).into())
}

fn print_report(playlist: &Playlist, report: &Report) {
    if let Some(structure) = report.structure {
        println!("{:?} playlist, {} tags", structure.kind, playlist.len());
        if let Some(header) = structure.header {
            println!("header   {}..={}", header.start, header.end);
        }
        for group in &structure.segment_groups {
            let discontinuity = if group.discontinuity { " discontinuity" } else { "" };
            let uri = playlist
                .resolve_uri(group.range.end)
                .ok()
                .flatten()
                .map_or_else(String::new, |url| format!(" {}", url));
            println!(
                "segment  {}..={} #{} start {} duration {}{}{}",
                group.range.start,
                group.range.end,
                group.media_sequence,
                group.time_range.start,
                group.time_range.duration,
                discontinuity,
                uri
            );
        }
        if let Some(footer) = structure.footer {
            println!("footer   {}..={}", footer.start, footer.end);
        }
        for span in &structure.spans {
            println!(
                "span     {} at {} over groups {}..={}",
                span.descriptor, span.parent_index, span.groups.start, span.groups.end
            );
        }
        if !structure.segment_groups.is_empty() {
            println!("duration {}", structure.duration());
        }
    }

    if let Some(issues) = report.issues {
        if issues.is_empty() {
            println!("no issues");
        }
        for issue in issues {
            println!("{}", issue);
        }
    }
}
