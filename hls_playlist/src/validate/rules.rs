use super::{PlaylistRule, ValidationIssue};
use crate::descriptor::Descriptor;
use crate::pantos::PantosTag;
use crate::structure::PlaylistStructure;
use crate::tag::Tag;

/// Tags with `descriptor`, with their indices.
pub fn tags_with(tags: &[Tag], descriptor: impl Into<Descriptor>) -> impl Iterator<Item = (usize, &Tag)> {
    let descriptor = descriptor.into();
    tags.iter()
        .enumerate()
        .filter(move |(_, tag)| tag.descriptor() == descriptor)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FirstTagIsM3u;

impl PlaylistRule for FirstTagIsM3u {
    fn name(&self) -> &'static str {
        "first-tag-is-m3u"
    }

    fn check(&self, tags: &[Tag], _: &PlaylistStructure) -> Vec<ValidationIssue> {
        match tags.first() {
            Some(tag) if tag.descriptor().is(PantosTag::M3u) => Vec::new(),
            Some(_) => vec![ValidationIssue::error("playlist does not start with #EXTM3U").at(0)],
            None => vec![ValidationIssue::error("playlist is empty")],
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SingleVersion;

impl PlaylistRule for SingleVersion {
    fn name(&self) -> &'static str {
        "single-version"
    }

    fn check(&self, tags: &[Tag], _: &PlaylistStructure) -> Vec<ValidationIssue> {
        tags_with(tags, PantosTag::Version)
            .skip(1)
            .map(|(index, _)| ValidationIssue::error("#EXT-X-VERSION appears more than once").at(index))
            .collect()
    }
}
