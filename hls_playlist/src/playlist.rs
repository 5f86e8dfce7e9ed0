use crate::error::{Error, Result};
use crate::keys;
use crate::parse::parse_tags;
use crate::registry::TagRegistry;
use crate::sequence::TagSequence;
use crate::structure::{PlaylistStructure, SegmentGroup, TagSpan};
use crate::tag::Tag;
use crate::time::MediaTime;
use crate::validate::{PlaylistValidator, ValidationIssue};
use crate::write::write_tags;
use log::debug;
use std::ops::Range;
use std::sync::Arc;
use url::Url;

/// A playlist loaded from `url`.
///
/// Cloning is cheap. Clones share their tags until one of them is edited.
#[derive(Clone, Debug)]
pub struct Playlist {
    url: Url,
    tags: TagSequence,
}

impl Playlist {
    pub fn parse(bytes: &[u8], url: Url, registry: &TagRegistry) -> Result<Self> {
        Self::parse_str(std::str::from_utf8(bytes)?, url, registry)
    }

    pub fn parse_str(text: &str, url: Url, registry: &TagRegistry) -> Result<Self> {
        let buffer: Arc<str> = Arc::from(text);
        let tags = parse_tags(&buffer, registry)?;
        debug!("parsed {} tags from {}", tags.len(), url);
        Ok(Self::from_tags(tags, url))
    }

    pub fn from_tags(tags: Vec<Tag>, url: Url) -> Self {
        Self {
            url,
            tags: TagSequence::new(tags),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn tags(&self) -> &TagSequence {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn insert(&mut self, index: usize, tags: impl IntoIterator<Item = Tag>) -> Result<()> {
        self.tags.insert(index, tags)
    }

    pub fn delete(&mut self, index: usize) -> Result<Tag> {
        self.tags.delete(index)
    }

    pub fn delete_range(&mut self, range: Range<usize>) -> Result<Vec<Tag>> {
        self.tags.delete_range(range)
    }

    pub fn transform(&mut self, f: impl FnMut(&Tag) -> Tag) {
        self.tags.transform(f)
    }

    pub fn modify<R>(&mut self, index: usize, f: impl FnOnce(&mut Tag) -> R) -> Result<R> {
        self.tags.modify(index, f)
    }

    pub fn structure(&self) -> Arc<PlaylistStructure> {
        self.tags.structure()
    }

    pub fn header(&self) -> &[Tag] {
        self.tags.header_tags()
    }

    pub fn segment_groups(&self) -> Vec<SegmentGroup> {
        self.structure().segment_groups.clone()
    }

    pub fn footer(&self) -> &[Tag] {
        self.tags.footer_tags()
    }

    pub fn spans(&self) -> Vec<TagSpan> {
        self.structure().spans.clone()
    }

    pub fn start(&self) -> MediaTime {
        self.structure().start()
    }

    pub fn end(&self) -> MediaTime {
        self.structure().end()
    }

    pub fn duration(&self) -> MediaTime {
        self.structure().duration()
    }

    /// Validates with the built-in rule chains.
    pub fn validate(&self, registry: &TagRegistry) -> Vec<ValidationIssue> {
        PlaylistValidator::default().validate(&self.tags, registry)
    }

    pub fn write(&self, registry: &TagRegistry) -> Result<String> {
        write_tags(&self.tags, registry)
    }

    /// Resolves the URI of a location line, or the `URI` attribute of a tag,
    /// against the playlist URL.
    pub fn resolve_uri(&self, tag_index: usize) -> Result<Option<Url>> {
        let tag = self.tags.get(tag_index).ok_or(Error::IndexOutOfBounds {
            index: tag_index,
            len: self.tags.len(),
        })?;
        let uri = if tag.is_location() {
            Some(tag.body())
        } else {
            tag.value(keys::URI)
        };
        Ok(uri.and_then(|uri| self.url.join(uri).ok()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pantos::PantosTag;
    use assert_matches::assert_matches;

    const VOD: &str = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXT-X-KEY:METHOD=AES-128,URI=\"../keys/k1\"\n#EXTINF:5,\nseg1.ts\n#EXT-X-ENDLIST\n";

    fn url() -> Url {
        Url::parse("https://example.com/vod/index.m3u8").unwrap()
    }

    #[test]
    fn resolves_relative_uris() {
        let playlist = Playlist::parse_str(VOD, url(), &TagRegistry::new()).unwrap();
        assert_eq!(
            Some("https://example.com/vod/seg1.ts"),
            playlist.resolve_uri(4).unwrap().as_ref().map(Url::as_str)
        );
        assert_eq!(
            Some("https://example.com/keys/k1"),
            playlist.resolve_uri(2).unwrap().as_ref().map(Url::as_str)
        );
        assert_eq!(None, playlist.resolve_uri(1).unwrap());
        assert_matches!(playlist.resolve_uri(6), Err(Error::IndexOutOfBounds { .. }));
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_matches!(
            Playlist::parse(&[0x23, 0xff, 0xfe], url(), &TagRegistry::new()),
            Err(Error::InvalidUtf8(_))
        );
    }

    #[test]
    fn writes_back_the_source() {
        let registry = TagRegistry::new();
        let playlist = Playlist::parse(VOD.as_bytes(), url(), &registry).unwrap();
        assert_eq!(VOD, playlist.write(&registry).unwrap());
    }

    #[test]
    fn clones_are_isolated() {
        let registry = TagRegistry::new();
        let original = Playlist::parse_str(VOD, url(), &registry).unwrap();
        let mut copy = original.clone();
        assert!(copy.tags().shares_storage(original.tags()));

        copy.delete(5).unwrap();
        copy.modify(2, |tag| tag.set_value(keys::URI, "k2")).unwrap().unwrap();
        assert!(!copy.tags().shares_storage(original.tags()));
        assert_eq!(6, original.len());
        assert_eq!(Some("../keys/k1"), original.tags().get(2).and_then(|tag| tag.value(keys::URI)));
        assert!(original.footer()[0].descriptor().is(PantosTag::EndList));
        assert!(copy.footer().is_empty());
    }
}
