//! The logical layout of a playlist: header, segment groups, footer and the
//! spans of span-scoped tags such as `#EXT-X-KEY`.

use crate::descriptor::{Descriptor, TagScope};
use crate::error::{Error, Result};
use crate::keys;
use crate::pantos::PantosTag;
use crate::tag::Tag;
use crate::time::{MediaTime, MediaTimeRange};
use log::warn;
use serde::Serialize;

/// An inclusive range of indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    fn shift(&mut self, count: usize, forward: bool) {
        if forward {
            self.start += count;
            self.end += count;
        } else {
            self.start -= count;
            self.end -= count;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaylistKind {
    Master,
    Variant,
}

impl PlaylistKind {
    pub fn detect(tags: &[Tag]) -> Self {
        let is_master = tags.iter().any(|tag| {
            let descriptor = tag.descriptor();
            descriptor.is(PantosTag::StreamInf) || descriptor.is(PantosTag::IFrameStreamInf)
        });
        if is_master {
            PlaylistKind::Master
        } else {
            PlaylistKind::Variant
        }
    }

    /// The tag that opens each segment or variant.
    pub fn divider(self) -> PantosTag {
        match self {
            PlaylistKind::Master => PantosTag::StreamInf,
            PlaylistKind::Variant => PantosTag::Inf,
        }
    }
}

/// The tags of one media segment, or of one variant stream in a master
/// playlist, ending with its URI.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentGroup {
    pub range: IndexRange,
    pub media_sequence: u64,
    /// Invalid in master playlists.
    pub time_range: MediaTimeRange,
    pub discontinuity: bool,
}

/// The segment groups a span-scoped tag applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TagSpan {
    pub descriptor: Descriptor,
    /// Index of the tag that opened the span.
    pub parent_index: usize,
    pub groups: IndexRange,
}

/// A splice recorded against a clean structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingChange {
    pub index: usize,
    pub delta: isize,
    /// Set when every inserted tag is media-segment scoped.
    pub segment_scoped: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlaylistStructure {
    pub kind: PlaylistKind,
    pub header: Option<IndexRange>,
    pub segment_groups: Vec<SegmentGroup>,
    pub footer: Option<IndexRange>,
    pub spans: Vec<TagSpan>,
}

enum Region {
    Header,
    Group(usize),
    Footer,
}

impl PlaylistStructure {
    /// Builds the structure of `tags`, falling back to a single header when
    /// the segments cannot be delimited.
    pub fn build(tags: &[Tag]) -> Self {
        match Self::try_build(tags) {
            Ok(structure) => structure,
            Err(e) => {
                warn!("falling back to a flat playlist structure: {}", e);
                Self::degenerate(PlaylistKind::detect(tags), tags.len())
            }
        }
    }

    pub fn try_build(tags: &[Tag]) -> Result<Self> {
        let kind = PlaylistKind::detect(tags);
        let first = match tags
            .iter()
            .position(|tag| tag.descriptor().scope() == TagScope::MediaSegment)
        {
            Some(first) => first,
            None => return Ok(Self::degenerate(kind, tags.len())),
        };

        let divider = Descriptor::from(kind.divider());
        let mut media_sequence = tags
            .iter()
            .find(|tag| tag.descriptor().is(PantosTag::MediaSequence))
            .and_then(|tag| tag.typed_value::<u64>(keys::VALUE))
            .unwrap_or(0);

        let mut groups = Vec::new();
        let mut group_start = first;
        let mut duration: Option<MediaTime> = None;
        let mut discontinuity = false;
        let mut elapsed = MediaTime::ZERO;

        for (index, tag) in tags.iter().enumerate().skip(first) {
            let descriptor = tag.descriptor();
            if descriptor == divider {
                if kind == PlaylistKind::Variant && !tag.duration().is_positive() {
                    return Err(Error::MissingSegmentDuration { index });
                }
                duration = Some(tag.duration());
            } else if descriptor.is(PantosTag::Discontinuity) {
                discontinuity = true;
            } else if descriptor == Descriptor::Location {
                let time_range = match kind {
                    PlaylistKind::Master => MediaTimeRange::INVALID,
                    PlaylistKind::Variant => {
                        let duration = duration.ok_or(Error::MissingSegmentDuration { index })?;
                        let range = MediaTimeRange::new(elapsed, duration);
                        elapsed = elapsed + duration;
                        range
                    }
                };
                groups.push(SegmentGroup {
                    range: IndexRange::new(group_start, index),
                    media_sequence,
                    time_range,
                    discontinuity,
                });

                media_sequence += 1;
                group_start = index + 1;
                duration = None;
                discontinuity = false;
            }
        }

        if groups.is_empty() {
            return Ok(Self::degenerate(kind, tags.len()));
        }

        let header = (first > 0).then(|| IndexRange::new(0, first - 1));
        let footer = (group_start < tags.len()).then(|| IndexRange::new(group_start, tags.len() - 1));
        let spans = find_spans(tags, header, &groups);

        Ok(Self {
            kind,
            header,
            segment_groups: groups,
            footer,
            spans,
        })
    }

    /// A single header covering all `len` tags.
    pub fn degenerate(kind: PlaylistKind, len: usize) -> Self {
        Self {
            kind,
            header: (len > 0).then(|| IndexRange::new(0, len - 1)),
            segment_groups: Vec::new(),
            footer: None,
            spans: Vec::new(),
        }
    }

    pub fn start(&self) -> MediaTime {
        self.segment_groups
            .first()
            .map_or(MediaTime::INVALID, |group| group.time_range.start)
    }

    pub fn end(&self) -> MediaTime {
        self.segment_groups
            .last()
            .map_or(MediaTime::INVALID, |group| group.time_range.end())
    }

    pub fn duration(&self) -> MediaTime {
        if self.segment_groups.is_empty() {
            return MediaTime::INVALID;
        }
        self.segment_groups
            .iter()
            .fold(MediaTime::ZERO, |total, group| total + group.time_range.duration)
    }

    /// Position in `segment_groups` of the group holding `tag_index`.
    pub fn segment_group_containing(&self, tag_index: usize) -> Option<usize> {
        let position = self
            .segment_groups
            .partition_point(|group| group.range.end < tag_index);
        self.segment_groups
            .get(position)
            .filter(|group| group.range.contains(tag_index))
            .map(|_| position)
    }

    /// Spans in effect for the segment group at `group`.
    pub fn spans_for_group(&self, group: usize) -> impl Iterator<Item = &TagSpan> {
        self.spans
            .iter()
            .filter(move |span| span.groups.contains(group))
    }

    fn region_of(&self, index: usize) -> Option<Region> {
        if self.header.map_or(false, |header| header.contains(index)) {
            return Some(Region::Header);
        }
        if let Some(group) = self.segment_group_containing(index) {
            return Some(Region::Group(group));
        }
        if self.footer.map_or(false, |footer| footer.contains(index)) {
            return Some(Region::Footer);
        }
        None
    }

    /// Patches the ranges for one splice. Returns false when the splice may
    /// have moved a boundary and the structure must be rebuilt instead.
    pub(crate) fn apply_change(&mut self, change: &PendingChange) -> bool {
        let count = change.delta.unsigned_abs();
        if count == 0 {
            return true;
        }
        if change.delta > 0 {
            self.apply_insert(change.index, count, change.segment_scoped)
        } else {
            self.apply_delete(change.index, count)
        }
    }

    fn apply_insert(&mut self, index: usize, count: usize, segment_scoped: bool) -> bool {
        let first_group = match self.segment_groups.first() {
            Some(group) => group.range.start,
            None => {
                match &mut self.header {
                    Some(header) => header.end += count,
                    None => self.header = Some(IndexRange::new(0, count - 1)),
                }
                return true;
            }
        };

        let grown = if index < first_group || (index == first_group && !segment_scoped) {
            if segment_scoped {
                return false;
            }
            match &mut self.header {
                Some(header) => header.end += count,
                None => self.header = Some(IndexRange::new(0, count - 1)),
            }
            None
        } else {
            let position = self
                .segment_groups
                .partition_point(|group| group.range.end < index);
            match self.segment_groups.get_mut(position) {
                Some(group) => group.range.end += count,
                None => match &mut self.footer {
                    Some(footer) => footer.end += count,
                    None => self.footer = Some(IndexRange::new(index, index + count - 1)),
                },
            }
            Some(position)
        };

        let later = grown.map_or(0, |position| position + 1);
        for group in self.segment_groups.iter_mut().skip(later) {
            group.range.shift(count, true);
        }
        if grown.map_or(true, |position| position < self.segment_groups.len()) {
            if let Some(footer) = &mut self.footer {
                footer.shift(count, true);
            }
        }
        for span in &mut self.spans {
            if span.parent_index >= index {
                span.parent_index += count;
            }
        }
        true
    }

    fn apply_delete(&mut self, index: usize, count: usize) -> bool {
        let last = index + count - 1;
        let region = match self.region_of(index) {
            Some(region) => region,
            None => return false,
        };

        match region {
            Region::Header => {
                let Some(header) = self.header else { return false };
                if !header.contains(last) {
                    return false;
                }
                self.header = (header.len() > count).then(|| IndexRange::new(0, header.end - count));
                for group in &mut self.segment_groups {
                    group.range.shift(count, false);
                }
                if let Some(footer) = &mut self.footer {
                    footer.shift(count, false);
                }
            }
            Region::Group(position) => {
                let range = self.segment_groups[position].range;
                if !range.contains(last) || range.len() <= count {
                    return false;
                }
                // The first group always opens with its first segment-scoped tag.
                if position == 0 && index == range.start {
                    return false;
                }
                self.segment_groups[position].range.end -= count;
                for group in self.segment_groups.iter_mut().skip(position + 1) {
                    group.range.shift(count, false);
                }
                if let Some(footer) = &mut self.footer {
                    footer.shift(count, false);
                }
            }
            Region::Footer => {
                let Some(footer) = self.footer else { return false };
                if !footer.contains(last) {
                    return false;
                }
                self.footer = (footer.len() > count).then(|| IndexRange::new(footer.start, footer.end - count));
            }
        }

        for span in &mut self.spans {
            if span.parent_index > last {
                span.parent_index -= count;
            }
        }
        true
    }
}

/// Within the header or a single group only the last tag of each span-scoped
/// descriptor opens a span. A tag in the header opens its span at group 0.
fn find_spans(tags: &[Tag], header: Option<IndexRange>, groups: &[SegmentGroup]) -> Vec<TagSpan> {
    let regions = header
        .map(|header| (0, header))
        .into_iter()
        .chain(groups.iter().enumerate().map(|(i, group)| (i, group.range)));

    let mut open: Vec<TagSpan> = Vec::new();
    let mut spans = Vec::new();

    for (group_index, range) in regions {
        let mut openers: Vec<(Descriptor, usize)> = Vec::new();
        for (index, tag) in tags.iter().enumerate().take(range.end + 1).skip(range.start) {
            let descriptor = tag.descriptor();
            if descriptor.scope() != TagScope::MediaSpan {
                continue;
            }
            match openers.iter_mut().find(|(d, _)| *d == descriptor) {
                Some(opener) => opener.1 = index,
                None => openers.push((descriptor, index)),
            }
        }

        for (descriptor, parent_index) in openers {
            if let Some(position) = open.iter().position(|span| span.descriptor == descriptor) {
                let mut span = open.remove(position);
                if span.groups.start < group_index {
                    span.groups.end = group_index - 1;
                    spans.push(span);
                }
            }
            open.push(TagSpan {
                descriptor,
                parent_index,
                groups: IndexRange::new(group_index, group_index),
            });
        }
    }

    let last_group = groups.len().saturating_sub(1);
    spans.extend(open.into_iter().map(|mut span| {
        span.groups.end = last_group;
        span
    }));
    spans.sort_by_key(|span| (span.groups.start, span.parent_index));
    spans
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::TagRegistry;
    use crate::parse::parse_tags;
    use std::sync::Arc;

    fn tags(input: &str) -> Vec<Tag> {
        parse_tags(&Arc::from(input), &TagRegistry::new()).unwrap()
    }

    #[test]
    fn delimits_variant_segments() {
        let tags = tags("#EXTM3U\n#EXT-X-MEDIA-SEQUENCE:7\n#EXTINF:4,\n#EXT-X-BYTERANGE:100@0\na.ts\n#EXT-X-DISCONTINUITY\n#EXTINF:6,\nb.ts\n");
        let structure = PlaylistStructure::try_build(&tags).unwrap();
        assert_eq!(PlaylistKind::Variant, structure.kind);
        assert_eq!(Some(IndexRange::new(0, 1)), structure.header);
        assert_eq!(None, structure.footer);

        let groups = &structure.segment_groups;
        assert_eq!(2, groups.len());
        assert_eq!(IndexRange::new(2, 4), groups[0].range);
        assert_eq!(IndexRange::new(5, 7), groups[1].range);
        assert_eq!((7, 8), (groups[0].media_sequence, groups[1].media_sequence));
        assert!(!groups[0].discontinuity);
        assert!(groups[1].discontinuity);
        assert_eq!(MediaTime::new(4, 1), groups[1].time_range.start);
        assert_eq!(Some(10.0), structure.duration().seconds());
        assert_eq!(Some(10.0), structure.end().seconds());
    }

    #[test]
    fn delimits_master_variants() {
        let tags = tags("#EXTM3U\n#EXT-X-MEDIA:TYPE=AUDIO,GROUP-ID=\"a\",NAME=\"en\"\n#EXT-X-STREAM-INF:BANDWIDTH=1\nlow.m3u8\n#EXT-X-STREAM-INF:BANDWIDTH=2\nhigh.m3u8\n");
        let structure = PlaylistStructure::try_build(&tags).unwrap();
        assert_eq!(PlaylistKind::Master, structure.kind);
        assert_eq!(Some(IndexRange::new(0, 1)), structure.header);
        assert_eq!(2, structure.segment_groups.len());
        assert!(!structure.segment_groups[0].time_range.is_valid());
        assert!(!structure.duration().is_valid());
    }

    #[test]
    fn missing_duration_degrades() {
        let tags = tags("#EXTM3U\n#EXTINF:0,\na.ts\n");
        assert!(matches!(
            PlaylistStructure::try_build(&tags),
            Err(Error::MissingSegmentDuration { index: 1 })
        ));
        let structure = PlaylistStructure::build(&tags);
        assert_eq!(Some(IndexRange::new(0, 2)), structure.header);
        assert!(structure.segment_groups.is_empty());

        let no_divider = self::tags("#EXTM3U\nb.ts\n");
        assert!(PlaylistStructure::try_build(&no_divider).is_err());
    }

    #[test]
    fn dangling_divider_lands_in_footer() {
        let tags = tags("#EXTM3U\n#EXTINF:4,\na.ts\n#EXTINF:4,\n");
        let structure = PlaylistStructure::build(&tags);
        assert_eq!(1, structure.segment_groups.len());
        assert_eq!(Some(IndexRange::new(3, 3)), structure.footer);
    }

    #[test]
    fn spans_track_each_descriptor() {
        let tags = tags(concat!(
            "#EXTM3U\n",
            "#EXT-X-KEY:METHOD=AES-128,URI=\"a\"\n",
            "#EXT-X-MAP:URI=\"init.mp4\"\n",
            "#EXTINF:4,\na.ts\n",
            "#EXT-X-KEY:METHOD=AES-128,URI=\"b\"\n",
            "#EXTINF:4,\nb.ts\n",
            "#EXTINF:4,\nc.ts\n",
        ));
        let structure = PlaylistStructure::build(&tags);
        let spans: Vec<(Descriptor, usize, IndexRange)> = structure
            .spans
            .iter()
            .map(|span| (span.descriptor, span.parent_index, span.groups))
            .collect();
        assert_eq!(
            spans,
            vec![
                (PantosTag::Key.into(), 1, IndexRange::new(0, 0)),
                (PantosTag::Map.into(), 2, IndexRange::new(0, 2)),
                (PantosTag::Key.into(), 5, IndexRange::new(1, 2)),
            ]
        );
        assert_eq!(2, structure.spans_for_group(1).count());
    }

    #[test]
    fn later_span_tag_in_a_region_wins() {
        let tags = tags(concat!(
            "#EXTM3U\n",
            "#EXT-X-KEY:METHOD=NONE\n",
            "#EXT-X-KEY:METHOD=AES-128,URI=\"a\"\n",
            "#EXTINF:4,\na.ts\n",
        ));
        let structure = PlaylistStructure::build(&tags);
        assert_eq!(1, structure.spans.len());
        assert_eq!(2, structure.spans[0].parent_index);
    }

    #[test]
    fn group_key_replaces_header_key() {
        let tags = tags(concat!(
            "#EXTM3U\n",
            "#EXT-X-KEY:METHOD=AES-128,URI=\"a\"\n",
            "#EXT-X-PROGRAM-DATE-TIME:2023-01-01T00:00:00Z\n",
            "#EXT-X-KEY:METHOD=AES-128,URI=\"b\"\n",
            "#EXTINF:4,\na.ts\n",
            "#EXTINF:4,\nb.ts\n",
        ));
        let structure = PlaylistStructure::build(&tags);
        assert_eq!(Some(IndexRange::new(0, 1)), structure.header);
        assert_eq!(IndexRange::new(2, 5), structure.segment_groups[0].range);
        assert_eq!(IndexRange::new(6, 7), structure.segment_groups[1].range);
        assert_eq!(
            vec![TagSpan {
                descriptor: Descriptor::Pantos(PantosTag::Key),
                parent_index: 3,
                groups: IndexRange::new(0, 1),
            }],
            structure.spans
        );
    }

    #[test]
    fn finds_containing_group() {
        let tags = tags("#EXTM3U\n#EXTINF:4,\na.ts\n#EXTINF:4,\nb.ts\n#EXT-X-ENDLIST\n");
        let structure = PlaylistStructure::build(&tags);
        assert_eq!(None, structure.segment_group_containing(0));
        assert_eq!(Some(0), structure.segment_group_containing(2));
        assert_eq!(Some(1), structure.segment_group_containing(3));
        assert_eq!(None, structure.segment_group_containing(5));
    }

    #[test]
    fn empty_playlist_has_no_regions() {
        let structure = PlaylistStructure::build(&[]);
        assert_eq!(PlaylistStructure::degenerate(PlaylistKind::Variant, 0), structure);
        assert_eq!(None, structure.header);
    }
}
