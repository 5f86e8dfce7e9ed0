use super::{tags_with, PlaylistRule, ValidationIssue};
use crate::error::Error;
use crate::keys;
use crate::pantos::PantosTag;
use crate::structure::PlaylistStructure;
use crate::tag::Tag;
use crate::value::EncryptionMethod;

/// Exactly one `#EXT-X-TARGETDURATION`, and no segment longer than it once
/// rounded to whole seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct TargetDuration;

impl PlaylistRule for TargetDuration {
    fn name(&self) -> &'static str {
        "target-duration"
    }

    fn check(&self, tags: &[Tag], _: &PlaylistStructure) -> Vec<ValidationIssue> {
        let targets: Vec<(usize, &Tag)> = tags_with(tags, PantosTag::TargetDuration).collect();
        let (_, target) = match targets.as_slice() {
            [] => return vec![ValidationIssue::error("missing #EXT-X-TARGETDURATION")],
            [first, rest @ ..] => {
                if !rest.is_empty() {
                    return rest
                        .iter()
                        .map(|(index, _)| {
                            ValidationIssue::error("#EXT-X-TARGETDURATION appears more than once").at(*index)
                        })
                        .collect();
                }
                *first
            }
        };

        // Malformed values are reported by the tag validator.
        let Some(target) = target.typed_value::<u64>(keys::VALUE) else {
            return Vec::new();
        };

        tags_with(tags, PantosTag::Inf)
            .filter_map(|(index, tag)| {
                let seconds = tag.duration().seconds()?;
                (seconds.round() > target as f64).then(|| {
                    ValidationIssue::error(format!(
                        "segment duration {} exceeds the target duration {}",
                        seconds, target
                    ))
                    .at(index)
                })
            })
            .collect()
    }
}

/// `#EXT-X-MEDIA-SEQUENCE` and `#EXT-X-DISCONTINUITY-SEQUENCE` come before the
/// first segment.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequenceTagsInHeader;

impl PlaylistRule for SequenceTagsInHeader {
    fn name(&self) -> &'static str {
        "sequence-tags-in-header"
    }

    fn check(&self, tags: &[Tag], structure: &PlaylistStructure) -> Vec<ValidationIssue> {
        let Some(first_segment) = structure.segment_groups.first().map(|group| group.range.start) else {
            return Vec::new();
        };

        tags_with(tags, PantosTag::MediaSequence)
            .chain(tags_with(tags, PantosTag::DiscontinuitySequence))
            .filter(|(index, _)| *index >= first_segment)
            .map(|(index, tag)| {
                ValidationIssue::error(format!("{} must appear before the first segment", tag.descriptor()))
                    .at(index)
            })
            .collect()
    }
}

/// `METHOD=NONE` keys carry no `URI` or `IV`; every other method needs a `URI`.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyAttributes;

impl PlaylistRule for KeyAttributes {
    fn name(&self) -> &'static str {
        "key-attributes"
    }

    fn check(&self, tags: &[Tag], _: &PlaylistStructure) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (index, tag) in tags_with(tags, PantosTag::Key) {
            match tag.typed_value::<EncryptionMethod>(keys::METHOD) {
                Some(EncryptionMethod::None) => {
                    for key in [keys::URI, keys::IV] {
                        if tag.value(key).is_some() {
                            issues.push(
                                ValidationIssue::error(format!("METHOD=NONE key must not have {}", key)).at(index),
                            );
                        }
                    }
                }
                Some(_) if tag.value(keys::URI).is_none() => {
                    issues.push(ValidationIssue::error("encrypted key is missing its URI").at(index));
                }
                _ => {}
            }
        }
        issues
    }
}

/// Every segment has a positive duration before its URI.
#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentDurations;

impl PlaylistRule for SegmentDurations {
    fn name(&self) -> &'static str {
        "segment-durations"
    }

    fn check(&self, tags: &[Tag], _: &PlaylistStructure) -> Vec<ValidationIssue> {
        match PlaylistStructure::try_build(tags) {
            Ok(_) => Vec::new(),
            Err(Error::MissingSegmentDuration { index }) => {
                vec![ValidationIssue::error("segment has no positive #EXTINF duration").at(index)]
            }
            Err(e) => vec![ValidationIssue::error(e.to_string())],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::parse_tags;
    use crate::registry::TagRegistry;
    use std::sync::Arc;

    fn check(rule: impl PlaylistRule, input: &str) -> Vec<ValidationIssue> {
        let tags = parse_tags(&Arc::from(input), &TagRegistry::new()).unwrap();
        rule.check(&tags, &PlaylistStructure::build(&tags))
    }

    #[test]
    fn target_duration_bounds_segments() {
        let input = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:10.4,\na.ts\n#EXTINF:10.5,\nb.ts\n";
        let issues = check(TargetDuration, input);
        assert_eq!(1, issues.len());
        assert_eq!(Some(4), issues[0].tag_index);
    }

    #[test]
    fn target_duration_must_be_unique() {
        let input = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXT-X-TARGETDURATION:8\n#EXTINF:9,\na.ts\n";
        let issues = check(TargetDuration, input);
        assert_eq!(vec![ValidationIssue::error("#EXT-X-TARGETDURATION appears more than once").at(2)], issues);
        assert_eq!(1, check(TargetDuration, "#EXTM3U\n#EXTINF:9,\na.ts\n").len());
    }

    #[test]
    fn sequence_tags_belong_in_header() {
        let input = "#EXTM3U\n#EXT-X-MEDIA-SEQUENCE:1\n#EXTINF:9,\na.ts\n#EXT-X-DISCONTINUITY-SEQUENCE:2\n#EXTINF:9,\nb.ts\n";
        let issues = check(SequenceTagsInHeader, input);
        assert_eq!(1, issues.len());
        assert_eq!(Some(4), issues[0].tag_index);
    }

    #[test]
    fn key_attributes_match_method() {
        let input = concat!(
            "#EXTM3U\n",
            "#EXT-X-KEY:METHOD=NONE,URI=\"k\",IV=0x01\n",
            "#EXT-X-KEY:METHOD=AES-128\n",
            "#EXT-X-KEY:METHOD=SAMPLE-AES,URI=\"k\"\n",
            "#EXT-X-KEY:METHOD=NONE\n",
        );
        let issues = check(KeyAttributes, input);
        let indices: Vec<Option<usize>> = issues.iter().map(|issue| issue.tag_index).collect();
        assert_eq!(vec![Some(1), Some(1), Some(2)], indices);
    }

    #[test]
    fn reports_missing_segment_durations() {
        let issues = check(SegmentDurations, "#EXTM3U\n#EXTINF:0,\na.ts\n");
        assert_eq!(vec![ValidationIssue::error("segment has no positive #EXTINF duration").at(1)], issues);
        assert!(check(SegmentDurations, "#EXTM3U\n#EXTINF:1,\na.ts\n").is_empty());
    }
}
