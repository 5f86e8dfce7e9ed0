use super::{tags_with, PlaylistRule, ValidationIssue};
use crate::descriptor::Descriptor;
use crate::keys;
use crate::pantos::PantosTag;
use crate::structure::PlaylistStructure;
use crate::tag::Tag;
use crate::value::{ClosedCaptions, MediaType};
use std::collections::{BTreeMap, HashSet};

/// `#EXT-X-MEDIA` tags keyed by `GROUP-ID`.
fn rendition_groups(tags: &[Tag]) -> BTreeMap<&str, Vec<(usize, &Tag)>> {
    let mut groups: BTreeMap<&str, Vec<(usize, &Tag)>> = BTreeMap::new();
    for (index, tag) in tags_with(tags, PantosTag::Media) {
        if let Some(group_id) = tag.value(keys::GROUP_ID) {
            groups.entry(group_id).or_default().push((index, tag));
        }
    }
    groups
}

/// Members of a rendition group share a `TYPE`, have unique names, and at
/// most one of them is the default.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenditionGroups;

impl PlaylistRule for RenditionGroups {
    fn name(&self) -> &'static str {
        "rendition-groups"
    }

    fn check(&self, tags: &[Tag], _: &PlaylistStructure) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (group_id, members) in rendition_groups(tags) {
            let (_, first) = members[0];
            let media_type = first.value(keys::TYPE);
            let mut names = HashSet::new();
            let mut has_default = false;

            for (index, tag) in members {
                if tag.value(keys::TYPE) != media_type {
                    issues.push(
                        ValidationIssue::error(format!("rendition group {:?} mixes media types", group_id)).at(index),
                    );
                }

                if let Some(name) = tag.value(keys::NAME) {
                    if !names.insert(name) {
                        issues.push(
                            ValidationIssue::error(format!(
                                "rendition group {:?} has more than one member named {:?}",
                                group_id, name
                            ))
                            .at(index),
                        );
                    }
                }

                if tag.typed_value::<bool>(keys::DEFAULT) == Some(true) {
                    if has_default {
                        issues.push(
                            ValidationIssue::error(format!(
                                "rendition group {:?} has more than one DEFAULT=YES member",
                                group_id
                            ))
                            .at(index),
                        );
                    }
                    has_default = true;

                    if tag.typed_value::<bool>(keys::AUTOSELECT) == Some(false) {
                        issues.push(ValidationIssue::error("DEFAULT=YES requires AUTOSELECT=YES").at(index));
                    }
                }
            }
        }
        issues
    }
}

/// Rendition group references from variant streams resolve to a group of the
/// matching type.
#[derive(Clone, Copy, Debug, Default)]
pub struct GroupReferences;

const REFERENCES: &[(&str, MediaType)] = &[
    (keys::AUDIO, MediaType::Audio),
    (keys::VIDEO, MediaType::Video),
    (keys::SUBTITLES, MediaType::Subtitles),
    (keys::CLOSED_CAPTIONS, MediaType::ClosedCaptions),
];

impl PlaylistRule for GroupReferences {
    fn name(&self) -> &'static str {
        "group-references"
    }

    fn check(&self, tags: &[Tag], _: &PlaylistStructure) -> Vec<ValidationIssue> {
        let groups = rendition_groups(tags);
        let resolves = |group_id: &str, media_type: MediaType| {
            groups.get(group_id).map_or(false, |members| {
                members
                    .iter()
                    .any(|(_, tag)| tag.typed_value::<MediaType>(keys::TYPE) == Some(media_type))
            })
        };

        let variants = tags.iter().enumerate().filter(|(_, tag)| {
            let descriptor = tag.descriptor();
            descriptor.is(PantosTag::StreamInf) || descriptor.is(PantosTag::IFrameStreamInf)
        });

        let mut issues = Vec::new();
        for (index, tag) in variants {
            for &(key, media_type) in REFERENCES {
                let Some(attribute) = tag.attributes().and_then(|list| list.get(key)) else {
                    continue;
                };
                if key == keys::CLOSED_CAPTIONS && !attribute.quoted {
                    if let Some(ClosedCaptions::None) = tag.typed_value(key) {
                        continue;
                    }
                }
                if !resolves(&attribute.value, media_type) {
                    issues.push(
                        ValidationIssue::error(format!(
                            "{}={:?} does not name a rendition group of that type",
                            key, attribute.value
                        ))
                        .at(index),
                    );
                }
            }
        }
        issues
    }
}

/// Every `#EXT-X-STREAM-INF` is followed by the URI of its variant.
#[derive(Clone, Copy, Debug, Default)]
pub struct VariantUris;

impl PlaylistRule for VariantUris {
    fn name(&self) -> &'static str {
        "variant-uris"
    }

    fn check(&self, tags: &[Tag], _: &PlaylistStructure) -> Vec<ValidationIssue> {
        tags_with(tags, PantosTag::StreamInf)
            .filter(|(index, _)| {
                tags[index + 1..]
                    .iter()
                    .find(|tag| tag.descriptor() != Descriptor::Comment)
                    .map_or(true, |next| !next.is_location())
            })
            .map(|(index, _)| ValidationIssue::error("#EXT-X-STREAM-INF is not followed by a URI").at(index))
            .collect()
    }
}
