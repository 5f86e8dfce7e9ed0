use crate::descriptor::TagScope;
use crate::error::{Error, Result};
use crate::structure::{PendingChange, PlaylistKind, PlaylistStructure};
use crate::tag::Tag;
use log::debug;
use parking_lot::Mutex;
use std::ops::Range;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
enum StructureState {
    Clean,
    DirtyWithChanges(Vec<PendingChange>),
    DirtyRequiresRebuild,
}

#[derive(Clone, Debug)]
struct StructureCache {
    state: StructureState,
    structure: Arc<PlaylistStructure>,
}

#[derive(Debug)]
struct SharedCache(Mutex<StructureCache>);

impl Clone for SharedCache {
    fn clone(&self) -> Self {
        SharedCache(Mutex::new(self.0.lock().clone()))
    }
}

/// An editable list of tags that keeps its playlist structure up to date.
///
/// Edits only record what changed. The structure is patched or rebuilt on
/// the next read. Clones share their tags and structure until one of them is
/// edited.
#[derive(Clone, Debug)]
pub struct TagSequence {
    tags: Arc<Vec<Tag>>,
    cache: Arc<SharedCache>,
}

impl TagSequence {
    pub fn new(tags: Vec<Tag>) -> Self {
        let structure = Arc::new(PlaylistStructure::degenerate(PlaylistKind::Variant, 0));
        Self {
            tags: Arc::new(tags),
            cache: Arc::new(SharedCache(Mutex::new(StructureCache {
                state: StructureState::DirtyRequiresRebuild,
                structure,
            }))),
        }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.tags.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.tags.iter()
    }

    /// True while both sequences still point at the same tag storage.
    pub fn shares_storage(&self, other: &TagSequence) -> bool {
        Arc::ptr_eq(&self.tags, &other.tags)
    }

    pub fn insert(&mut self, index: usize, tags: impl IntoIterator<Item = Tag>) -> Result<()> {
        let len = self.tags.len();
        if index > len {
            return Err(Error::IndexOutOfBounds { index, len });
        }

        let inserted: Vec<Tag> = tags.into_iter().collect();
        if inserted.is_empty() {
            return Ok(());
        }

        let segment_scoped = inserted
            .iter()
            .filter(|tag| tag.descriptor().scope() == TagScope::MediaSegment)
            .count();
        let change = if inserted.iter().any(|tag| tag.descriptor().is_structural())
            || (segment_scoped != 0 && segment_scoped != inserted.len())
        {
            None
        } else {
            Some(PendingChange {
                index,
                delta: inserted.len() as isize,
                segment_scoped: segment_scoped != 0,
            })
        };

        Arc::make_mut(&mut self.tags).splice(index..index, inserted);
        self.record(change);
        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> Result<Tag> {
        let len = self.tags.len();
        let end = index.checked_add(1).ok_or(Error::IndexOutOfBounds { index, len })?;
        let mut removed = self.delete_range(index..end)?;
        removed
            .pop()
            .ok_or(Error::IndexOutOfBounds {
                index,
                len: self.tags.len(),
            })
    }

    pub fn delete_range(&mut self, range: Range<usize>) -> Result<Vec<Tag>> {
        let len = self.tags.len();
        if range.start > range.end {
            return Err(Error::IndexOutOfBounds {
                index: range.start,
                len,
            });
        }
        if range.end > len {
            return Err(Error::IndexOutOfBounds {
                index: range.end,
                len,
            });
        }
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let structural = self.tags[range.clone()]
            .iter()
            .any(|tag| tag.descriptor().is_structural());
        let change = (!structural).then(|| PendingChange {
            index: range.start,
            delta: -(range.len() as isize),
            segment_scoped: false,
        });

        let removed = Arc::make_mut(&mut self.tags).drain(range).collect();
        self.record(change);
        Ok(removed)
    }

    /// Replaces every tag with `f(tag)`. The structure is always rebuilt.
    pub fn transform(&mut self, f: impl FnMut(&Tag) -> Tag) {
        self.tags = Arc::new(self.tags.iter().map(f).collect());
        self.record(None);
    }

    /// Edits one tag in place.
    pub fn modify<R>(&mut self, index: usize, f: impl FnOnce(&mut Tag) -> R) -> Result<R> {
        let len = self.tags.len();
        let tag = Arc::make_mut(&mut self.tags)
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;

        let before = tag.descriptor();
        let result = f(tag);
        let after = tag.descriptor();

        if before.is_structural() || after.is_structural() || before.scope() != after.scope() {
            self.record(None);
        }
        Ok(result)
    }

    fn record(&mut self, change: Option<PendingChange>) {
        let cache = Arc::make_mut(&mut self.cache);
        let state = &mut cache.0.get_mut().state;
        *state = match (std::mem::replace(state, StructureState::DirtyRequiresRebuild), change) {
            (StructureState::DirtyRequiresRebuild, _) | (_, None) => StructureState::DirtyRequiresRebuild,
            (StructureState::Clean, Some(change)) => StructureState::DirtyWithChanges(vec![change]),
            (StructureState::DirtyWithChanges(mut changes), Some(change)) => {
                changes.push(change);
                StructureState::DirtyWithChanges(changes)
            }
        };
    }

    /// The current structure, patched or rebuilt if the tags changed since
    /// the last read.
    pub fn structure(&self) -> Arc<PlaylistStructure> {
        let mut cache = self.cache.0.lock();
        match std::mem::replace(&mut cache.state, StructureState::Clean) {
            StructureState::Clean => {}
            StructureState::DirtyWithChanges(changes) => {
                let structure = Arc::make_mut(&mut cache.structure);
                if changes.iter().all(|change| structure.apply_change(change)) {
                    debug!("patched playlist structure for {} edits", changes.len());
                } else {
                    debug!("edit crossed a structure boundary, rebuilding");
                    cache.structure = Arc::new(PlaylistStructure::build(&self.tags));
                }
            }
            StructureState::DirtyRequiresRebuild => {
                debug!("rebuilding playlist structure for {} tags", self.tags.len());
                cache.structure = Arc::new(PlaylistStructure::build(&self.tags));
            }
        }
        Arc::clone(&cache.structure)
    }

    pub fn header_tags(&self) -> &[Tag] {
        match self.structure().header {
            Some(range) => &self.tags[range.start..=range.end],
            None => &[],
        }
    }

    pub fn segment_group_tags(&self, group: usize) -> Option<&[Tag]> {
        let range = self.structure().segment_groups.get(group)?.range;
        Some(&self.tags[range.start..=range.end])
    }

    pub fn footer_tags(&self) -> &[Tag] {
        match self.structure().footer {
            Some(range) => &self.tags[range.start..=range.end],
            None => &[],
        }
    }
}

impl Default for TagSequence {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<Tag>> for TagSequence {
    fn from(tags: Vec<Tag>) -> Self {
        Self::new(tags)
    }
}

impl FromIterator<Tag> for TagSequence {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a TagSequence {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pantos::PantosTag;
    use crate::parse::parse_tags;
    use crate::registry::TagRegistry;
    use assert_matches::assert_matches;

    const PLAYLIST: &str = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXTINF:5,\na.ts\n#EXTINF:5,\nb.ts\n#EXT-X-ENDLIST\n";

    fn sequence(input: &str) -> TagSequence {
        TagSequence::new(parse_tags(&Arc::from(input), &TagRegistry::new()).unwrap())
    }

    fn state(sequence: &TagSequence) -> StructureState {
        sequence.cache.0.lock().state.clone()
    }

    #[test]
    fn starts_dirty_and_cleans_on_read() {
        let sequence = sequence(PLAYLIST);
        assert_eq!(StructureState::DirtyRequiresRebuild, state(&sequence));
        assert_eq!(2, sequence.structure().segment_groups.len());
        assert_eq!(StructureState::Clean, state(&sequence));
    }

    #[test]
    fn records_plain_edits_as_changes() {
        let mut sequence = sequence(PLAYLIST);
        sequence.structure();
        sequence.insert(2, [Tag::comment("# note")]).unwrap();
        sequence.delete(0).unwrap();
        assert_matches!(state(&sequence), StructureState::DirtyWithChanges(changes) if changes.len() == 2);
        assert_eq!(PlaylistStructure::build(sequence.tags()), *sequence.structure());
    }

    #[test]
    fn bad_deletes_report_the_offending_index() {
        let mut sequence = sequence(PLAYLIST);
        assert_matches!(sequence.delete(usize::MAX), Err(Error::IndexOutOfBounds { index: usize::MAX, len: 7 }));
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = sequence.delete_range(5..2);
        assert_matches!(reversed, Err(Error::IndexOutOfBounds { index: 5, len: 7 }));
        assert_matches!(sequence.delete_range(6..9), Err(Error::IndexOutOfBounds { index: 9, len: 7 }));
        assert_eq!(7, sequence.len());
    }

    #[test]
    fn structural_edits_force_a_rebuild() {
        let mut sequence = sequence(PLAYLIST);
        sequence.structure();
        sequence.insert(1, [Tag::comment("# a")]).unwrap();
        sequence.insert(4, [Tag::location("x.ts")]).unwrap();
        sequence.insert(1, [Tag::comment("# b")]).unwrap();
        assert_eq!(StructureState::DirtyRequiresRebuild, state(&sequence));
        assert_eq!(PlaylistStructure::build(sequence.tags()), *sequence.structure());
    }

    #[test]
    fn transform_forces_a_rebuild() {
        let mut sequence = sequence(PLAYLIST);
        sequence.structure();
        sequence.transform(Tag::clone);
        assert_eq!(StructureState::DirtyRequiresRebuild, state(&sequence));
    }

    #[test]
    fn modifying_a_divider_rebuilds() {
        let mut sequence = sequence(PLAYLIST);
        sequence.structure();
        sequence
            .modify(1, |tag| tag.set_value(crate::keys::VALUE, "6"))
            .unwrap()
            .unwrap();
        assert_eq!(StructureState::Clean, state(&sequence));

        sequence
            .modify(2, |tag| tag.set_value(crate::keys::DURATION, "7"))
            .unwrap()
            .unwrap();
        assert_eq!(StructureState::DirtyRequiresRebuild, state(&sequence));
        assert_eq!(Some(12.0), sequence.structure().duration().seconds());
    }

    #[test]
    fn rejects_out_of_bounds_edits() {
        let mut sequence = sequence(PLAYLIST);
        assert_matches!(sequence.insert(9, Vec::new()), Err(Error::IndexOutOfBounds { index: 9, len: 7 }));
        assert_matches!(sequence.delete(7), Err(Error::IndexOutOfBounds { .. }));
        assert_matches!(sequence.delete_range(3..9), Err(Error::IndexOutOfBounds { .. }));
        assert_matches!(sequence.modify(7, |_| ()), Err(Error::IndexOutOfBounds { .. }));
    }

    #[test]
    fn slices_regions() {
        let sequence = sequence(PLAYLIST);
        assert_eq!(2, sequence.header_tags().len());
        assert_eq!(Some("b.ts"), sequence.segment_group_tags(1).map(|tags| tags[1].body()));
        assert!(sequence.segment_group_tags(2).is_none());
        assert!(sequence.footer_tags()[0].descriptor().is(PantosTag::EndList));
    }
}
