use crate::pantos::PantosTag;
use serde::Serialize;
use std::fmt;

/// The region of a playlist a tag applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagScope {
    /// Applies to the next media segment (or variant, in a master playlist).
    MediaSegment,
    WholePlaylist,
    /// Applies to every segment until the next tag of the same kind.
    MediaSpan,
    Unknown,
}

/// The shape of a tag's body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagKind {
    NoValue,
    SingleValue,
    Array,
    KeyValue,
    /// Comments, URIs and unrecognized tags.
    Special,
}

impl TagKind {
    /// Whether tags of this kind carry a parsed attribute store.
    pub fn has_attributes(self) -> bool {
        matches!(self, TagKind::SingleValue | TagKind::Array | TagKind::KeyValue)
    }
}

/// A tag defined outside the built-in vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CustomTag {
    pub family: &'static str,
    pub name: &'static str,
    pub scope: TagScope,
    pub kind: TagKind,
}

impl CustomTag {
    pub const fn new(family: &'static str, name: &'static str, scope: TagScope, kind: TagKind) -> Self {
        Self {
            family,
            name,
            scope,
            kind,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Descriptor {
    Pantos(PantosTag),
    Custom(CustomTag),
    Unknown,
    Comment,
    Location,
}

impl Descriptor {
    /// The tag name without its leading `#`, for named descriptors.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Descriptor::Pantos(tag) => Some(tag.name()),
            Descriptor::Custom(tag) => Some(tag.name),
            Descriptor::Unknown | Descriptor::Comment | Descriptor::Location => None,
        }
    }

    pub fn scope(&self) -> TagScope {
        match self {
            Descriptor::Pantos(tag) => tag.scope(),
            Descriptor::Custom(tag) => tag.scope,
            Descriptor::Location => TagScope::MediaSegment,
            Descriptor::Unknown | Descriptor::Comment => TagScope::Unknown,
        }
    }

    pub fn kind(&self) -> TagKind {
        match self {
            Descriptor::Pantos(tag) => tag.kind(),
            Descriptor::Custom(tag) => tag.kind,
            Descriptor::Unknown | Descriptor::Comment | Descriptor::Location => TagKind::Special,
        }
    }

    pub fn is(&self, tag: PantosTag) -> bool {
        *self == Descriptor::Pantos(tag)
    }

    /// Whether adding or removing a tag with this descriptor can move the
    /// boundaries, numbering or spans of the playlist structure.
    pub fn is_structural(&self) -> bool {
        if self.scope() == TagScope::MediaSpan || *self == Descriptor::Location {
            return true;
        }
        matches!(
            self,
            Descriptor::Pantos(
                PantosTag::MediaSequence
                    | PantosTag::Inf
                    | PantosTag::Discontinuity
                    | PantosTag::StreamInf
                    | PantosTag::IFrameStreamInf
            )
        )
    }
}

impl From<PantosTag> for Descriptor {
    fn from(tag: PantosTag) -> Self {
        Descriptor::Pantos(tag)
    }
}

impl From<CustomTag> for Descriptor {
    fn from(tag: CustomTag) -> Self {
        Descriptor::Custom(tag)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Pantos(tag) => write!(f, "#{}", tag.name()),
            Descriptor::Custom(tag) => write!(f, "#{}", tag.name),
            Descriptor::Unknown => f.write_str("unknown tag"),
            Descriptor::Comment => f.write_str("comment"),
            Descriptor::Location => f.write_str("location"),
        }
    }
}
