use crate::attributes::{AttributeList, AttributeValue};
use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::keys;
use crate::pantos::PantosTag;
use crate::registry::TagRegistry;
use crate::text::TextSlice;
use crate::time::MediaTime;
use crate::value::FromAttributeValue;
use std::hash::{Hash, Hasher};

/// One line of a playlist.
///
/// Value-bearing tags carry the attributes their parser produced. Comments,
/// URIs and unknown tags keep only their text. Two tags compare equal when
/// their descriptor, name and body text match, whatever their attributes.
#[derive(Clone, Debug)]
pub struct Tag {
    descriptor: Descriptor,
    name: Option<TextSlice>,
    body: TextSlice,
    attributes: Option<AttributeList>,
    duration: MediaTime,
    dirty: bool,
}

impl Tag {
    pub(crate) fn from_parts(
        descriptor: Descriptor,
        name: Option<TextSlice>,
        body: TextSlice,
        attributes: Option<AttributeList>,
        parsed_duration: Option<f64>,
    ) -> Self {
        let mut tag = Self {
            descriptor,
            name,
            body,
            attributes,
            duration: MediaTime::INVALID,
            dirty: false,
        };
        tag.duration = tag.divider_duration(parsed_duration);
        tag
    }

    /// Builds a tag from its body text, parsing it with the registry's parser
    /// for `descriptor`. The body of a no-value tag is ignored. Unknown tags
    /// carry their own name and are built with [`Tag::unknown`].
    pub fn new(descriptor: impl Into<Descriptor>, body: &str, registry: &TagRegistry) -> Result<Self> {
        let descriptor = descriptor.into();
        let name = descriptor.name().map(TextSlice::from);
        let kind = descriptor.kind();

        if kind.has_attributes() {
            let attributes = registry.parser(&descriptor)?.parse(&descriptor, body)?;
            Ok(Self::from_parts(descriptor, name, body.into(), Some(attributes), None))
        } else {
            match descriptor {
                Descriptor::Location => Ok(Self::location(body)),
                Descriptor::Comment => Ok(Self::comment(body)),
                Descriptor::Unknown => Err(Error::NoParser(descriptor.to_string())),
                _ => Ok(Self::from_parts(descriptor, name, TextSlice::default(), None, None)),
            }
        }
    }

    /// Builds an edited tag from attributes. It is written through the
    /// registry's writer for `descriptor`.
    pub fn with_attributes(descriptor: impl Into<Descriptor>, attributes: AttributeList) -> Result<Self> {
        let descriptor = descriptor.into();
        if !descriptor.kind().has_attributes() {
            return Err(Error::NoAttributes(descriptor.to_string()));
        }

        let mut tag = Self::from_parts(
            descriptor,
            descriptor.name().map(TextSlice::from),
            TextSlice::default(),
            Some(attributes),
            None,
        );
        tag.dirty = true;
        Ok(tag)
    }

    pub fn location(uri: impl Into<TextSlice>) -> Self {
        Self::from_parts(Descriptor::Location, None, uri.into(), None, None)
    }

    /// `text` is the whole line, leading `#` included.
    pub fn comment(text: impl Into<TextSlice>) -> Self {
        Self::from_parts(Descriptor::Comment, None, text.into(), None, None)
    }

    pub fn unknown(name: impl Into<TextSlice>, body: impl Into<TextSlice>) -> Self {
        Self::from_parts(Descriptor::Unknown, Some(name.into()), body.into(), None, None)
    }

    pub fn descriptor(&self) -> Descriptor {
        self.descriptor
    }

    /// The tag name without the leading `#`. `None` for comments and URIs.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn attributes(&self) -> Option<&AttributeList> {
        self.attributes.as_ref()
    }

    /// The segment duration; invalid for anything but `#EXTINF`.
    pub fn duration(&self) -> MediaTime {
        self.duration
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_location(&self) -> bool {
        self.descriptor == Descriptor::Location
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.attributes.as_ref()?.value(key)
    }

    pub fn typed_value<T: FromAttributeValue>(&self, key: &str) -> Option<T> {
        T::from_attribute_value(self.value(key)?)
    }

    /// The value of a single-value tag.
    pub fn single_value(&self) -> Option<&str> {
        self.value(keys::VALUE)
    }

    /// Sets `key`, keeping the quoting of any value it replaces.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let attributes = self.attributes_mut()?;
        let quoted = attributes.get(key).map_or(false, |v| v.quoted);
        attributes.insert(
            key,
            AttributeValue {
                value: value.into(),
                quoted,
            },
        );
        self.edited(key);
        Ok(())
    }

    pub fn set_quoted_value(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.attributes_mut()?
            .insert(key, AttributeValue::quoted(value));
        self.edited(key);
        Ok(())
    }

    pub fn remove_value(&mut self, key: &str) -> Result<Option<AttributeValue>> {
        let removed = self.attributes_mut()?.remove(key);
        if removed.is_some() {
            self.edited(key);
        }
        Ok(removed)
    }

    fn attributes_mut(&mut self) -> Result<&mut AttributeList> {
        let descriptor = self.descriptor;
        self.attributes
            .as_mut()
            .ok_or_else(|| Error::NoAttributes(descriptor.to_string()))
    }

    fn edited(&mut self, key: &str) {
        self.dirty = true;
        if key == keys::DURATION {
            self.duration = self.divider_duration(None);
        }
    }

    fn divider_duration(&self, parsed: Option<f64>) -> MediaTime {
        if !self.descriptor.is(PantosTag::Inf) {
            return MediaTime::INVALID;
        }
        self.typed_value::<MediaTime>(keys::DURATION)
            .or_else(|| parsed.map(MediaTime::from_seconds))
            .unwrap_or(MediaTime::INVALID)
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && self.name == other.name && self.body == other.body
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.descriptor.hash(state);
        self.name.hash(state);
        self.body.hash(state);
    }
}
