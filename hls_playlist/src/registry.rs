use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::pantos::PantosFamily;
use crate::parse::TagParser;
use crate::validate::TagValidator;
use crate::write::TagWriter;
use std::fmt;
use std::sync::Arc;

/// A set of tags that knows how to parse, write and validate its members.
pub trait TagFamily: Send + Sync {
    fn name(&self) -> &'static str;

    /// Recognizes a tag name, without the leading `#`.
    fn descriptor(&self, name: &str) -> Option<Descriptor>;

    fn parser(&self, descriptor: &Descriptor) -> Option<&dyn TagParser>;

    fn writer(&self, descriptor: &Descriptor) -> Option<&dyn TagWriter>;

    fn validator(&self, descriptor: &Descriptor) -> Option<&dyn TagValidator>;
}

/// Ordered tag families, asked in turn until one answers.
#[derive(Clone)]
pub struct TagRegistry {
    families: Vec<Arc<dyn TagFamily>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self {
            families: vec![Arc::new(PantosFamily)],
        }
    }

    pub fn register(&mut self, family: impl TagFamily + 'static) {
        self.families.push(Arc::new(family));
    }

    /// Drops every registered family except the built-in one.
    pub fn unregister_all(&mut self) {
        self.families.truncate(1);
    }

    pub fn families(&self) -> impl Iterator<Item = &dyn TagFamily> {
        self.families.iter().map(|family| family.as_ref())
    }

    pub fn descriptor(&self, name: &str) -> Option<Descriptor> {
        self.families().find_map(|family| family.descriptor(name))
    }

    pub fn parser(&self, descriptor: &Descriptor) -> Result<&dyn TagParser> {
        self.families()
            .find_map(|family| family.parser(descriptor))
            .ok_or_else(|| Error::NoParser(descriptor.to_string()))
    }

    pub fn writer(&self, descriptor: &Descriptor) -> Option<&dyn TagWriter> {
        self.families().find_map(|family| family.writer(descriptor))
    }

    pub fn validator(&self, descriptor: &Descriptor) -> Option<&dyn TagValidator> {
        self.families().find_map(|family| family.validator(descriptor))
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.families().map(|family| family.name()))
            .finish()
    }
}
