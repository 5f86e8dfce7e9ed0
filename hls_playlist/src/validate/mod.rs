//! Checks a playlist against the rules of its kind.
//!
//! Every tag first goes through the validator its registry resolves, then the
//! whole playlist goes through the rule chain for its kind. Problems are
//! reported as [`ValidationIssue`]s, never as errors.

mod master;
mod rules;
mod tag;
mod variant;

pub use master::{GroupReferences, RenditionGroups, VariantUris};
pub use rules::{tags_with, FirstTagIsM3u, SingleVersion};
pub use tag::{DictionaryValidator, KeyRule, SingleValueValidator, TagValidator};
pub use variant::{KeyAttributes, SegmentDurations, SequenceTagsInHeader, TargetDuration};

use crate::registry::TagRegistry;
use crate::sequence::TagSequence;
use crate::structure::{PlaylistKind, PlaylistStructure};
use crate::tag::Tag;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub description: String,
    pub severity: IssueSeverity,
    /// The tag the issue was found on, when it concerns a single tag.
    pub tag_index: Option<usize>,
}

impl ValidationIssue {
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            severity: IssueSeverity::Error,
            tag_index: None,
        }
    }

    pub fn warning(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            severity: IssueSeverity::Warning,
            tag_index: None,
        }
    }

    pub fn at(mut self, tag_index: usize) -> Self {
        self.tag_index = Some(tag_index);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
        };
        match self.tag_index {
            Some(index) => write!(f, "{} (tag {}): {}", severity, index, self.description),
            None => write!(f, "{}: {}", severity, self.description),
        }
    }
}

/// A check that looks at the playlist as a whole.
pub trait PlaylistRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, tags: &[Tag], structure: &PlaylistStructure) -> Vec<ValidationIssue>;
}

/// An ordered list of playlist rules.
#[derive(Default)]
pub struct ValidatorChain {
    rules: Vec<Box<dyn PlaylistRule>>,
}

impl ValidatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn master() -> Self {
        let mut chain = Self::new();
        chain
            .push(FirstTagIsM3u)
            .push(SingleVersion)
            .push(RenditionGroups)
            .push(GroupReferences)
            .push(VariantUris);
        chain
    }

    pub fn variant() -> Self {
        let mut chain = Self::new();
        chain
            .push(FirstTagIsM3u)
            .push(SingleVersion)
            .push(TargetDuration)
            .push(SequenceTagsInHeader)
            .push(KeyAttributes)
            .push(SegmentDurations);
        chain
    }

    pub fn push(&mut self, rule: impl PlaylistRule + 'static) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn PlaylistRule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn check(&self, tags: &[Tag], structure: &PlaylistStructure) -> Vec<ValidationIssue> {
        self.rules()
            .flat_map(|rule| rule.check(tags, structure))
            .collect()
    }
}

impl fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules().map(|rule| rule.name()))
            .finish()
    }
}

#[derive(Debug)]
pub struct PlaylistValidator {
    master: ValidatorChain,
    variant: ValidatorChain,
}

impl PlaylistValidator {
    pub fn new(master: ValidatorChain, variant: ValidatorChain) -> Self {
        Self { master, variant }
    }

    pub fn chain(&self, kind: PlaylistKind) -> &ValidatorChain {
        match kind {
            PlaylistKind::Master => &self.master,
            PlaylistKind::Variant => &self.variant,
        }
    }

    pub fn chain_mut(&mut self, kind: PlaylistKind) -> &mut ValidatorChain {
        match kind {
            PlaylistKind::Master => &mut self.master,
            PlaylistKind::Variant => &mut self.variant,
        }
    }

    /// Runs the tag validators, then the chain for the playlist's kind. An
    /// empty result means no issues.
    pub fn validate(&self, sequence: &TagSequence, registry: &TagRegistry) -> Vec<ValidationIssue> {
        let mut issues: Vec<ValidationIssue> = sequence
            .iter()
            .enumerate()
            .flat_map(|(index, tag)| {
                validate_tag(tag, registry)
                    .into_iter()
                    .map(move |issue| issue.at(index))
            })
            .collect();

        let structure = sequence.structure();
        issues.extend(self.chain(structure.kind).check(sequence.tags(), &structure));
        issues
    }
}

impl Default for PlaylistValidator {
    fn default() -> Self {
        Self::new(ValidatorChain::master(), ValidatorChain::variant())
    }
}

/// Checks one tag with the validator the registry resolves for it.
pub fn validate_tag(tag: &Tag, registry: &TagRegistry) -> Vec<ValidationIssue> {
    registry
        .validator(&tag.descriptor())
        .map(|validator| validator.validate(tag))
        .unwrap_or_default()
}
