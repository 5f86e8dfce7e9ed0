//! Tag body parsers and the ingestion path from tokenizer lines to tags.

use crate::attributes::{self, AttributeList, AttributeValue};
use crate::descriptor::{Descriptor, TagKind};
use crate::error::{Error, Result};
use crate::keys;
use crate::registry::TagRegistry;
use crate::tag::Tag;
use crate::text::TextSlice;
use hls_parser::Line;
use log::warn;
use std::sync::Arc;

/// Turns a tag body into attributes.
pub trait TagParser: Send + Sync {
    fn parse(&self, descriptor: &Descriptor, body: &str) -> Result<AttributeList>;
}

/// Stores the whole body under [`keys::VALUE`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleValueParser;

impl TagParser for SingleValueParser {
    fn parse(&self, _: &Descriptor, body: &str) -> Result<AttributeList> {
        let body = body.trim();
        if body.is_empty() {
            return Ok(AttributeList::new());
        }
        Ok(std::iter::once((keys::VALUE, value_token(body))).collect())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct KeyValueParser;

impl TagParser for KeyValueParser {
    fn parse(&self, _: &Descriptor, body: &str) -> Result<AttributeList> {
        attributes::decode(body)
    }
}

/// Stores list items under their position, `"0"`, `"1"` and so on.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArrayParser;

impl TagParser for ArrayParser {
    fn parse(&self, _: &Descriptor, body: &str) -> Result<AttributeList> {
        Ok(attributes::decode_array(body)
            .iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), value_token(item)))
            .collect())
    }
}

/// `<duration>,[<title>]`
#[derive(Clone, Copy, Debug, Default)]
pub struct InfParser;

impl TagParser for InfParser {
    fn parse(&self, _: &Descriptor, body: &str) -> Result<AttributeList> {
        let (duration, title) = body.split_once(',').unwrap_or((body, ""));
        let mut list = AttributeList::new();
        let duration = duration.trim();
        if !duration.is_empty() {
            list.insert(keys::DURATION, AttributeValue::new(duration));
        }
        let title = title.trim();
        if !title.is_empty() {
            list.insert(keys::TITLE, AttributeValue::new(title));
        }
        Ok(list)
    }
}

fn value_token(token: &str) -> AttributeValue {
    match token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => AttributeValue::quoted(inner),
        None => AttributeValue::new(token),
    }
}

/// Tokenizes `buffer` and builds one tag per line.
///
/// A tag whose body cannot be parsed is kept as an unknown tag with its raw
/// text, so the rest of the playlist still loads.
pub fn parse_tags(buffer: &Arc<str>, registry: &TagRegistry) -> Result<Vec<Tag>> {
    let mut tags = Vec::new();
    for line in hls_parser::lines(buffer) {
        tags.push(ingest(buffer, line?, registry)?);
    }
    Ok(tags)
}

fn ingest(buffer: &Arc<str>, line: Line<'_>, registry: &TagRegistry) -> Result<Tag> {
    let slice = |text: &str| TextSlice::in_buffer(buffer, text);

    let (name, body, parsed_duration) = match line {
        Line::Uri(uri) => return Ok(Tag::location(slice(uri))),
        Line::Comment(text) => return Ok(Tag::comment(slice(text))),
        Line::Tag { name } => (name, "", None),
        Line::TagWithBody { name, body } => (name, body, None),
        Line::Duration {
            name,
            duration,
            body,
        } => (name, body, duration),
    };

    let descriptor = match registry.descriptor(name) {
        Some(descriptor) => descriptor,
        None => return Ok(Tag::unknown(slice(name), slice(body))),
    };

    let attributes = match descriptor.kind() {
        TagKind::NoValue if !body.trim().is_empty() => {
            warn!("#{} takes no value, keeping {:?} as an unknown tag", name, body);
            return Ok(Tag::unknown(slice(name), slice(body)));
        }
        TagKind::NoValue | TagKind::Special => None,
        TagKind::SingleValue | TagKind::Array | TagKind::KeyValue => {
            match registry.parser(&descriptor)?.parse(&descriptor, body) {
                Ok(attributes) => Some(attributes),
                Err(Error::MalformedAttributeList(text)) => {
                    warn!("#{} has a malformed attribute list {:?}, keeping it as an unknown tag", name, text);
                    return Ok(Tag::unknown(slice(name), slice(body)));
                }
                Err(e) => return Err(e),
            }
        }
    };

    Ok(Tag::from_parts(
        descriptor,
        Some(slice(name)),
        slice(body),
        attributes,
        parsed_duration,
    ))
}
