//! Serializing tags back to playlist text.

use crate::attributes::{self, AttributeValue};
use crate::descriptor::{Descriptor, TagKind};
use crate::error::{Error, Result};
use crate::keys;
use crate::registry::TagRegistry;
use crate::tag::Tag;

/// Writes the body of an edited tag. `out` already holds `#NAME:`.
pub trait TagWriter: Send + Sync {
    fn write(&self, tag: &Tag, out: &mut String) -> Result<()>;
}

fn push_value(out: &mut String, value: &AttributeValue) {
    if value.quoted {
        out.push('"');
        out.push_str(&value.value);
        out.push('"');
    } else {
        out.push_str(&value.value);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SingleValueWriter;

impl TagWriter for SingleValueWriter {
    fn write(&self, tag: &Tag, out: &mut String) -> Result<()> {
        if let Some(value) = tag.attributes().and_then(|a| a.get(keys::VALUE)) {
            push_value(out, value);
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct KeyValueWriter;

impl TagWriter for KeyValueWriter {
    fn write(&self, tag: &Tag, out: &mut String) -> Result<()> {
        if let Some(list) = tag.attributes() {
            out.push_str(&attributes::encode(list));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ArrayWriter;

impl TagWriter for ArrayWriter {
    fn write(&self, tag: &Tag, out: &mut String) -> Result<()> {
        let items: Vec<String> = tag
            .attributes()
            .into_iter()
            .flat_map(|list| list.values())
            .map(|value| {
                let mut item = String::new();
                push_value(&mut item, value);
                item
            })
            .collect();
        out.push_str(&attributes::encode_array(&items));
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct InfWriter;

impl TagWriter for InfWriter {
    fn write(&self, tag: &Tag, out: &mut String) -> Result<()> {
        let duration = tag.value(keys::DURATION).unwrap_or_default();
        let title = tag.value(keys::TITLE).unwrap_or_default();
        out.push_str(duration);
        out.push(',');
        out.push_str(title);
        Ok(())
    }
}

/// Appends the text of one tag, without a line break.
pub fn write_tag(tag: &Tag, registry: &TagRegistry, out: &mut String) -> Result<()> {
    let descriptor = tag.descriptor();
    match descriptor {
        Descriptor::Location | Descriptor::Comment => {
            out.push_str(tag.body());
            return Ok(());
        }
        _ => {}
    }

    out.push('#');
    out.push_str(tag.name().or(descriptor.name()).unwrap_or_default());

    let literal = !tag.is_dirty() || matches!(descriptor.kind(), TagKind::NoValue | TagKind::Special);
    if literal {
        if !tag.body().is_empty() {
            out.push(':');
            out.push_str(tag.body());
        }
        return Ok(());
    }

    let writer = registry
        .writer(&descriptor)
        .ok_or_else(|| Error::NoWriterForDirtyTag(descriptor.to_string()))?;
    out.push(':');
    writer.write(tag, out)
}

/// Writes every tag on its own line, with a trailing newline.
pub fn write_tags<'a>(tags: impl IntoIterator<Item = &'a Tag>, registry: &TagRegistry) -> Result<String> {
    let mut out = String::new();
    for tag in tags {
        write_tag(tag, registry, &mut out)?;
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::attributes::AttributeList;
    use crate::descriptor::{CustomTag, TagScope};
    use crate::pantos::PantosTag;
    use assert_matches::assert_matches;

    fn written(tag: &Tag) -> String {
        let mut out = String::new();
        write_tag(tag, &TagRegistry::new(), &mut out).unwrap();
        out
    }

    #[test]
    fn clean_tags_are_written_verbatim() {
        let registry = TagRegistry::new();
        let key = Tag::new(PantosTag::Key, "METHOD=AES-128, URI=\"k.key\"", &registry).unwrap();
        assert_eq!("#EXT-X-KEY:METHOD=AES-128, URI=\"k.key\"", written(&key));
        assert_eq!("#EXT-X-ENDLIST", written(&Tag::new(PantosTag::EndList, "", &registry).unwrap()));
        assert_eq!("seg.ts", written(&Tag::location("seg.ts")));
        assert_eq!("# note", written(&Tag::comment("# note")));
        assert_eq!("#EXT-X-CUE-OUT:30", written(&Tag::unknown("EXT-X-CUE-OUT", "30")));
    }

    #[test]
    fn dirty_tags_go_through_their_writer() {
        let registry = TagRegistry::new();
        let mut key = Tag::new(PantosTag::Key, "METHOD=AES-128, URI=\"k.key\"", &registry).unwrap();
        key.set_value(keys::URI, "k2.key").unwrap();
        assert_eq!("#EXT-X-KEY:METHOD=AES-128,URI=\"k2.key\"", written(&key));

        let mut inf = Tag::new(PantosTag::Inf, "5,", &registry).unwrap();
        inf.set_value(keys::TITLE, "intro").unwrap();
        assert_eq!("#EXTINF:5,intro", written(&inf));

        let mut version = Tag::new(PantosTag::Version, "3", &registry).unwrap();
        version.set_value(keys::VALUE, "7").unwrap();
        assert_eq!("#EXT-X-VERSION:7", written(&version));
    }

    #[test]
    fn writes_arrays_in_order() {
        let list: AttributeList = [("0", AttributeValue::new("a")), ("1", AttributeValue::quoted("b,c"))]
            .into_iter()
            .collect();
        let tag = Tag::with_attributes(PantosTag::Version, list).unwrap();
        let mut out = String::new();
        ArrayWriter.write(&tag, &mut out).unwrap();
        assert_eq!("a,\"b,c\"", out);
    }

    #[test]
    fn dirty_tag_without_writer_fails() {
        const CUE: CustomTag = CustomTag::new("scte", "EXT-X-CUE", TagScope::WholePlaylist, TagKind::KeyValue);
        let tag = Tag::with_attributes(CUE, AttributeList::new()).unwrap();
        let mut out = String::new();
        assert_matches!(
            write_tag(&tag, &TagRegistry::new(), &mut out),
            Err(Error::NoWriterForDirtyTag(name)) if name == "#EXT-X-CUE"
        );
    }

    #[test]
    fn joins_lines_with_trailing_newline() {
        let tags = vec![Tag::location("a.ts"), Tag::location("b.ts")];
        assert_eq!("a.ts\nb.ts\n", write_tags(&tags, &TagRegistry::new()).unwrap());
    }
}
