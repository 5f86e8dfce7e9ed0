//! Parse, inspect, edit, validate and write HLS playlists.
//!
//! A [`Playlist`] holds its tags in a [`TagSequence`], which keeps the
//! playlist's [`PlaylistStructure`] current across edits. Everything that
//! needs to know what a tag means takes a [`TagRegistry`].

mod attributes;
mod descriptor;
mod error;
pub mod keys;
mod pantos;
mod parse;
mod playlist;
mod registry;
mod sequence;
mod structure;
mod tag;
mod text;
mod time;
pub mod validate;
mod value;
mod write;

pub use attributes::{decode, decode_array, encode, encode_array, AttributeList, AttributeValue};
pub use descriptor::{CustomTag, Descriptor, TagKind, TagScope};
pub use error::{Error, Result};
pub use pantos::{PantosFamily, PantosTag};
pub use parse::{parse_tags, ArrayParser, InfParser, KeyValueParser, SingleValueParser, TagParser};
pub use playlist::Playlist;
pub use registry::{TagFamily, TagRegistry};
pub use sequence::TagSequence;
pub use structure::{IndexRange, PlaylistKind, PlaylistStructure, SegmentGroup, TagSpan};
pub use tag::Tag;
pub use text::TextSlice;
pub use time::{MediaTime, MediaTimeRange};
pub use validate::{IssueSeverity, PlaylistValidator, ValidationIssue, ValidatorChain};
pub use value::{
    ByteRange, ClosedCaptions, Codecs, EncryptionMethod, FromAttributeValue, HdcpLevel, HexSequence,
    MediaType, PlaylistType, Resolution, ValueType,
};
pub use write::{write_tag, write_tags, ArrayWriter, InfWriter, KeyValueWriter, SingleValueWriter, TagWriter};
