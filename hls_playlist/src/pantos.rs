//! The built-in tag vocabulary of HTTP Live Streaming (RFC 8216).

use crate::descriptor::{Descriptor, TagKind, TagScope};
use crate::keys;
use crate::parse::{ArrayParser, InfParser, KeyValueParser, SingleValueParser, TagParser};
use crate::registry::TagFamily;
use crate::validate::{DictionaryValidator, KeyRule, SingleValueValidator, TagValidator};
use crate::value::ValueType;
use crate::write::{ArrayWriter, InfWriter, KeyValueWriter, SingleValueWriter, TagWriter};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PantosTag {
    M3u,
    Version,
    Inf,
    ByteRange,
    Discontinuity,
    Key,
    Map,
    ProgramDateTime,
    DateRange,
    TargetDuration,
    MediaSequence,
    DiscontinuitySequence,
    EndList,
    PlaylistType,
    IFramesOnly,
    AllowCache,
    Media,
    StreamInf,
    IFrameStreamInf,
    SessionData,
    SessionKey,
    IndependentSegments,
    Start,
}

impl PantosTag {
    pub const ALL: &'static [PantosTag] = &[
        PantosTag::M3u,
        PantosTag::Version,
        PantosTag::Inf,
        PantosTag::ByteRange,
        PantosTag::Discontinuity,
        PantosTag::Key,
        PantosTag::Map,
        PantosTag::ProgramDateTime,
        PantosTag::DateRange,
        PantosTag::TargetDuration,
        PantosTag::MediaSequence,
        PantosTag::DiscontinuitySequence,
        PantosTag::EndList,
        PantosTag::PlaylistType,
        PantosTag::IFramesOnly,
        PantosTag::AllowCache,
        PantosTag::Media,
        PantosTag::StreamInf,
        PantosTag::IFrameStreamInf,
        PantosTag::SessionData,
        PantosTag::SessionKey,
        PantosTag::IndependentSegments,
        PantosTag::Start,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PantosTag::M3u => "EXTM3U",
            PantosTag::Version => "EXT-X-VERSION",
            PantosTag::Inf => "EXTINF",
            PantosTag::ByteRange => "EXT-X-BYTERANGE",
            PantosTag::Discontinuity => "EXT-X-DISCONTINUITY",
            PantosTag::Key => "EXT-X-KEY",
            PantosTag::Map => "EXT-X-MAP",
            PantosTag::ProgramDateTime => "EXT-X-PROGRAM-DATE-TIME",
            PantosTag::DateRange => "EXT-X-DATERANGE",
            PantosTag::TargetDuration => "EXT-X-TARGETDURATION",
            PantosTag::MediaSequence => "EXT-X-MEDIA-SEQUENCE",
            PantosTag::DiscontinuitySequence => "EXT-X-DISCONTINUITY-SEQUENCE",
            PantosTag::EndList => "EXT-X-ENDLIST",
            PantosTag::PlaylistType => "EXT-X-PLAYLIST-TYPE",
            PantosTag::IFramesOnly => "EXT-X-I-FRAMES-ONLY",
            PantosTag::AllowCache => "EXT-X-ALLOW-CACHE",
            PantosTag::Media => "EXT-X-MEDIA",
            PantosTag::StreamInf => "EXT-X-STREAM-INF",
            PantosTag::IFrameStreamInf => "EXT-X-I-FRAME-STREAM-INF",
            PantosTag::SessionData => "EXT-X-SESSION-DATA",
            PantosTag::SessionKey => "EXT-X-SESSION-KEY",
            PantosTag::IndependentSegments => "EXT-X-INDEPENDENT-SEGMENTS",
            PantosTag::Start => "EXT-X-START",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tag| tag.name() == name)
    }

    pub fn scope(self) -> TagScope {
        match self {
            PantosTag::Inf
            | PantosTag::ByteRange
            | PantosTag::Discontinuity
            | PantosTag::ProgramDateTime
            | PantosTag::StreamInf => TagScope::MediaSegment,
            PantosTag::Key | PantosTag::Map => TagScope::MediaSpan,
            _ => TagScope::WholePlaylist,
        }
    }

    pub fn kind(self) -> TagKind {
        match self {
            PantosTag::M3u
            | PantosTag::Discontinuity
            | PantosTag::EndList
            | PantosTag::IFramesOnly
            | PantosTag::IndependentSegments => TagKind::NoValue,
            PantosTag::Version
            | PantosTag::ByteRange
            | PantosTag::ProgramDateTime
            | PantosTag::TargetDuration
            | PantosTag::MediaSequence
            | PantosTag::DiscontinuitySequence
            | PantosTag::PlaylistType
            | PantosTag::AllowCache => TagKind::SingleValue,
            PantosTag::Inf
            | PantosTag::Key
            | PantosTag::Map
            | PantosTag::DateRange
            | PantosTag::Media
            | PantosTag::StreamInf
            | PantosTag::IFrameStreamInf
            | PantosTag::SessionData
            | PantosTag::SessionKey
            | PantosTag::Start => TagKind::KeyValue,
        }
    }
}

static INTEGER: SingleValueValidator = SingleValueValidator::new(ValueType::Integer);
static BOOLEAN: SingleValueValidator = SingleValueValidator::new(ValueType::Boolean);
static DATE: SingleValueValidator = SingleValueValidator::new(ValueType::Date);
static BYTE_RANGE: SingleValueValidator = SingleValueValidator::new(ValueType::ByteRange);
static PLAYLIST_TYPE: SingleValueValidator = SingleValueValidator::new(ValueType::PlaylistType);

static INF: DictionaryValidator = DictionaryValidator::new(&[
    KeyRule::mandatory(keys::DURATION, ValueType::Duration),
    KeyRule::optional(keys::TITLE, ValueType::String),
]);

static KEY: DictionaryValidator = DictionaryValidator::new(&[
    KeyRule::mandatory(keys::METHOD, ValueType::EncryptionMethod),
    KeyRule::optional(keys::URI, ValueType::String),
    KeyRule::optional(keys::IV, ValueType::HexSequence),
    KeyRule::optional(keys::KEYFORMAT, ValueType::String),
    KeyRule::optional(keys::KEYFORMATVERSIONS, ValueType::String),
]);

static MAP: DictionaryValidator = DictionaryValidator::new(&[
    KeyRule::mandatory(keys::URI, ValueType::String),
    KeyRule::optional(keys::BYTERANGE, ValueType::ByteRange),
]);

static DATE_RANGE: DictionaryValidator = DictionaryValidator::new(&[
    KeyRule::mandatory(keys::ID, ValueType::String),
    KeyRule::mandatory(keys::START_DATE, ValueType::Date),
    KeyRule::optional(keys::CLASS, ValueType::String),
    KeyRule::optional(keys::END_DATE, ValueType::Date),
    KeyRule::optional(keys::DURATION, ValueType::Float),
    KeyRule::optional(keys::PLANNED_DURATION, ValueType::Float),
]);

static MEDIA: DictionaryValidator = DictionaryValidator::new(&[
    KeyRule::mandatory(keys::TYPE, ValueType::MediaType),
    KeyRule::mandatory(keys::GROUP_ID, ValueType::String),
    KeyRule::mandatory(keys::NAME, ValueType::String),
    KeyRule::optional(keys::URI, ValueType::String),
    KeyRule::optional(keys::LANGUAGE, ValueType::String),
    KeyRule::optional(keys::ASSOC_LANGUAGE, ValueType::String),
    KeyRule::optional(keys::DEFAULT, ValueType::Boolean),
    KeyRule::optional(keys::AUTOSELECT, ValueType::Boolean),
    KeyRule::optional(keys::FORCED, ValueType::Boolean),
    KeyRule::optional(keys::INSTREAM_ID, ValueType::String),
    KeyRule::optional(keys::CHARACTERISTICS, ValueType::String),
    KeyRule::optional(keys::CHANNELS, ValueType::String),
]);

static STREAM_INF: DictionaryValidator = DictionaryValidator::new(&[
    KeyRule::mandatory(keys::BANDWIDTH, ValueType::Integer),
    KeyRule::optional(keys::AVERAGE_BANDWIDTH, ValueType::Integer),
    KeyRule::optional(keys::PROGRAM_ID, ValueType::Integer),
    KeyRule::optional(keys::CODECS, ValueType::Codecs),
    KeyRule::optional(keys::RESOLUTION, ValueType::Resolution),
    KeyRule::optional(keys::FRAME_RATE, ValueType::Float),
    KeyRule::optional(keys::HDCP_LEVEL, ValueType::HdcpLevel),
    KeyRule::optional(keys::AUDIO, ValueType::String),
    KeyRule::optional(keys::VIDEO, ValueType::String),
    KeyRule::optional(keys::SUBTITLES, ValueType::String),
    KeyRule::optional(keys::CLOSED_CAPTIONS, ValueType::ClosedCaptions),
]);

static I_FRAME_STREAM_INF: DictionaryValidator = DictionaryValidator::new(&[
    KeyRule::mandatory(keys::BANDWIDTH, ValueType::Integer),
    KeyRule::mandatory(keys::URI, ValueType::String),
    KeyRule::optional(keys::AVERAGE_BANDWIDTH, ValueType::Integer),
    KeyRule::optional(keys::PROGRAM_ID, ValueType::Integer),
    KeyRule::optional(keys::CODECS, ValueType::Codecs),
    KeyRule::optional(keys::RESOLUTION, ValueType::Resolution),
    KeyRule::optional(keys::HDCP_LEVEL, ValueType::HdcpLevel),
    KeyRule::optional(keys::VIDEO, ValueType::String),
]);

static SESSION_DATA: DictionaryValidator = DictionaryValidator::new(&[
    KeyRule::mandatory(keys::DATA_ID, ValueType::String),
    KeyRule::optional(keys::VALUE, ValueType::String),
    KeyRule::optional(keys::URI, ValueType::String),
    KeyRule::optional(keys::LANGUAGE, ValueType::String),
]);

static START: DictionaryValidator = DictionaryValidator::new(&[
    KeyRule::mandatory(keys::TIME_OFFSET, ValueType::Float),
    KeyRule::optional(keys::PRECISE, ValueType::Boolean),
]);

/// Resolves the tags every playlist may use.
#[derive(Clone, Copy, Debug, Default)]
pub struct PantosFamily;

impl TagFamily for PantosFamily {
    fn name(&self) -> &'static str {
        "pantos"
    }

    fn descriptor(&self, name: &str) -> Option<Descriptor> {
        PantosTag::from_name(name).map(Descriptor::Pantos)
    }

    fn parser(&self, descriptor: &Descriptor) -> Option<&dyn TagParser> {
        let Descriptor::Pantos(tag) = descriptor else {
            return None;
        };
        let parser: &dyn TagParser = match (tag, tag.kind()) {
            (PantosTag::Inf, _) => &InfParser,
            (_, TagKind::SingleValue) => &SingleValueParser,
            (_, TagKind::Array) => &ArrayParser,
            (_, TagKind::KeyValue) => &KeyValueParser,
            (_, TagKind::NoValue | TagKind::Special) => return None,
        };
        Some(parser)
    }

    fn writer(&self, descriptor: &Descriptor) -> Option<&dyn TagWriter> {
        let Descriptor::Pantos(tag) = descriptor else {
            return None;
        };
        let writer: &dyn TagWriter = match (tag, tag.kind()) {
            (PantosTag::Inf, _) => &InfWriter,
            (_, TagKind::SingleValue) => &SingleValueWriter,
            (_, TagKind::Array) => &ArrayWriter,
            (_, TagKind::KeyValue) => &KeyValueWriter,
            (_, TagKind::NoValue | TagKind::Special) => return None,
        };
        Some(writer)
    }

    fn validator(&self, descriptor: &Descriptor) -> Option<&dyn TagValidator> {
        let Descriptor::Pantos(tag) = descriptor else {
            return None;
        };
        let validator: &dyn TagValidator = match tag {
            PantosTag::Version
            | PantosTag::TargetDuration
            | PantosTag::MediaSequence
            | PantosTag::DiscontinuitySequence => &INTEGER,
            PantosTag::AllowCache => &BOOLEAN,
            PantosTag::ProgramDateTime => &DATE,
            PantosTag::ByteRange => &BYTE_RANGE,
            PantosTag::PlaylistType => &PLAYLIST_TYPE,
            PantosTag::Inf => &INF,
            PantosTag::Key | PantosTag::SessionKey => &KEY,
            PantosTag::Map => &MAP,
            PantosTag::DateRange => &DATE_RANGE,
            PantosTag::Media => &MEDIA,
            PantosTag::StreamInf => &STREAM_INF,
            PantosTag::IFrameStreamInf => &I_FRAME_STREAM_INF,
            PantosTag::SessionData => &SESSION_DATA,
            PantosTag::Start => &START,
            PantosTag::M3u
            | PantosTag::Discontinuity
            | PantosTag::EndList
            | PantosTag::IFramesOnly
            | PantosTag::IndependentSegments => return None,
        };
        Some(validator)
    }
}
