//! Typed views over attribute value strings.

use crate::time::MediaTime;
use chrono::{DateTime, FixedOffset};
use nom::{
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map, map_res, opt},
    sequence::{pair, preceded, separated_pair},
    IResult,
};
use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::Deserialize;
use std::fmt;

/// Failable conversion from an attribute value string.
pub trait FromAttributeValue: Sized {
    fn from_attribute_value(value: &str) -> Option<Self>;
}

/// Reads a SCREAMING-KEBAB-CASE keyword through the enum's serde names.
fn from_keyword<T: DeserializeOwned>(value: &str) -> Option<T> {
    let deserializer: StrDeserializer<'_, ValueError> = value.into_deserializer();
    T::deserialize(deserializer).ok()
}

impl FromAttributeValue for u64 {
    fn from_attribute_value(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl FromAttributeValue for i64 {
    fn from_attribute_value(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl FromAttributeValue for f64 {
    fn from_attribute_value(value: &str) -> Option<Self> {
        value.parse().ok().filter(|f: &f64| f.is_finite())
    }
}

impl FromAttributeValue for String {
    fn from_attribute_value(value: &str) -> Option<Self> {
        Some(value.to_string())
    }
}

impl FromAttributeValue for bool {
    fn from_attribute_value(value: &str) -> Option<Self> {
        match value {
            "YES" => Some(true),
            "NO" => Some(false),
            _ => None,
        }
    }
}

impl FromAttributeValue for DateTime<FixedOffset> {
    fn from_attribute_value(value: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(value).ok()
    }
}

impl FromAttributeValue for MediaTime {
    fn from_attribute_value(value: &str) -> Option<Self> {
        MediaTime::from_decimal_str(value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u64,
    pub height: u64,
}

fn integer(i: &str) -> IResult<&str, u64> {
    map_res(digit1, str::parse)(i)
}

fn resolution(i: &str) -> IResult<&str, Resolution> {
    map(
        separated_pair(integer, one_of("xX"), integer),
        |(width, height)| Resolution { width, height },
    )(i)
}

fn byte_range(i: &str) -> IResult<&str, ByteRange> {
    map(
        pair(integer, opt(preceded(char('@'), integer))),
        |(length, offset)| ByteRange { length, offset },
    )(i)
}

impl FromAttributeValue for Resolution {
    fn from_attribute_value(value: &str) -> Option<Self> {
        all_consuming(resolution)(value).ok().map(|(_, resolution)| resolution)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Codecs(pub Vec<String>);

impl FromAttributeValue for Codecs {
    fn from_attribute_value(value: &str) -> Option<Self> {
        let codecs: Vec<String> = value.split(',').map(|s| s.trim().to_string()).collect();
        if codecs.iter().any(String::is_empty) {
            return None;
        }
        Some(Self(codecs))
    }
}

/// `0x`-prefixed hexadecimal bytes, as used by `IV`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HexSequence(pub Vec<u8>);

impl FromAttributeValue for HexSequence {
    fn from_attribute_value(value: &str) -> Option<Self> {
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))?;
        if digits.is_empty() {
            return None;
        }
        let bytes = if digits.len() % 2 == 1 {
            hex::decode(format!("0{}", digits))
        } else {
            hex::decode(digits)
        };
        bytes.ok().map(Self)
    }
}

/// `<length>[@<offset>]`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub length: u64,
    pub offset: Option<u64>,
}

impl FromAttributeValue for ByteRange {
    fn from_attribute_value(value: &str) -> Option<Self> {
        all_consuming(byte_range)(value).ok().map(|(_, range)| range)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum MediaType {
    Audio,
    Video,
    Subtitles,
    ClosedCaptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum PlaylistType {
    Event,
    Vod,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum HdcpLevel {
    None,
    #[serde(rename = "TYPE-0")]
    Type0,
    #[serde(rename = "TYPE-1")]
    Type1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum EncryptionMethod {
    #[serde(rename = "AES-128")]
    Aes128,
    None,
    SampleAes,
    SampleAesCtr,
}

macro_rules! keyword_value {
    ($($ty:ty),*) => {
        $(impl FromAttributeValue for $ty {
            fn from_attribute_value(value: &str) -> Option<Self> {
                from_keyword(value)
            }
        })*
    };
}

keyword_value!(MediaType, PlaylistType, HdcpLevel, EncryptionMethod);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClosedCaptions {
    None,
    GroupId(String),
}

impl FromAttributeValue for ClosedCaptions {
    fn from_attribute_value(value: &str) -> Option<Self> {
        match value {
            "NONE" => Some(ClosedCaptions::None),
            "" => None,
            group => Some(ClosedCaptions::GroupId(group.to_string())),
        }
    }
}

/// The closed set of value types a validator can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Integer,
    Float,
    Boolean,
    String,
    Date,
    Duration,
    Resolution,
    Codecs,
    HexSequence,
    ByteRange,
    MediaType,
    PlaylistType,
    HdcpLevel,
    EncryptionMethod,
    ClosedCaptions,
}

impl ValueType {
    pub fn accepts(self, value: &str) -> bool {
        match self {
            ValueType::Integer => u64::from_attribute_value(value).is_some(),
            ValueType::Float => f64::from_attribute_value(value).is_some(),
            ValueType::Boolean => bool::from_attribute_value(value).is_some(),
            ValueType::String => true,
            ValueType::Date => DateTime::<FixedOffset>::from_attribute_value(value).is_some(),
            ValueType::Duration => MediaTime::from_attribute_value(value).is_some(),
            ValueType::Resolution => Resolution::from_attribute_value(value).is_some(),
            ValueType::Codecs => Codecs::from_attribute_value(value).is_some(),
            ValueType::HexSequence => HexSequence::from_attribute_value(value).is_some(),
            ValueType::ByteRange => ByteRange::from_attribute_value(value).is_some(),
            ValueType::MediaType => MediaType::from_attribute_value(value).is_some(),
            ValueType::PlaylistType => PlaylistType::from_attribute_value(value).is_some(),
            ValueType::HdcpLevel => HdcpLevel::from_attribute_value(value).is_some(),
            ValueType::EncryptionMethod => {
                EncryptionMethod::from_attribute_value(value).is_some()
            }
            ValueType::ClosedCaptions => ClosedCaptions::from_attribute_value(value).is_some(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Integer => "decimal integer",
            ValueType::Float => "decimal floating point",
            ValueType::Boolean => "YES/NO",
            ValueType::String => "string",
            ValueType::Date => "ISO 8601 date",
            ValueType::Duration => "duration in seconds",
            ValueType::Resolution => "resolution",
            ValueType::Codecs => "codec list",
            ValueType::HexSequence => "hexadecimal sequence",
            ValueType::ByteRange => "byte range",
            ValueType::MediaType => "media type",
            ValueType::PlaylistType => "playlist type",
            ValueType::HdcpLevel => "HDCP level",
            ValueType::EncryptionMethod => "encryption method",
            ValueType::ClosedCaptions => "closed captions group",
        };
        f.write_str(name)
    }
}
