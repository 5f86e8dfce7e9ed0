//! Quote-aware codec for tag bodies.
//!
//! An attribute list is a comma separated sequence of `KEY=value` pairs where
//! a value wrapped in double quotes may itself contain commas and equals signs.
//! Keys keep their source order so that a decoded list encodes back to the
//! same text.

use crate::error::{Error, Result};
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_till},
    character::complete::char,
    combinator::{recognize, rest},
    multi::{many0_count, separated_list1},
    sequence::{delimited, pair, separated_pair},
    IResult,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttributeValue {
    pub value: String,
    pub quoted: bool,
}

impl AttributeValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: true,
        }
    }

    fn from_token(token: &str) -> Self {
        let token = token.trim();
        match token
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            Some(inner) => Self::quoted(inner),
            None => Self::new(token),
        }
    }
}

/// An insertion-ordered map from attribute key to value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttributeList {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(|v| v.value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replaces the value in place when `key` exists, appends otherwise.
    pub fn insert(&mut self, key: impl Into<String>, value: AttributeValue) -> Option<AttributeValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &AttributeValue> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for AttributeList {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue)>>(iter: I) -> Self {
        let mut list = AttributeList::new();
        for (key, value) in iter {
            list.insert(key, value);
        }
        list
    }
}

fn malformed(body: &str) -> Error {
    Error::MalformedAttributeList(body.to_string())
}

fn quoted(i: &str) -> IResult<&str, &str> {
    recognize(delimited(char('"'), take_till(|c: char| c == '"'), char('"')))(i)
}

/// An opening quote that is never closed runs to the end of the body.
fn unterminated(i: &str) -> IResult<&str, &str> {
    recognize(pair(char('"'), rest))(i)
}

/// Text up to the next `stop` character that is not inside quotes.
fn unquoted_until<'a>(stop: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    recognize(many0_count(alt((quoted, unterminated, is_not(stop)))))
}

fn tokens(i: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(','), unquoted_until("\","))(i)
}

fn key_value(i: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(unquoted_until("\"="), char('='), rest)(i)
}

pub fn decode(body: &str) -> Result<AttributeList> {
    if body.trim().is_empty() {
        return Ok(AttributeList::new());
    }

    let (_, tokens) = tokens(body).map_err(|_| malformed(body))?;
    tokens
        .into_iter()
        .map(|token| -> Result<(&str, AttributeValue)> {
            let (_, (key, value)) = key_value(token).map_err(|_| malformed(body))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(malformed(body));
            }
            Ok((key, AttributeValue::from_token(value)))
        })
        .collect()
}

pub fn encode(list: &AttributeList) -> String {
    list.iter()
        .map(|(key, value)| {
            if value.quoted {
                format!("{}=\"{}\"", key, value.value)
            } else {
                format!("{}={}", key, value.value)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a bare comma separated list, keeping quoted commas inside their token.
pub fn decode_array(body: &str) -> Vec<String> {
    if body.trim().is_empty() {
        return Vec::new();
    }

    match tokens(body) {
        Ok((_, tokens)) => tokens.into_iter().map(|token| token.trim().to_string()).collect(),
        Err(_) => vec![body.trim().to_string()],
    }
}

pub fn encode_array<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}
