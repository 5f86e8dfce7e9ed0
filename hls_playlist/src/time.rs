use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

const MICROSECONDS: u32 = 1_000_000;
const MAX_DECIMAL_PLACES: usize = 9;

/// A rational point or length in time, `value / timescale` seconds.
///
/// A zero timescale marks the invalid time; arithmetic with an invalid
/// operand stays invalid.
#[derive(Clone, Copy, Debug)]
pub struct MediaTime {
    value: i64,
    timescale: u32,
}

impl MediaTime {
    pub const INVALID: MediaTime = MediaTime {
        value: 0,
        timescale: 0,
    };

    pub const ZERO: MediaTime = MediaTime {
        value: 0,
        timescale: 1,
    };

    pub const fn new(value: i64, timescale: u32) -> Self {
        Self { value, timescale }
    }

    /// Rounds to microsecond precision. Non-finite input is invalid.
    pub fn from_seconds(seconds: f64) -> Self {
        if !seconds.is_finite() {
            return Self::INVALID;
        }
        Self::new((seconds * MICROSECONDS as f64).round() as i64, MICROSECONDS)
    }

    /// Parses a decimal number of seconds exactly, e.g. `9.009`.
    pub fn from_decimal_str(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }
        if fraction.len() > MAX_DECIMAL_PLACES {
            return Some(Self::from_seconds(text.parse().ok()?));
        }

        let timescale = 10u32.pow(fraction.len() as u32);
        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let fraction: i64 = if fraction.is_empty() { 0 } else { fraction.parse().ok()? };
        let value = whole
            .checked_mul(timescale as i64)?
            .checked_add(fraction)?;

        Some(Self::new(if negative { -value } else { value }, timescale))
    }

    pub fn is_valid(&self) -> bool {
        self.timescale != 0
    }

    pub fn is_positive(&self) -> bool {
        self.is_valid() && self.value > 0
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn timescale(&self) -> u32 {
        self.timescale
    }

    pub fn seconds(&self) -> Option<f64> {
        self.is_valid()
            .then(|| self.value as f64 / self.timescale as f64)
    }

    fn convert(&self, timescale: u32) -> i128 {
        self.value as i128 * timescale as i128 / self.timescale as i128
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Add for MediaTime {
    type Output = MediaTime;

    fn add(self, other: MediaTime) -> MediaTime {
        if !self.is_valid() || !other.is_valid() {
            return MediaTime::INVALID;
        }
        if self.timescale == other.timescale {
            return match self.value.checked_add(other.value) {
                Some(value) => MediaTime::new(value, self.timescale),
                None => MediaTime::INVALID,
            };
        }

        let (a, b) = (self.timescale as u64, other.timescale as u64);
        let lcm = a / gcd(a, b) * b;
        let timescale = u32::try_from(lcm).unwrap_or(MICROSECONDS);
        let value = self.convert(timescale) + other.convert(timescale);
        match i64::try_from(value) {
            Ok(value) => MediaTime::new(value, timescale),
            Err(_) => MediaTime::INVALID,
        }
    }
}

impl PartialEq for MediaTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_valid(other) == Some(Ordering::Equal)
            || (!self.is_valid() && !other.is_valid())
    }
}

impl PartialOrd for MediaTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.cmp_valid(other)
    }
}

impl MediaTime {
    fn cmp_valid(&self, other: &Self) -> Option<Ordering> {
        if !self.is_valid() || !other.is_valid() {
            return None;
        }
        let lhs = self.value as i128 * other.timescale as i128;
        let rhs = other.value as i128 * self.timescale as i128;
        Some(lhs.cmp(&rhs))
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.seconds() {
            Some(seconds) => write!(f, "{}", seconds),
            None => f.write_str("invalid"),
        }
    }
}

impl Serialize for MediaTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.seconds() {
            Some(seconds) => serializer.serialize_some(&seconds),
            None => serializer.serialize_none(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MediaTimeRange {
    pub start: MediaTime,
    pub duration: MediaTime,
}

impl MediaTimeRange {
    pub const INVALID: MediaTimeRange = MediaTimeRange {
        start: MediaTime::INVALID,
        duration: MediaTime::INVALID,
    };

    pub fn new(start: MediaTime, duration: MediaTime) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> MediaTime {
        self.start + self.duration
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_valid() && self.duration.is_valid()
    }
}
