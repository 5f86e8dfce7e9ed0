use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// A reference-counted view into a shared text buffer.
///
/// Tags parsed from a playlist point into the buffer the playlist was read
/// from; the buffer stays alive for as long as any view into it does.
#[derive(Clone)]
pub struct TextSlice {
    buffer: Arc<str>,
    start: usize,
    end: usize,
}

impl TextSlice {
    /// Copies `text` into a buffer of its own.
    pub fn new(text: &str) -> Self {
        let buffer: Arc<str> = Arc::from(text);
        let end = buffer.len();
        Self {
            buffer,
            start: 0,
            end,
        }
    }

    /// Views `sub` inside `buffer`, or `None` when `sub` was not sliced from it.
    pub fn from_buffer(buffer: &Arc<str>, sub: &str) -> Option<Self> {
        let base = buffer.as_ptr() as usize;
        let start = (sub.as_ptr() as usize).checked_sub(base)?;
        let end = start + sub.len();
        if end > buffer.len() {
            return None;
        }

        Some(Self {
            buffer: Arc::clone(buffer),
            start,
            end,
        })
    }

    /// Views `sub` inside `buffer`, copying it when it lies elsewhere.
    pub fn in_buffer(buffer: &Arc<str>, sub: &str) -> Self {
        Self::from_buffer(buffer, sub).unwrap_or_else(|| Self::new(sub))
    }

    pub fn as_str(&self) -> &str {
        &self.buffer[self.start..self.end]
    }

    /// True when both views share the same backing buffer.
    pub fn shares_buffer(&self, other: &TextSlice) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }
}

impl Default for TextSlice {
    fn default() -> Self {
        Self::new("")
    }
}

impl Deref for TextSlice {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq for TextSlice {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for TextSlice {}

impl PartialEq<str> for TextSlice {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for TextSlice {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Hash for TextSlice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Debug for TextSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for TextSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TextSlice {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextSlice {
    fn from(text: String) -> Self {
        let buffer: Arc<str> = Arc::from(text);
        let end = buffer.len();
        Self {
            buffer,
            start: 0,
            end,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn views_into_shared_buffer() {
        let buffer: Arc<str> = Arc::from("#EXTM3U\nseg1.ts\n");
        let uri = TextSlice::from_buffer(&buffer, &buffer[8..15]).unwrap();
        assert_eq!(uri, "seg1.ts");
        assert_eq!(Arc::strong_count(&buffer), 2);

        drop(buffer);
        assert_eq!(uri.as_str(), "seg1.ts");
    }

    #[test]
    fn rejects_foreign_slices() {
        let buffer: Arc<str> = Arc::from("abc");
        let other = String::from("xyz");
        assert!(TextSlice::from_buffer(&buffer, &other).is_none());

        let copied = TextSlice::in_buffer(&buffer, &other);
        assert_eq!(copied, "xyz");
        assert!(!copied.shares_buffer(&TextSlice::in_buffer(&buffer, &buffer[..1])));
    }
}
