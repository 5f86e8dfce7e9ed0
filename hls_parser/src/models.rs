/// One non-blank line of a playlist, borrowed from the input.
///
/// Tag names are reported without the leading `#`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Line<'a> {
    Uri(&'a str),
    /// The full comment text, leading `#` included.
    Comment(&'a str),
    Tag {
        name: &'a str,
    },
    TagWithBody {
        name: &'a str,
        body: &'a str,
    },
    /// `#EXTINF:<duration>,[title]`. `duration` is `None` when the body does
    /// not start with a number.
    Duration {
        name: &'a str,
        duration: Option<f64>,
        body: &'a str,
    },
}

impl<'a> Line<'a> {
    pub fn name(&self) -> Option<&'a str> {
        match self {
            Line::Tag { name }
            | Line::TagWithBody { name, .. }
            | Line::Duration { name, .. } => Some(name),
            Line::Uri(_) | Line::Comment(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unable to tokenize line {line}: {text:?}")]
pub struct ParseError {
    pub line: usize,
    pub text: String,
}
