#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed attribute list: {0:?}")]
    MalformedAttributeList(String),
    #[error("segment divider near tag {index} has no positive duration")]
    MissingSegmentDuration { index: usize },
    #[error("{0} was edited but no registered tag family can write it")]
    NoWriterForDirtyTag(String),
    #[error("no registered tag family can parse {0}")]
    NoParser(String),
    #[error("{0} has no attribute store")]
    NoAttributes(String),
    #[error(transparent)]
    Tokenizer(#[from] hls_parser::ParseError),
    #[error("playlist is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("index {index} is out of bounds for {len} tags")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
