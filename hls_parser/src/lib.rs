mod models;
mod parser;

pub use models::{Line, ParseError};
pub use parser::{all_lines, lines, Lines, DURATION_TAG};
