use crate::models::{Line, ParseError};
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_till, take_while},
    character::complete::{char, line_ending, space0},
    combinator::{eof, map, not, opt, recognize},
    number::complete::double,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

/// The only tag whose body starts with a duration.
pub const DURATION_TAG: &str = "EXTINF";

const WHITESPACE: &str = " \t\r\n";

fn keyword_char(c: char) -> bool {
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ-0123456789".contains(c)
}

fn is_line_end(c: char) -> bool {
    "\r\n".contains(c)
}

fn end_of_line(i: &str) -> IResult<&str, &str> {
    preceded(space0, alt((line_ending, eof)))(i)
}

fn rest_of_line(i: &str) -> IResult<&str, &str> {
    take_till(is_line_end)(i)
}

fn blank_line(i: &str) -> IResult<&str, &str> {
    recognize(pair(space0, line_ending))(i)
}

fn tag_name(i: &str) -> IResult<&str, &str> {
    preceded(char('#'), recognize(pair(tag("EXT"), take_while(keyword_char))))(i)
}

fn duration(i: &str) -> IResult<&str, f64> {
    terminated(double, alt((tag(","), eof)))(i)
}

fn playlist_tag(i: &str) -> IResult<&str, Line> {
    map(
        terminated(
            pair(tag_name, opt(preceded(char(':'), rest_of_line))),
            end_of_line,
        ),
        |(name, body)| match body {
            None => Line::Tag { name },
            Some(body) if name == DURATION_TAG => Line::Duration {
                name,
                duration: duration(body).ok().map(|(_, d)| d),
                body,
            },
            Some(body) => Line::TagWithBody { name, body },
        },
    )(i)
}

fn comment(i: &str) -> IResult<&str, &str> {
    terminated(
        recognize(tuple((char('#'), not(tag("EXT")), rest_of_line))),
        end_of_line,
    )(i)
}

fn uri(i: &str) -> IResult<&str, &str> {
    preceded(not(char('#')), terminated(is_not(WHITESPACE), end_of_line))(i)
}

fn playlist_line(i: &str) -> IResult<&str, Line> {
    alt((
        playlist_tag,
        map(comment, Line::Comment),
        map(uri, Line::Uri),
    ))(i)
}

/// Streams the lines of a playlist in source order.
///
/// The iterator ends when the input is exhausted, or right after yielding the
/// first error.
#[derive(Debug)]
pub struct Lines<'a> {
    input: &'a str,
    remaining: &'a str,
    failed: bool,
}

pub fn lines(input: &str) -> Lines<'_> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    Lines {
        input,
        remaining: input,
        failed: false,
    }
}

pub fn all_lines(input: &str) -> Result<Vec<Line<'_>>, ParseError> {
    lines(input).collect()
}

impl<'a> Lines<'a> {
    fn line_number(&self) -> usize {
        let consumed = self.input.len() - self.remaining.len();
        self.input[..consumed].matches('\n').count() + 1
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Result<Line<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while let Ok((rest, _)) = blank_line(self.remaining) {
            self.remaining = rest;
        }

        if self.remaining.trim().is_empty() {
            self.remaining = "";
            return None;
        }

        match playlist_line(self.remaining) {
            Ok((rest, line)) => {
                self.remaining = rest;
                Some(Ok(line))
            }
            Err(_) => {
                self.failed = true;
                let error = ParseError {
                    line: self.line_number(),
                    text: self.remaining.lines().next().unwrap_or_default().to_string(),
                };
                log::warn!("{}", error);
                Some(Err(error))
            }
        }
    }
}
