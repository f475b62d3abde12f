//! Shallow token recognizers shared by the rewriter and the placeholder pass.

use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::char,
    combinator::recognize,
    sequence::{delimited, pair},
    IResult,
};

use crate::placeholder::DELIMITER;

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse an identifier (function, column or table name).
pub(crate) fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_ident_start), take_while(is_ident_char)))(input)
}

/// Parse a numeric-looking word such as `42`, `3.14` or `1e5`.
///
/// Consumed whole so that a trailing identifier is never mistaken for a call.
pub(crate) fn number(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_digit()),
        take_while(|c: char| is_ident_char(c) || c == '.'),
    ))(input)
}

/// Parse a placeholder token, delimiters included (`#TODAY#`).
pub(crate) fn placeholder_token(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char(DELIMITER),
        take_while1(is_ident_char),
        char(DELIMITER),
    ))(input)
}

/// Parse a `--` comment up to, not including, the end of the line.
pub(crate) fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("--"), take_while(|c: char| c != '\n')))(input)
}

/// Byte length of the quoted span at the start of `input`, closing quote included.
///
/// A doubled quote (`''` inside `'...'`) is an escaped quote. Returns `None` when
/// the span is not terminated.
pub(crate) fn quoted_len(input: &str) -> Option<usize> {
    let mut chars = input.char_indices();
    let (_, quote) = chars.next()?;
    while let Some((i, c)) = chars.next() {
        if c == quote {
            let end = i + c.len_utf8();
            if input[end..].starts_with(quote) {
                chars.next();
                continue;
            }
            return Some(end);
        }
    }
    None
}

pub(crate) fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}
