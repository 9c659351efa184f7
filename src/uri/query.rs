//! Dissection of query strings into key/value pairs
//!
//! `a=1&a=2&flag&b=` dissects to `a = 1`, `a = 2`, `flag` (no value) and
//! `b = ""`, in that order. `+` stands for a space and `%XX` escapes are
//! decoded after splitting, so an encoded `&` or `=` stays inside its key or
//! value.

use super::QueryParam;

use nom::bytes::complete::take_till;
use nom::character::complete::char;
use nom::combinator::{all_consuming, opt};
use nom::multi::separated_list0;
use nom::sequence::{pair, preceded};
use nom::IResult;

use percent_encoding::percent_decode_str;

use std::error;
use std::fmt;

/// Why a query string could not be dissected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A `%` at this byte offset is not followed by two hex digits
    IllegalPercentEncoding(usize),
    /// The decoded bytes are not UTF-8
    InvalidUtf8,
    Syntax
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            QueryError::IllegalPercentEncoding(at) =>
                write!(f, "illegal percent-encoding at byte {}", at),
            QueryError::InvalidUtf8 =>
                write!(f, "percent-decoded query is not UTF-8"),
            QueryError::Syntax => write!(f, "malformed query string")
        }
    }
}

impl error::Error for QueryError {}

type RawPair<'a> = (&'a str, Option<&'a str>);

fn key(input: &str) -> IResult<&str, &str> {
    take_till(|c: char| c == '=' || c == '&')(input)
}

fn value(input: &str) -> IResult<&str, Option<&str>> {
    opt(preceded(char('='), take_till(|c: char| c == '&')))(input)
}

fn raw_pair(input: &str) -> IResult<&str, RawPair> {
    pair(key, value)(input)
}

fn raw_pairs(input: &str) -> IResult<&str, Vec<RawPair>> {
    all_consuming(separated_list0(char('&'), raw_pair))(input)
}

/// Splits and decodes a raw query string, in order of appearance.
///
/// Duplicate keys are kept; empty pairs (`a=1&&b=2`) are skipped.
pub fn dissect(query: &str) -> Result<Vec<QueryParam>, QueryError> {
    let (_, pairs) = match raw_pairs(query) {
        Ok(parsed) => parsed,
        Err(_) => return Err(QueryError::Syntax)
    };

    let mut params = Vec::with_capacity(pairs.len());
    for (raw_key, raw_value) in pairs {
        if raw_key.is_empty() && raw_value.is_none() {
            continue;
        }

        let key = decode(query, raw_key)?;
        let value = match raw_value {
            Some(v) => Some(decode(query, v)?),
            None => None
        };

        params.push(QueryParam { key: key, value: value });
    }

    Ok(params)
}

/// Decodes one key or value, a subslice of `query`
fn decode(query: &str, component: &str) -> Result<String, QueryError> {
    let offset = component.as_ptr() as usize - query.as_ptr() as usize;
    check_escapes(component.as_bytes(), offset)?;

    let spaced = component.replace('+', " ");
    match percent_decode_str(&spaced).decode_utf8() {
        Ok(decoded) => Ok(decoded.into_owned()),
        Err(_) => Err(QueryError::InvalidUtf8)
    }
}

fn check_escapes(bytes: &[u8], offset: usize) -> Result<(), QueryError> {
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'%' {
            continue;
        }

        let well_formed = bytes.len() > i + 2
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit();
        if !well_formed {
            return Err(QueryError::IllegalPercentEncoding(offset + i));
        }
    }

    Ok(())
}
