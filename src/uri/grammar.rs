//! The RFC 3986 `URI-reference` grammar
//!
//! Recognizes an absolute URI or a relative reference and reports the slice
//! of the input each component occupies. Nothing is decoded, case-folded or
//! otherwise normalized; a `%` must still introduce two hex digits.

use super::ParseError;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char, satisfy};
use nom::combinator::{opt, recognize, verify};
use nom::multi::many0_count;
use nom::sequence::{pair, preceded, terminated, tuple};
use nom::IResult;

use std::net::Ipv6Addr;

/// The text of each component found in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Components<'a> {
    pub scheme: Option<&'a str>,
    pub user_info: Option<&'a str>,
    /// IP literals come without their brackets
    pub host: Option<&'a str>,
    pub port: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>
}

/// Splits `text` into its components, or fails at the first byte that does
/// not fit the grammar.
pub fn parse(text: &str) -> Result<Components, ParseError> {
    match reference(text) {
        Ok(("", components)) => Ok(components),
        Ok((rest, _)) => Err(unexpected(text, rest)),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) =>
            Err(unexpected(text, e.input)),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::UnexpectedEnd)
    }
}

fn unexpected(text: &str, rest: &str) -> ParseError {
    match rest.bytes().next() {
        Some(byte) => ParseError::Unexpected {
            position: text.len() - rest.len(),
            byte: byte
        },
        None => ParseError::UnexpectedEnd
    }
}

fn reference(input: &str) -> IResult<&str, Components> {
    let (rest, scheme) = opt(scheme)(input)?;
    let (rest, auth) = opt(preceded(tag("//"), authority))(rest)?;
    let (rest, path) = match (scheme, auth) {
        (_, Some(_)) => path_abempty(rest)?,
        (Some(_), None) => path(rest)?,
        (None, None) => path_noscheme(rest)?
    };
    let (rest, query) = opt(preceded(char('?'), escaped(is_query_char)))(rest)?;
    let (rest, fragment) = opt(preceded(char('#'), escaped(is_query_char)))(rest)?;

    let (user_info, host, port) = match auth {
        Some((user_info, host, port)) => (user_info, Some(host), port),
        None => (None, None, None)
    };

    Ok((rest, Components {
        scheme: scheme,
        user_info: user_info,
        host: host,
        port: port,
        path: path,
        query: query,
        fragment: fragment
    }))
}

fn scheme(input: &str) -> IResult<&str, &str> {
    terminated(
        recognize(pair(satisfy(|c| c.is_ascii_alphabetic()),
                       take_while(|c: char| c.is_ascii_alphanumeric()
                                  || c == '+' || c == '-' || c == '.'))),
        char(':'))(input)
}

type Authority<'a> = (Option<&'a str>, &'a str, Option<&'a str>);

fn authority(input: &str) -> IResult<&str, Authority> {
    tuple((opt(terminated(escaped(is_user_info_char), char('@'))),
           host,
           opt(preceded(char(':'), take_while(|c: char| c.is_ascii_digit())))))
        (input)
}

fn host(input: &str) -> IResult<&str, &str> {
    alt((ip_literal, escaped(is_reg_name_char)))(input)
}

fn ip_literal(input: &str) -> IResult<&str, &str> {
    preceded(char('['), terminated(alt((ipv6, ip_future)), char(']')))(input)
}

fn ipv6(input: &str) -> IResult<&str, &str> {
    verify(take_while1(|c: char| c.is_ascii_hexdigit() || c == ':' || c == '.'),
           |addr: &str| addr.parse::<Ipv6Addr>().is_ok())(input)
}

/// `vF.anything` address literals
fn ip_future(input: &str) -> IResult<&str, &str> {
    recognize(tuple((satisfy(|c| c == 'v' || c == 'V'),
                     take_while1(|c: char| c.is_ascii_hexdigit()),
                     char('.'),
                     take_while1(is_user_info_char))))(input)
}

fn path_abempty(input: &str) -> IResult<&str, &str> {
    recognize(many0_count(preceded(char('/'), escaped(is_pchar))))(input)
}

fn path(input: &str) -> IResult<&str, &str> {
    escaped(is_path_char)(input)
}

/// Without a scheme, a colon in the first segment would read as one
fn path_noscheme(input: &str) -> IResult<&str, &str> {
    verify(path, |path: &str| {
        path.starts_with('/')
            || path.split('/').next().map_or(true, |first| !first.contains(':'))
    })(input)
}

/// Runs of `class` characters and percent-escapes
fn escaped<'a>(class: fn(char) -> bool)
               -> impl FnMut(&'a str) -> IResult<&'a str, &'a str>
{
    recognize(many0_count(alt((take_while1(class), pct_encoded))))
}

fn pct_encoded(input: &str) -> IResult<&str, &str> {
    recognize(tuple((char('%'),
                     satisfy(|c| c.is_ascii_hexdigit()),
                     satisfy(|c| c.is_ascii_hexdigit()))))(input)
}

fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' || c == '~'
}

fn is_sub_delim(c: char) -> bool {
    match c {
        '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' => true,
        _ => false
    }
}

fn is_reg_name_char(c: char) -> bool {
    is_unreserved(c) || is_sub_delim(c)
}

fn is_user_info_char(c: char) -> bool {
    is_reg_name_char(c) || c == ':'
}

fn is_pchar(c: char) -> bool {
    is_user_info_char(c) || c == '@'
}

fn is_path_char(c: char) -> bool {
    is_pchar(c) || c == '/'
}

fn is_query_char(c: char) -> bool {
    is_path_char(c) || c == '?'
}
