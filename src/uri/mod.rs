//! Decomposition of URI strings into owned components
//!
//! `grammar` finds where each component sits in the input; `parse_uri`
//! copies those exact slices into a `ParsedUri` that borrows nothing from
//! the input. Components keep their spelling: no case folding, no default
//! port removal, no dot-segment removal.

pub mod grammar;
pub mod query;

pub use self::query::QueryError;

use self::grammar::Components;
use self::query::dissect;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use std::error;
use std::fmt;

/// Bytes escaped when a query item is written back out
const FORM_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// The components of a URI, each one owned
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedUri {
    pub scheme: Option<String>,
    pub user_info: Option<String>,
    /// IP literals are stored without brackets
    pub host: Option<String>,
    pub port: Option<String>,
    /// `""` for the root path and for no path at all
    pub path: String,
    /// In order of appearance, duplicates included
    pub query: Vec<QueryParam>,
    pub fragment: Option<String>
}

/// One `key[=value]` item of a query string, percent-decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    pub key: String,
    /// `None` when the item had no `=`
    pub value: Option<String>
}

/// Why a string could not be decomposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The byte at `position` does not fit the URI grammar
    Unexpected { position: usize, byte: u8 },
    /// The text stopped in the middle of a component
    UnexpectedEnd
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::Unexpected { position, byte } =>
                write!(f, "byte 0x{:02X} at {} does not fit the URI grammar",
                       byte, position),
            ParseError::UnexpectedEnd => f.write_str("URI ends too early")
        }
    }
}

impl error::Error for ParseError {}

/// Decomposes `text` into its components.
///
/// `"/"` is answered without consulting the grammar. Any failure returns an
/// error and no partial record; a query string that cannot be dissected only
/// leaves `query` empty.
pub fn parse_uri(text: &str) -> Result<ParsedUri, ParseError> {
    if text == "/" {
        return Ok(ParsedUri::default());
    }

    let components = grammar::parse(text)?;
    Ok(ParsedUri::from_components(&components, text))
}

/// Releases a record and every string it owns
pub fn release_parsed_uri(uri: ParsedUri) {
    drop(uri)
}

impl ParsedUri {
    fn from_components(components: &Components, text: &str) -> ParsedUri {
        let query = match components.query {
            Some(raw) => match dissect(raw) {
                Ok(params) => params,
                Err(e) => {
                    debug!("Dropping the query of {:?}: {}", text, e);
                    Vec::new()
                }
            },
            None => Vec::new()
        };

        let path = match components.path {
            "/" => String::new(),
            path => String::from(path)
        };

        ParsedUri {
            scheme: components.scheme.map(String::from),
            user_info: components.user_info.map(String::from),
            host: components.host.map(String::from),
            port: components.port.map(String::from),
            path: path,
            query: query,
            fragment: components.fragment.map(String::from)
        }
    }

    /// The first query item named `key`
    pub fn query_param(&self, key: &str) -> Option<&QueryParam> {
        self.query.iter().find(|p| p.key == key)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    fn has_authority(&self) -> bool {
        self.user_info.is_some() || self.host.is_some() || self.port.is_some()
    }
}

/// Writes `scheme://userInfo@host:port/path?query#fragment`, leaving out
/// whatever is absent. Query items are re-encoded form-style.
impl fmt::Display for ParsedUri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref scheme) = self.scheme {
            write!(f, "{}:", scheme)?;
        }

        let has_authority = self.has_authority();
        if has_authority {
            f.write_str("//")?;
            if let Some(ref user_info) = self.user_info {
                write!(f, "{}@", user_info)?;
            }
            if let Some(ref host) = self.host {
                if host.contains(':') {
                    write!(f, "[{}]", host)?;
                }
                else {
                    f.write_str(host)?;
                }
            }
            if let Some(ref port) = self.port {
                write!(f, ":{}", port)?;
            }
        }

        if self.path.is_empty() {
            if has_authority || self.scheme.is_none() {
                f.write_str("/")?;
            }
        }
        else {
            if has_authority && !self.path.starts_with('/') {
                f.write_str("/")?;
            }
            f.write_str(&self.path)?;
        }

        for (i, param) in self.query.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            write_form_component(f, &param.key)?;
            if let Some(ref value) = param.value {
                f.write_str("=")?;
                write_form_component(f, value)?;
            }
        }

        if let Some(ref fragment) = self.fragment {
            write!(f, "#{}", fragment)?;
        }

        Ok(())
    }
}

/// Spaces become `+`, which `dissect` turns back into spaces
fn write_form_component(f: &mut fmt::Formatter, component: &str) -> fmt::Result {
    for chunk in utf8_percent_encode(component, FORM_COMPONENT) {
        f.write_str(if chunk == "%20" { "+" } else { chunk })?;
    }
    Ok(())
}
