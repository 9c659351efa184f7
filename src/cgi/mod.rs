//! CGI/1.1 response documents
//!
//! FastCGI inherits its response format from CGI/1.1: a `Status:` line,
//! header lines, a blank line and the body, all on the request's output
//! stream.

pub mod serializer;

use crate::errors::Result;
use crate::fastcgi::{Adapter, Runtime};

use mime::Mime;

use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// A status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: u16,
    pub reason_phrase: String
}

/// A map of header lines
///
/// Keys are case-normalized on input. The first word, and any words after a
/// hyphen, are capitalized, with all other letters lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    map: BTreeMap<String, Vec<u8>>
}

fn normalize_header_name(name: &str) -> String {
    let lowercased = name.to_ascii_lowercase();
    let mut lower_chars = lowercased.chars();

    let mut normalized = String::with_capacity(lowercased.len());
    if let Some(ch) = lower_chars.next() {
        normalized.push(ch.to_ascii_uppercase());
    }
    else {
        return normalized;
    }

    let mut after_hyphen = false;
    for ch in lower_chars {
        if ch == '-' {
            after_hyphen = true;
            normalized.push(ch);
        }
        else if after_hyphen {
            normalized.push(ch.to_ascii_uppercase());
            after_hyphen = false;
        }
        else {
            normalized.push(ch);
        }
    }

    normalized
}

impl Headers {
    pub fn new() -> Headers {
        Headers {
            map: BTreeMap::new()
        }
    }

    /// Adds a header, joining repeated names with `,`
    pub fn insert(&mut self, key: &str, mut value: Vec<u8>) {
        match self.map.entry(normalize_header_name(key)) {
            Entry::Vacant(e) => { e.insert(value); },
            Entry::Occupied(mut e) => {
                let entry = e.get_mut();
                entry.reserve(value.len() + 1);
                entry.push(b',');
                entry.append(&mut value);
            }
        }
    }

    /// Sets a header, replacing any previous value
    pub fn set(&mut self, key: &str, value: Vec<u8>) {
        self.map.insert(normalize_header_name(key), value);
    }

    pub fn get(&self, key: &str) -> Option<&Vec<u8>> {
        self.map.get(&normalize_header_name(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(&normalize_header_name(key))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a String, &'a Vec<u8>);
    type IntoIter = btree_map::Iter<'a, String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

/// The response a handler builds for the current request
///
/// The whole document is assembled in memory and written in one go by
/// `send`; `io::Write` appends to the body.
#[derive(Debug, Clone)]
pub struct Response {
    status: Status,
    headers: Headers,
    body: Vec<u8>
}

impl Default for Response {
    fn default() -> Response {
        Response::new()
    }
}

impl Response {
    pub fn new() -> Response {
        Response {
            status: Status {
                code: 200,
                reason_phrase: String::from("OK")
            },
            headers: Headers::new(),
            body: Vec::new()
        }
    }

    pub fn with_body(body: Vec<u8>) -> Response {
        let mut res = Response::new();
        res.body = body;
        res
    }

    pub fn set_status(&mut self, code: u16, reason: String) {
        self.status = Status {
            code: code,
            reason_phrase: reason
        };
    }

    #[inline]
    pub fn status(&self) -> &Status {
        &self.status
    }

    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn set_content_type(&mut self, mime: &Mime) {
        self.headers.set("Content-Type", Vec::from(mime.as_ref().as_bytes()));
    }

    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut Vec<u8> {
        &mut self.body
    }

    /// Writes the whole document to the current request's output
    pub fn send<R: Runtime>(&self, adapter: &mut Adapter<R>) -> Result<()> {
        serializer::document(adapter, self)
    }
}

impl Write for Response {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalize_content_type() {
        let expected = "Content-Type";
        assert_eq!(expected, &normalize_header_name("Content-Type"));
        assert_eq!(expected, &normalize_header_name("content-type"));
        assert_eq!(expected, &normalize_header_name("CONTENT-TYPE"));
        assert_eq!(expected, &normalize_header_name("cOnTeNt-TyPe"));
    }

    #[test]
    fn normalize_empty_name() {
        assert_eq!(normalize_header_name(""), "");
    }

    #[test]
    fn insert_joins_repeats() {
        let mut headers = Headers::new();
        headers.insert("accept", Vec::from(&b"text/html"[..]));
        headers.insert("ACCEPT", Vec::from(&b"*/*"[..]));

        assert_eq!(headers.get("Accept").unwrap(), b"text/html,*/*");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn set_replaces() {
        let mut headers = Headers::new();
        headers.insert("X-Thing", Vec::from(&b"one"[..]));
        headers.set("x-thing", Vec::from(&b"two"[..]));

        assert_eq!(headers.get("X-Thing").unwrap(), b"two");
    }

    #[test]
    fn body_is_writable() {
        let mut res = Response::new();
        write!(res, "{} + {}", 1, 2).unwrap();

        assert_eq!(res.body(), b"1 + 2");
        assert_eq!(res.status().code, 200);
    }

    #[test]
    fn content_type_from_mime() {
        let mut res = Response::new();
        res.set_content_type(&mime::TEXT_HTML);

        assert_eq!(res.headers().get("content-type").unwrap(), b"text/html");
    }
}
