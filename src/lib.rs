//! Plumbing for FastCGI responders.
//!
//! Two pieces sit at the bottom. `fastcgi::Adapter` gives a responder the
//! four calls it needs from a FastCGI runtime: accept the next request,
//! write text, read bytes, write bytes. The runtime itself is injected
//! through the `fastcgi::Runtime` trait. `fastcgi::ChannelRuntime` takes
//! requests from the `fastcgi` crate's listener; `fastcgi::StdioRuntime` is
//! the CGI-mode one, serving a single request from the process's
//! environment, stdin and stdout. `uri::parse_uri` decomposes a request URI
//! into an owned `ParsedUri`, each component copied as written, with the
//! query already split into decoded pairs.
//!
//! On top of those, `server` turns each accepted request into a `Request`,
//! runs a `Handler` (usually a `server::Router`) and writes the `Response`
//! back as a CGI document.
//!
//! ```no_run
//! use fcgi_uri::cgi::Response;
//! use fcgi_uri::config::Config;
//! use fcgi_uri::server::{self, Request};
//!
//! server::serve(Config::default(), |req: &Request| {
//!     Response::with_body(Vec::from(req.uri().path.as_bytes()))
//! });
//! ```

#[macro_use] extern crate log;

pub mod cgi;
pub mod config;
pub mod env;
pub mod errors;
pub mod fastcgi;
pub mod log_util;
pub mod server;
pub mod uri;

pub use crate::errors::{Error, Result};
pub use crate::fastcgi::{Adapter, ChannelRuntime, Params, Runtime, StdioRuntime};
pub use crate::uri::{parse_uri, release_parsed_uri, ParsedUri, QueryParam};
