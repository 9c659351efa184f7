//! The seam between this library and a FastCGI runtime
//!
//! A runtime owns the wire protocol: it accepts connections, demultiplexes
//! records and marshals each request's environment. This library only asks
//! it for the next request and for bytes in and out of that request, through
//! the `Runtime` trait. `driver::Adapter` puts the caller-facing signatures on
//! top of it.
//!
//! `bridge::ChannelRuntime` takes its requests from the `fastcgi` crate;
//! `stdio::StdioRuntime` is the single-request fallback for plain CGI.

pub mod bridge;
pub mod driver;
pub mod stdio;

pub use self::bridge::ChannelRuntime;
pub use self::driver::Adapter;
pub use self::stdio::StdioRuntime;

use std::collections::BTreeMap;
use std::io;

/// The environment of one request, `NAME -> value`
pub type Params = BTreeMap<String, String>;

/// A FastCGI runtime serving one request at a time
pub trait Runtime {
    /// Blocks until the next request is available.
    ///
    /// Returns `Ok(false)` once the runtime will deliver no more requests.
    /// Any output of the previous request is completed first.
    fn accept(&mut self) -> io::Result<bool>;

    /// Reads from the current request's input stream
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes to the current request's output stream
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// The current request's parameters
    fn params(&self) -> &Params;
}

impl<'a, R: Runtime + ?Sized> Runtime for &'a mut R {
    fn accept(&mut self) -> io::Result<bool> {
        (**self).accept()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn params(&self) -> &Params {
        (**self).params()
    }
}

pub mod well_known_params {
    pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
    pub const REQUEST_URI: &str = "REQUEST_URI";
    pub const SERVER_PROTOCOL: &str = "SERVER_PROTOCOL";
    pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
    pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";
    pub const HTTP_PREFIX: &str = "HTTP_";
}
