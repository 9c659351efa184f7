//! Error handling for the FastCGI adapter and the request layer

use crate::uri;

use std::error;
use std::fmt;
use std::io;

/// A Result for library operations.
pub type Result<T> = ::std::result::Result<T, Error>;

/// All errors which might arise within the library
#[derive(Debug)]
pub enum Error {
    /// The runtime reported a failed read, write or flush
    Transport(io::Error),
    UriParse(uri::ParseError),
    /// A parameter every request must carry was not provided
    MissingParam(&'static str),
    BadContentLength(String),
    BodyTooLarge(usize),
    RequestIncomplete
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Transport(ref e) => write!(f, "transport failure: {}", e),
            Error::UriParse(ref e) => write!(f, "bad request URI: {}", e),
            Error::MissingParam(name) =>
                write!(f, "missing request parameter {}", name),
            Error::BadContentLength(ref value) =>
                write!(f, "CONTENT_LENGTH {:?} is not a byte count", value),
            Error::BodyTooLarge(length) =>
                write!(f, "request body of {} bytes is over the limit", length),
            Error::RequestIncomplete =>
                write!(f, "request body ended before CONTENT_LENGTH bytes")
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Transport(ref e) => Some(e),
            Error::UriParse(ref e) => Some(e),
            _ => None
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Transport(e)
    }
}

impl From<uri::ParseError> for Error {
    fn from(e: uri::ParseError) -> Error {
        Error::UriParse(e)
    }
}
