//! A driver for the current FastCGI request
//!
//! `Adapter` adds no policy of its own: whatever the runtime reports, success,
//! failure or a short count, comes back to the caller as-is. A failed accept
//! can only come back as `false`, so it is logged on the way.

use crate::errors::{Error, Result};
use crate::fastcgi::{Params, Runtime};

use std::io;

/// Byte-oriented access to the request the runtime is currently serving
pub struct Adapter<R> {
    runtime: R
}

impl<R: Runtime> Adapter<R> {
    pub fn new(runtime: R) -> Adapter<R> {
        Adapter { runtime: runtime }
    }

    /// Waits for the next request and makes it the current one.
    ///
    /// Returns `false` when the runtime signals that no more requests will
    /// arrive, or fails to accept; either way the serving loop should end.
    pub fn accept_request(&mut self) -> bool {
        match self.runtime.accept() {
            Ok(more) => more,
            Err(e) => {
                warn!("Runtime failed to accept a request: {}", e);
                false
            }
        }
    }

    /// Writes all of `text` to the current response.
    ///
    /// Returns the number of bytes written, which is the length of `text`.
    pub fn write_text(&mut self, text: &str) -> Result<usize> {
        let bytes = text.as_bytes();
        let mut written = 0;

        while written < bytes.len() {
            match self.runtime.write(&bytes[written ..])? {
                0 => return Err(Error::Transport(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "runtime accepted no bytes of the response"))),
                n => written += n
            }
        }

        Ok(written)
    }

    /// Reads up to `capacity` bytes of the current request's input.
    ///
    /// Fewer bytes come back only when the input stream ended.
    pub fn read_bytes(&mut self, capacity: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0; capacity];
        let read = self.read_into(&mut buffer[..])?;
        buffer.truncate(read);

        Ok(buffer)
    }

    /// Like `read_bytes`, filling a caller-provided buffer
    pub fn read_into(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut filled = 0;

        while filled < buffer.len() {
            match self.runtime.read(&mut buffer[filled ..])? {
                0 => break,
                n => filled += n
            }
        }

        Ok(filled)
    }

    /// Hands `buffer` to the runtime in a single write.
    ///
    /// A short count is returned unchanged; resubmitting the rest is up to
    /// the caller.
    pub fn write_bytes(&mut self, buffer: &[u8]) -> Result<usize> {
        Ok(self.runtime.write(buffer)?)
    }

    #[inline]
    pub fn params(&self) -> &Params {
        self.runtime.params()
    }

    #[inline]
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn into_inner(self) -> R {
        self.runtime
    }
}
