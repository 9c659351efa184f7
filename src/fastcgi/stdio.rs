//! A runtime for processes launched as plain CGI
//!
//! FastCGI libraries fall back to this behaviour when the process was not
//! started on a FastCGI listening socket: there is exactly one request, made
//! of the process environment, standard input and standard output.

use crate::env;
use crate::fastcgi::{Params, Runtime};

use std::io::{self, Read, Stdin, Stdout, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Waiting,
    Serving,
    Finished
}

/// A single-request runtime over a pair of streams
pub struct StdioRuntime<R, W> {
    input: R,
    output: W,
    params: Params,
    state: State
}

impl StdioRuntime<Stdin, Stdout> {
    /// The runtime for the current process
    pub fn from_process() -> StdioRuntime<Stdin, Stdout> {
        StdioRuntime::new(io::stdin(), io::stdout(), env::snapshot())
    }
}

impl<R: Read, W: Write> StdioRuntime<R, W> {
    pub fn new(input: R, output: W, params: Params) -> StdioRuntime<R, W> {
        StdioRuntime {
            input: input,
            output: output,
            params: params,
            state: State::Waiting
        }
    }

    /// Gives back the output stream, e.g. to inspect what was written
    pub fn into_output(self) -> W {
        self.output
    }

    fn current(&self) -> io::Result<()> {
        match self.state {
            State::Serving => Ok(()),
            _ => Err(io::Error::new(io::ErrorKind::NotConnected,
                                    "no request is being served"))
        }
    }
}

impl<R: Read, W: Write> Runtime for StdioRuntime<R, W> {
    fn accept(&mut self) -> io::Result<bool> {
        match self.state {
            State::Waiting => {
                self.state = State::Serving;
                Ok(true)
            },
            State::Serving => {
                self.state = State::Finished;
                self.output.flush()?;
                Ok(false)
            },
            State::Finished => Ok(false)
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.current()?;
        self.input.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.current()?;
        self.output.write(buf)
    }

    fn params(&self) -> &Params {
        &self.params
    }
}
