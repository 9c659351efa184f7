//! Serialization of CGI/1.1 response documents

use crate::cgi::{Response, Status};
use crate::errors::{Error, Result};
use crate::fastcgi::{Adapter, Runtime};

use std::io;

const CONTENT_TYPE: &str = "Content-Type";
const CONTENT_LENGTH: &str = "Content-Length";

/// Writes a complete response document
///
/// `Content-Type` falls back to `text/plain; charset=utf-8`, and
/// `Content-Length` is always computed from the body, whatever the handler
/// set.
pub fn document<R: Runtime>(output: &mut Adapter<R>, response: &Response)
                            -> Result<()>
{
    status(output, response.status())?;

    match response.headers().get(CONTENT_TYPE) {
        Some(media) => header(output, CONTENT_TYPE, media)?,
        None => header(output, CONTENT_TYPE,
                       mime::TEXT_PLAIN_UTF_8.as_ref().as_bytes())?
    }
    header(output, CONTENT_LENGTH,
           response.body().len().to_string().as_bytes())?;

    for (name, value) in response.headers() {
        if name == CONTENT_TYPE || name == CONTENT_LENGTH {
            continue;
        }
        header(output, name, value)?;
    }

    output.write_text("\r\n")?;
    write_fully(output, response.body())
}

/// Writes the `Status:` line
fn status<R: Runtime>(output: &mut Adapter<R>, status: &Status) -> Result<()> {
    output.write_text(&format!("Status: {} {}\r\n",
                               status.code, status.reason_phrase))?;
    Ok(())
}

fn header<R: Runtime>(output: &mut Adapter<R>, name: &str, value: &[u8])
                      -> Result<()>
{
    output.write_text(name)?;
    output.write_text(": ")?;
    write_fully(output, value)?;
    output.write_text("\r\n")?;

    Ok(())
}

/// Resubmits the remainder after short writes
fn write_fully<R: Runtime>(output: &mut Adapter<R>, mut bytes: &[u8])
                           -> Result<()>
{
    while !bytes.is_empty() {
        match output.write_bytes(bytes)? {
            0 => return Err(Error::Transport(io::Error::new(
                io::ErrorKind::WriteZero,
                "runtime accepted no bytes of the body"))),
            n => bytes = &bytes[n ..]
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fastcgi::{Params, StdioRuntime};

    use std::io::{self, Cursor, Write};

    fn render(response: &Response) -> String {
        let runtime = StdioRuntime::new(Cursor::new(Vec::new()),
                                        Vec::new(),
                                        Params::new());
        let mut adapter = Adapter::new(runtime);
        assert!(adapter.accept_request());

        document(&mut adapter, response).unwrap();

        String::from_utf8(adapter.into_inner().into_output()).unwrap()
    }

    #[test]
    fn default_document() {
        let res = Response::with_body(Vec::from(&b"hello"[..]));

        assert_eq!(render(&res),
                   "Status: 200 OK\r\n\
                    Content-Type: text/plain; charset=utf-8\r\n\
                    Content-Length: 5\r\n\
                    \r\n\
                    hello");
    }

    #[test]
    fn custom_status_and_headers() {
        let mut res = Response::new();
        res.set_status(404, String::from("Not Found"));
        res.set_content_type(&mime::TEXT_HTML);
        res.headers_mut().insert("x-request-id", Vec::from(&b"42"[..]));
        res.headers_mut().insert("content-length", Vec::from(&b"999"[..]));

        assert_eq!(render(&res),
                   "Status: 404 Not Found\r\n\
                    Content-Type: text/html\r\n\
                    Content-Length: 0\r\n\
                    X-Request-Id: 42\r\n\
                    \r\n");
    }

    /// Output that takes two bytes per write
    struct Narrow(Vec<u8>);

    impl Write for Narrow {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(2);
            self.0.extend_from_slice(&buf[.. n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn survives_short_writes() {
        let runtime = StdioRuntime::new(Cursor::new(Vec::new()),
                                        Narrow(Vec::new()),
                                        Params::new());
        let mut adapter = Adapter::new(runtime);
        assert!(adapter.accept_request());

        let res = Response::with_body(Vec::from(&b"0123456789"[..]));
        document(&mut adapter, &res).unwrap();

        let written = adapter.into_inner().into_output().0;
        assert!(written.ends_with(b"\r\n\r\n0123456789"));
    }
}
