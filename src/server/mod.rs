//! Server functionality
//!
//! Turns each request the runtime accepts into a `Request`, hands it to a
//! `Handler`, and writes the `Response` back as a CGI document.

pub mod router;

pub use self::router::Router;

use crate::cgi::{Headers, Response};
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::fastcgi::well_known_params::*;
use crate::fastcgi::{bridge, Adapter, Params, Runtime, StdioRuntime};
use crate::log_util::ascii_escape;
use crate::uri::{parse_uri, ParsedUri};

/// Answers requests until the runtime runs out.
///
/// Started by a web server on a FastCGI listening socket, that is every
/// request on every connection; otherwise the single CGI request of this
/// process. Returns the number of requests accepted.
pub fn serve<H: Handler>(config: Config, handler: H) -> usize {
    let server = Server::new(config, handler);

    if ::fastcgi::is_fastcgi() {
        info!("Accepting FastCGI connections");
        server.serve(&mut Adapter::new(bridge::listen()))
    }
    else {
        info!("Not on a FastCGI socket; serving one CGI request");
        server.serve(&mut Adapter::new(StdioRuntime::from_process()))
    }
}

/// Values which can handle requests
pub trait Handler {
    fn serve(&self, req: &Request) -> Response;
}

impl<F> Handler for F where F: Fn(&Request) -> Response {
    fn serve(&self, req: &Request) -> Response {
        self(req)
    }
}

/// A request, as described by the runtime's parameters
#[derive(Debug)]
pub struct Request {
    method: String,
    raw_uri: String,
    uri: ParsedUri,
    version: String,
    headers: Headers,
    params: Params,
    body: Vec<u8>
}

impl Request {
    /// Builds the current request, reading its whole body.
    ///
    /// Bodies announced larger than `max_body` bytes are refused before
    /// anything is read.
    pub fn from_adapter<R: Runtime>(adapter: &mut Adapter<R>, max_body: usize)
                                    -> Result<Request>
    {
        let params = adapter.params().clone();

        let method = required(&params, REQUEST_METHOD)?;
        let raw_uri = required(&params, REQUEST_URI)?;
        let version = required(&params, SERVER_PROTOCOL)?;
        let uri = parse_uri(&raw_uri)?;
        let headers = headers_from_params(&params);

        let body = match params.get(CONTENT_LENGTH).map(|l| l.trim()) {
            None | Some("") => Vec::new(),
            Some(length) => {
                let length: usize = match length.parse() {
                    Ok(l) => l,
                    Err(_) =>
                        return Err(Error::BadContentLength(String::from(length)))
                };
                if length > max_body {
                    return Err(Error::BodyTooLarge(length));
                }

                let body = adapter.read_bytes(length)?;
                if body.len() < length {
                    return Err(Error::RequestIncomplete);
                }
                body
            }
        };

        Ok(Request {
            method: method,
            raw_uri: raw_uri,
            uri: uri,
            version: version,
            headers: headers,
            params: params,
            body: body
        })
    }

    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request URI exactly as the runtime reported it
    #[inline]
    pub fn raw_uri(&self) -> &str {
        &self.raw_uri
    }

    #[inline]
    pub fn uri(&self) -> &ParsedUri {
        &self.uri
    }

    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Every parameter the runtime passed, headers included
    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn required(params: &Params, name: &'static str) -> Result<String> {
    match params.get(name) {
        Some(value) => Ok(value.clone()),
        None => Err(Error::MissingParam(name))
    }
}

/// `HTTP_ACCEPT_LANGUAGE` becomes `Accept-Language`, and so on
fn headers_from_params(params: &Params) -> Headers {
    let mut headers = Headers::new();

    for (name, value) in params {
        if let Some(header) = name.strip_prefix(HTTP_PREFIX) {
            headers.insert(&header.replace('_', "-"),
                           Vec::from(value.as_bytes()));
        }
    }

    for &(param, header) in [(CONTENT_TYPE, "Content-Type"),
                             (CONTENT_LENGTH, "Content-Length")].iter() {
        match params.get(param) {
            Some(value) if !value.is_empty() =>
                headers.set(header, Vec::from(value.as_bytes())),
            _ => ()
        }
    }

    headers
}

/// Runs a `Handler` against every request an `Adapter` accepts
pub struct Server<H> {
    handler: H,
    config: Config
}

impl<H: Handler> Server<H> {
    pub fn new(config: Config, handler: H) -> Server<H> {
        Server {
            handler: handler,
            config: config
        }
    }

    /// Serves requests until the runtime has no more.
    ///
    /// A failure only ends the request it happened in. Returns the number of
    /// requests accepted.
    pub fn serve<R: Runtime>(&self, adapter: &mut Adapter<R>) -> usize {
        let mut accepted = 0;

        while adapter.accept_request() {
            accepted += 1;
            if let Err(e) = self.serve_current(adapter) {
                warn!("Error serving a request: {}", e);
            }
        }

        debug!("Runtime has no more requests after {}", accepted);
        accepted
    }

    fn serve_current<R: Runtime>(&self, adapter: &mut Adapter<R>) -> Result<()> {
        let mut res = match Request::from_adapter(adapter,
                                                  self.config.limits.max_body) {
            Ok(req) => {
                debug!("{} {}", req.method(), req.raw_uri());
                self.handler.serve(&req)
            },
            Err(Error::Transport(e)) => return Err(Error::Transport(e)),
            Err(Error::UriParse(e)) => {
                let raw = adapter.params().get(REQUEST_URI)
                    .map_or(String::new(), |u| ascii_escape(u.as_bytes()));
                warn!("Rejecting request URI \"{}\": {}", raw, e);
                error_messages::error_400()
            },
            Err(Error::BodyTooLarge(length)) => {
                warn!("Rejecting a body of {} bytes (limit {})",
                      length, self.config.limits.max_body);
                error_messages::error_413()
            },
            Err(e) => {
                warn!("Could not read the request: {}", e);
                error_messages::error_500()
            }
        };

        res.headers_mut().set("Server",
                              Vec::from(self.config.server.name.as_bytes()));
        res.send(adapter)
    }
}

pub mod error_messages {
    use crate::cgi::Response;

    fn canned(code: u16, reason: &str, body: &[u8]) -> Response {
        let mut res = Response::with_body(Vec::from(body));
        res.set_status(code, String::from(reason));
        res.set_content_type(&mime::TEXT_HTML);
        res
    }

    pub fn error_500() -> Response {
        canned(500, "Internal Error", ERROR_500)
    }

    const ERROR_500: &[u8] = b"<!doctype html><html><head><title>Error</title></head><body><h1>Internal Error</h1><p>Something went wrong on my side.</p><p>There's nothing you can do; maybe come back later.</p></body></html>";

    pub fn error_413() -> Response {
        canned(413, "Payload Too Large", ERROR_413)
    }

    const ERROR_413: &[u8] = b"<!doctype html><html><head><title>Error</title></head><body><h1>Payload Too Large</h1><p>That request body is bigger than I'm willing to read.</p></body></html>";

    pub fn error_405() -> Response {
        canned(405, "Method Not Allowed", ERROR_405)
    }

    const ERROR_405: &[u8] = b"<!doctype html><html><head><title>Error</title></head><body><h1>Method Not Allowed</h1><p>Nothing here answers that method. Sorry about that.</p></body></html>";

    pub fn error_404() -> Response {
        canned(404, "Not Found", ERROR_404)
    }

    const ERROR_404: &[u8] = b"<!doctype html><html><head><title>Error</title></head><body><h1>Not Found</h1><p>I couldn't find anything at that path. Sorry.</p></body></html>";

    pub fn error_400() -> Response {
        canned(400, "Bad Request", ERROR_400)
    }

    const ERROR_400: &[u8] = b"<!doctype html><html><head><title>Error</title></head><body><h1>Bad Request</h1><p>Your request URI had some kind of bad syntax.</p></body></html>";
}

#[cfg(test)]
mod test {
    use super::*;

    use std::io::Cursor;

    type TestRuntime = StdioRuntime<Cursor<Vec<u8>>, Vec<u8>>;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter()
            .map(|&(k, v)| (String::from(k), String::from(v)))
            .collect()
    }

    fn adapter(pairs: &[(&str, &str)], body: &[u8]) -> Adapter<TestRuntime> {
        let runtime = StdioRuntime::new(Cursor::new(Vec::from(body)),
                                        Vec::new(),
                                        params(pairs));
        Adapter::new(runtime)
    }

    const GET_ROOT: &[(&str, &str)] = &[
        ("REQUEST_METHOD", "GET"),
        ("REQUEST_URI", "/"),
        ("SERVER_PROTOCOL", "HTTP/1.1")
    ];

    fn output(adapter: Adapter<TestRuntime>) -> String {
        String::from_utf8(adapter.into_inner().into_output()).unwrap()
    }

    #[test]
    fn request_from_params() {
        let mut a = adapter(&[
            ("REQUEST_METHOD", "POST"),
            ("REQUEST_URI", "/users/7?fields=name&fields=email"),
            ("SERVER_PROTOCOL", "HTTP/1.1"),
            ("HTTP_USER_AGENT", "curl/8.0"),
            ("HTTP_ACCEPT_LANGUAGE", "en-US"),
            ("CONTENT_TYPE", "application/json"),
            ("CONTENT_LENGTH", "11"),
            ("DOCUMENT_ROOT", "/srv/www")
        ], b"{\"id\": 7}\n\nignored");
        assert!(a.accept_request());

        let req = Request::from_adapter(&mut a, 1024).unwrap();

        assert_eq!(req.method(), "POST");
        assert_eq!(req.version(), "HTTP/1.1");
        assert_eq!(req.raw_uri(), "/users/7?fields=name&fields=email");
        assert_eq!(req.uri().path, "/users/7");
        assert_eq!(req.uri().query.len(), 2);
        assert_eq!(req.headers().get("User-Agent").unwrap(), b"curl/8.0");
        assert_eq!(req.headers().get("Accept-Language").unwrap(), b"en-US");
        assert_eq!(req.headers().get("Content-Type").unwrap(),
                   b"application/json");
        assert!(!req.headers().contains("Document-Root"));
        assert_eq!(req.params().get("DOCUMENT_ROOT").map(String::as_str),
                   Some("/srv/www"));
        assert_eq!(req.body(), b"{\"id\": 7}\n\n");
    }

    #[test]
    fn request_without_body() {
        let mut a = adapter(GET_ROOT, b"");
        assert!(a.accept_request());

        let req = Request::from_adapter(&mut a, 0).unwrap();
        assert!(req.body().is_empty());
        assert!(req.uri().is_root());
    }

    #[test]
    fn missing_params_are_errors() {
        let mut a = adapter(&[("REQUEST_METHOD", "GET")], b"");
        assert!(a.accept_request());

        match Request::from_adapter(&mut a, 0) {
            Err(Error::MissingParam("REQUEST_URI")) => (),
            other => panic!("{:?}", other)
        }
    }

    #[test]
    fn body_limits() {
        let mut too_big = adapter(&[
            ("REQUEST_METHOD", "PUT"),
            ("REQUEST_URI", "/upload"),
            ("SERVER_PROTOCOL", "HTTP/1.1"),
            ("CONTENT_LENGTH", "4096")
        ], b"");
        assert!(too_big.accept_request());
        match Request::from_adapter(&mut too_big, 1024) {
            Err(Error::BodyTooLarge(4096)) => (),
            other => panic!("{:?}", other)
        }

        let mut short = adapter(&[
            ("REQUEST_METHOD", "PUT"),
            ("REQUEST_URI", "/upload"),
            ("SERVER_PROTOCOL", "HTTP/1.1"),
            ("CONTENT_LENGTH", "10")
        ], b"abc");
        assert!(short.accept_request());
        match Request::from_adapter(&mut short, 1024) {
            Err(Error::RequestIncomplete) => (),
            other => panic!("{:?}", other)
        }

        let mut garbage = adapter(&[
            ("REQUEST_METHOD", "PUT"),
            ("REQUEST_URI", "/upload"),
            ("SERVER_PROTOCOL", "HTTP/1.1"),
            ("CONTENT_LENGTH", "ten")
        ], b"");
        assert!(garbage.accept_request());
        match Request::from_adapter(&mut garbage, 1024) {
            Err(Error::BadContentLength(ref v)) if v == "ten" => (),
            other => panic!("{:?}", other)
        }
    }

    #[test]
    fn serves_and_stamps_responses() {
        let mut a = adapter(GET_ROOT, b"");
        let server = Server::new(Config::default(), |req: &Request| {
            Response::with_body(Vec::from(req.method().as_bytes()))
        });

        assert_eq!(server.serve(&mut a), 1);
        assert_eq!(output(a),
                   "Status: 200 OK\r\n\
                    Content-Type: text/plain; charset=utf-8\r\n\
                    Content-Length: 3\r\n\
                    Server: fcgi-uri\r\n\
                    \r\n\
                    GET");
    }

    #[test]
    fn bad_uri_is_a_400() {
        let mut a = adapter(&[
            ("REQUEST_METHOD", "GET"),
            ("REQUEST_URI", "http://[invalid"),
            ("SERVER_PROTOCOL", "HTTP/1.1")
        ], b"");
        let server = Server::new(Config::default(), |_: &Request| -> Response {
            panic!("handler must not run")
        });

        assert_eq!(server.serve(&mut a), 1);
        assert!(output(a).starts_with("Status: 400 Bad Request\r\n"));
    }

    #[test]
    fn oversize_body_is_a_413() {
        let mut config = Config::default();
        config.limits.max_body = 2;
        let mut a = adapter(&[
            ("REQUEST_METHOD", "POST"),
            ("REQUEST_URI", "/"),
            ("SERVER_PROTOCOL", "HTTP/1.1"),
            ("CONTENT_LENGTH", "3")
        ], b"abc");
        let server = Server::new(config, |_: &Request| Response::new());

        server.serve(&mut a);
        assert!(output(a).starts_with("Status: 413 Payload Too Large\r\n"));
    }

    #[test]
    fn missing_params_are_a_500() {
        let mut a = adapter(&[], b"");
        let server = Server::new(Config::default(), |_: &Request| Response::new());

        server.serve(&mut a);
        assert!(output(a).starts_with("Status: 500 Internal Error\r\n"));
    }

    #[test]
    fn server_name_comes_from_config() {
        let mut config = Config::default();
        config.server.name = String::from("edge-7");
        let mut a = adapter(GET_ROOT, b"");
        let server = Server::new(config, |_: &Request| Response::new());

        server.serve(&mut a);
        assert!(output(a).contains("\r\nServer: edge-7\r\n"));
    }
}
