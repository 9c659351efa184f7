//! A dead-simple router implementation
//!
//! A `Router` simply matches the request path against installed prefixes, in
//! the order they have been added, dispatching to the first handler that
//! matches. Prefixes match whole path segments: `/env` covers `/env` and
//! `/env/x` but not `/environment`.

use crate::cgi::Response;
use crate::server::error_messages::*;
use crate::server::{Handler, Request};

use std::collections::HashMap;
use std::path::Path;

pub struct Router {
    routes: Vec<Route>
}

struct Route {
    prefix: String,
    handlers: MethodDispatch
}

enum MethodDispatch {
    Any(Box<dyn Handler>),
    Specific(HashMap<String, Box<dyn Handler>>)
}

impl Default for Router {
    fn default() -> Router {
        Router::new()
    }
}

impl Router {
    /// Initialize a new, empty router
    pub fn new() -> Router {
        Router { routes: Vec::new() }
    }

    /// Create a route that will invoke the given `handler` for all methods
    pub fn route_any<H: Handler + 'static>(&mut self, prefix: &str, handler: H) {
        self.routes.push(Route {
            prefix: String::from(prefix),
            handlers: MethodDispatch::Any(Box::new(handler))
        });
    }

    /// Create a route that will invoke the given `handler`, but only for the
    /// particular `method`.
    ///
    /// Panics if `prefix` already has a route for every method.
    pub fn route<H: Handler + 'static>(&mut self, prefix: &str, method: &str,
                                       handler: H) {
        for route in self.routes.iter_mut() {
            if route.prefix == prefix {
                match route.handlers {
                    MethodDispatch::Specific(ref mut map) => {
                        map.insert(String::from(method), Box::new(handler));
                    },
                    MethodDispatch::Any(_) => {
                        panic!("Tried to add a universal and method-specific route for the same prefix");
                    }
                }
                return;
            }
        }

        let mut handlers: HashMap<_, Box<dyn Handler>> = HashMap::new();
        handlers.insert(String::from(method), Box::new(handler));

        self.routes.push(Route {
            prefix: String::from(prefix),
            handlers: MethodDispatch::Specific(handlers)
        });
    }
}

/// The empty path is the root
fn request_path(req: &Request) -> &Path {
    match req.uri().path.as_str() {
        "" => Path::new("/"),
        path => Path::new(path)
    }
}

impl Handler for Router {
    fn serve(&self, req: &Request) -> Response {
        let path = request_path(req);

        for route in &self.routes {
            if path.starts_with(&route.prefix) {
                return route.handlers.serve(req);
            }
        }

        error_404()
    }
}

impl Handler for MethodDispatch {
    fn serve(&self, req: &Request) -> Response {
        match *self {
            MethodDispatch::Any(ref handler) => handler.serve(req),
            MethodDispatch::Specific(ref map) => {
                match map.get(req.method()) {
                    Some(handler) => handler.serve(req),
                    None => error_405()
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::fastcgi::{Adapter, Params, StdioRuntime};

    use std::io::Cursor;

    fn request(method: &str, uri: &str) -> Request {
        let params: Params = [("REQUEST_METHOD", method),
                              ("REQUEST_URI", uri),
                              ("SERVER_PROTOCOL", "HTTP/1.1")].iter()
            .map(|&(k, v)| (String::from(k), String::from(v)))
            .collect();
        let runtime = StdioRuntime::new(Cursor::new(Vec::new()), Vec::new(),
                                        params);
        let mut adapter = Adapter::new(runtime);
        assert!(adapter.accept_request());

        Request::from_adapter(&mut adapter, Config::default().limits.max_body)
            .unwrap()
    }

    fn labelled(label: &'static str) -> impl Fn(&Request) -> Response {
        move |_: &Request| Response::with_body(Vec::from(label.as_bytes()))
    }

    fn router() -> Router {
        let mut router = Router::new();
        router.route("/env", "GET", labelled("env"));
        router.route("/env", "HEAD", labelled("env-head"));
        router.route_any("/", labelled("fallback"));
        router
    }

    #[test]
    fn first_matching_prefix_wins() {
        let router = router();

        assert_eq!(router.serve(&request("GET", "/env")).body(), b"env");
        assert_eq!(router.serve(&request("GET", "/env/PATH")).body(), b"env");
        assert_eq!(router.serve(&request("HEAD", "/env")).body(), b"env-head");
        assert_eq!(router.serve(&request("GET", "/environment")).body(),
                   b"fallback");
        assert_eq!(router.serve(&request("GET", "/")).body(), b"fallback");
    }

    #[test]
    fn unknown_method_is_a_405() {
        let router = router();

        assert_eq!(router.serve(&request("DELETE", "/env")).status().code, 405);
    }

    #[test]
    fn nothing_matches_is_a_404() {
        let mut router = Router::new();
        router.route_any("/api", labelled("api"));

        assert_eq!(router.serve(&request("GET", "/")).status().code, 404);
        assert_eq!(router.serve(&request("GET", "/api/v1?x=1")).body(), b"api");
    }

    #[test]
    #[should_panic]
    fn mixing_any_and_specific_panics() {
        let mut router = Router::new();
        router.route_any("/x", labelled("any"));
        router.route("/x", "GET", labelled("get"));
    }
}
