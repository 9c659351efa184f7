//! A FastCGI responder that shows how it sees each request.
//!
//! Call it like this:
//!
//!     fcgi-uri -f config.toml
//!
//! The config file is in the [TOML format][toml]. Here is an example:
//!
//! ```toml
//! [server]
//! name = "fcgi-uri"
//!
//! [limits]
//! max_body = 1048576
//! ```
//!
//! This example also serves as the defaults if no config file is provided,
//! or any given key is not present. If a key is of the wrong type, the
//! responder will bail, so don’t do that.
//!
//! `GET /env` answers with every request parameter, one `KEY=VALUE` per
//! line. Any other request gets back the components of its URI.
//!
//! Logging goes to stderr at `info`; set `FCGI_URI_LOG` to change that.
//!
//! [toml]: https://github.com/toml-lang/toml

#[macro_use] extern crate log;

use fcgi_uri::cgi::Response;
use fcgi_uri::config::parser::{self, parse_file};
use fcgi_uri::config::Config;
use fcgi_uri::env::dump_env;
use fcgi_uri::server::error_messages::error_500;
use fcgi_uri::server::{serve, Request, Router};

use clap::{value_parser, Arg, Command};

use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

fn main() {
    let mut log_builder = env_logger::Builder::new();
    log_builder.filter_level(log::LevelFilter::Info);

    if let Ok(var) = env::var("FCGI_URI_LOG") {
        log_builder.parse_filters(&var);
    }

    if let Err(e) = log_builder.try_init() {
        eprintln!("fcgi-uri: Error when initializing logging: {}", e);
        exit(1);
    }

    let matches = Command::new("fcgi-uri")
        .version("0.1")
        .arg(Arg::new("config_file")
             .short('f')
             .value_name("FILE")
             .help("The TOML file with responder configuration")
             .value_parser(value_parser!(PathBuf)))
        .get_matches();

    let config = match matches.get_one::<PathBuf>("config_file") {
        Some(config_file) => load_config(config_file),
        None => Config::default()
    };

    let mut router = Router::new();
    router.route("/env", "GET", env_page);
    router.route_any("/", uri_page);

    info!("Waiting for requests as {}", config.server.name);
    let served = serve(config, router);
    info!("Served {} request(s)", served);
}

fn load_config(config_file: &Path) -> Config {
    match parse_file(config_file) {
        Ok(c) => c,
        Err(parser::Error::Io(e)) => {
            error!("Error opening config file {:?}: {}", config_file, e);
            exit(1);
        },
        Err(parser::Error::Parse(e)) => {
            error!("Errors parsing config file {:?}", config_file);
            for error in e {
                error!("Config file error at line {} column {}: {}",
                       error.line, error.column, error.desc);
            }
            exit(1);
        },
        Err(parser::Error::Validation(message)) => {
            error!("Error in config file: {}", message);
            exit(1);
        }
    }
}

fn env_page(req: &Request) -> Response {
    let mut res = Response::new();

    match dump_env(&mut res, req.params()) {
        Ok(()) => res,
        Err(e) => {
            warn!("Could not dump the environment: {}", e);
            error_500()
        }
    }
}

fn uri_page(req: &Request) -> Response {
    let mut res = Response::new();

    match describe(&mut res, req) {
        Ok(()) => res,
        Err(e) => {
            warn!("Could not describe {}: {}", req.raw_uri(), e);
            error_500()
        }
    }
}

fn describe<W: Write>(mut out: W, req: &Request) -> io::Result<()> {
    let uri = req.uri();
    let absent = "(none)";

    writeln!(out, "uri: {}", req.raw_uri())?;
    writeln!(out, "scheme: {}", uri.scheme.as_deref().unwrap_or(absent))?;
    writeln!(out, "user_info: {}", uri.user_info.as_deref().unwrap_or(absent))?;
    writeln!(out, "host: {}", uri.host.as_deref().unwrap_or(absent))?;
    writeln!(out, "port: {}", uri.port.as_deref().unwrap_or(absent))?;
    writeln!(out, "path: {}", uri.path)?;
    for param in &uri.query {
        match param.value {
            Some(ref value) => writeln!(out, "query: {} = {}", param.key, value)?,
            None => writeln!(out, "query: {}", param.key)?
        }
    }
    writeln!(out, "fragment: {}", uri.fragment.as_deref().unwrap_or(absent))
}
