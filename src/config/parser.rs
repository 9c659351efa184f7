use super::*;

use toml::{Table, Value};

use std::error;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub fn parse_file<P: AsRef<Path>>(conf: P) -> Result<Config, Error> {
    let mut toml = String::new();
    {
        let mut f = File::open(conf)?;
        f.read_to_string(&mut toml)?;
    }

    parse_str(&toml)
}

pub fn parse_str(toml: &str) -> Result<Config, Error> {
    match toml.parse::<Table>() {
        Ok(table) => config_from_table(&table),
        Err(e) => Err(Error::Parse(vec![message_from_error(toml, &e)]))
    }
}

fn config_from_table(table: &Table) -> Result<Config, Error> {
    let mut config: Config = Default::default();

    match lookup(table, "server.name") {
        Some(&Value::String(ref name)) if !name.is_empty() =>
            config.server.name = name.clone(),
        Some(&Value::String(_)) => return Err(Error::Validation(
            String::from("The server name must not be empty")
        )),
        Some(val) => return Err(Error::Validation(
            format!("Expected the server name to be a string, got a {}",
                    val.type_str())
        )),
        None => ()
    }

    match lookup(table, "limits.max_body") {
        Some(&Value::Integer(n)) if n >= 0 => match usize::try_from(n) {
            Ok(n) => config.limits.max_body = n,
            Err(_) => return Err(Error::Validation(
                format!("The body limit {} is out of range", n)
            ))
        },
        Some(&Value::Integer(n)) => return Err(Error::Validation(
            format!("The body limit {} is negative", n)
        )),
        Some(val) => return Err(Error::Validation(
            format!("Expected the body limit to be an integer, got a {}",
                    val.type_str())
        )),
        None => ()
    }

    Ok(config)
}

/// Looks up a dotted path like `limits.max_body`
fn lookup<'a>(table: &'a Table, path: &str) -> Option<&'a Value> {
    let mut keys = path.split('.');
    let mut value = table.get(keys.next()?)?;

    for key in keys {
        value = value.get(key)?;
    }

    Some(value)
}

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Parse(Vec<ErrorMessage>),
    Validation(String)
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => write!(f, "{}", e),
            Error::Parse(ref errors) => {
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "line {} column {}: {}",
                           error.line, error.column, error.desc)?;
                }
                Ok(())
            },
            Error::Validation(ref message) => f.write_str(message)
        }
    }
}

impl error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

/// An owned, rendered version of a TOML syntax error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub desc: String,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize
}

fn message_from_error(source: &str, error: &toml::de::Error) -> ErrorMessage {
    let offset = error.span().map_or(0, |span| span.start);
    let (line, column) = to_linecol(source, offset);

    ErrorMessage {
        desc: String::from(error.message()),
        line: line,
        column: column
    }
}

fn to_linecol(source: &str, offset: usize) -> (usize, usize) {
    let before = source.get(.. offset).unwrap_or(source);
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);

    (before.matches('\n').count() + 1, before[line_start ..].chars().count() + 1)
}
