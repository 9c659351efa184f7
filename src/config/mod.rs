pub mod parser;

/// A holder for responder configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub limits: LimitsConfig
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Sent back in the `Server` header of every response
    pub name: String
}

impl Default for ServerConfig {
    fn default() -> ServerConfig {
        ServerConfig {
            name: String::from("fcgi-uri")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Largest request body, in bytes, that will be read
    pub max_body: usize
}

impl Default for LimitsConfig {
    fn default() -> LimitsConfig {
        LimitsConfig {
            max_body: 1024 * 1024
        }
    }
}
