//! Server configuration, layered from an optional file and `EMBEDHTTP_*` environment variables.

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::HttpError;

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "EMBEDHTTP";

/// Settings the server and the bundled middleware read at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name or address to listen on.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Maximum number of bytes a request head may use. Unlimited if unset.
    pub max_head_size: Option<usize>,
    /// Maximum body size the body parser accepts.
    pub max_body_size: usize,
    /// Consecutive accept failures tolerated before `run` gives up. `0` fails on the first.
    pub accept_retries: u32,
    /// Log level for the bundled binary, e.g. `info` or `debug`.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_head_size: None,
            max_body_size: 1024 * 1024,
            accept_retries: 0,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads the configuration from `path` (if given and present) and the environment.
    ///
    /// The file format is picked from the extension; environment variables such as
    /// `EMBEDHTTP_PORT` take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Config` if a source cannot be read or a value has the wrong type.
    pub fn load(path: Option<&str>) -> Result<Self, HttpError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Parses the configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Config` if the document is invalid.
    pub fn from_toml_str(toml: &str) -> Result<Self, HttpError> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
