//! Loading rules from a TOML configuration file.
//!
//! A configuration file contains any number of rule tables:
//!
//! ```toml
//! [[rule]]
//! name = "versions"
//! pattern = '([0-9]+)\.([0-9]+)\.([0-9]+)'
//! replace = "v$1.$2"
//! ```
//!
//! Loading the file does not compile any of the patterns.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use super::filter::Rule;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default, rename = "rule")]
    pub(crate) rules: Vec<Rule>,
}

#[derive(Debug)]
pub(crate) enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read configuration: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse configuration: {e}"),
        }
    }
}

impl Error for ConfigError {}

pub(crate) fn parse_config(text: &str) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(ConfigError::Parse)
}

pub(crate) fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&text)
}
