//! Errors raised while declaring, configuring or exporting metrics
//!
//! The lifecycle hooks themselves never fail, only setup and export do.

use std::io;
use std::string::FromUtf8Error;

use derive_more::{Display, Error, From};

#[derive(Debug, Display, From, Error)]
pub enum MetricsError {
    /// Declaring or registering a metric family failed
    #[display(fmt = "prometheus: {}", _0)]
    Prometheus(prometheus::Error),
    /// The text exposition was not valid UTF-8
    #[display(fmt = "exposition encoding: {}", _0)]
    Encoding(FromUtf8Error),
    /// Reading a configuration file failed
    #[display(fmt = "config io: {}", _0)]
    Io(io::Error),
    /// A configuration file could not be parsed
    #[display(fmt = "config parse: {}", _0)]
    Config(toml::de::Error),
    /// A configuration value is out of range
    #[display(fmt = "invalid config: {}", _0)]
    #[from(ignore)]
    InvalidConfig(#[error(not(source))] String),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
