//! Configuration of the server metric families

use std::fs;
use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::metrics::errors::{MetricsError, MetricsResult};

/// Bucket boundaries for request and response sizes, in bytes.
///
/// 511 and 4095 sit just under the classic UDP and common EDNS buffer limits.
pub const DNS_SIZE_BUCKETS: [f64; 9] = [
    0.0, 50.0, 100.0, 200.0, 300.0, 511.0, 1023.0, 4095.0, 8291.0,
];

fn default_namespace() -> String {
    "dns".to_string()
}

fn default_subsystem() -> String {
    "server".to_string()
}

fn default_duration_buckets() -> Vec<f64> {
    prometheus::DEFAULT_BUCKETS.to_vec()
}

fn default_size_buckets() -> Vec<f64> {
    DNS_SIZE_BUCKETS.to_vec()
}

/// Settings for `ServerMetrics`
///
/// Every field is optional in the TOML form:
///
/// ```toml
/// namespace = "dns"
/// subsystem = "server"
/// size_buckets = [0, 50, 100, 200, 300, 511, 1023, 4095, 8291]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_subsystem")]
    pub subsystem: String,
    /// Buckets of `request_duration_seconds`
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,
    /// Buckets of `request_size_bytes` and `response_size_bytes`
    #[serde(default = "default_size_buckets")]
    pub size_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            namespace: default_namespace(),
            subsystem: default_subsystem(),
            duration_buckets: default_duration_buckets(),
            size_buckets: default_size_buckets(),
        }
    }
}

impl MetricsConfig {
    pub fn from_toml_str(text: &str) -> MetricsResult<Self> {
        let config: MetricsConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> MetricsResult<Self> {
        let text = fs::read_to_string(path)?;
        MetricsConfig::from_toml_str(&text)
    }

    /// Checks the values prometheus would otherwise reject at registration.
    pub fn validate(&self) -> MetricsResult<()> {
        if self.namespace.is_empty() {
            return Err(MetricsError::InvalidConfig(
                "namespace must not be empty".to_string(),
            ));
        }

        check_buckets("duration_buckets", &self.duration_buckets)?;
        check_buckets("size_buckets", &self.size_buckets)
    }
}

fn check_buckets(field: &str, buckets: &[f64]) -> MetricsResult<()> {
    if buckets.is_empty() {
        return Err(MetricsError::InvalidConfig(format!("{} must not be empty", field)));
    }

    // A trailing +Inf is the implicit overflow bucket
    let finite = match buckets.split_last() {
        Some((&last, rest)) if last == f64::INFINITY => rest,
        _ => buckets,
    };
    if finite.is_empty() || finite.iter().any(|b| !b.is_finite()) {
        return Err(MetricsError::InvalidConfig(format!(
            "{} must hold finite bounds, optionally followed by +Inf",
            field
        )));
    }

    if buckets.windows(2).any(|w| w[0] >= w[1]) {
        return Err(MetricsError::InvalidConfig(format!(
            "{} must be strictly increasing",
            field
        )));
    }

    Ok(())
}
