//! QUIC address validation cache lookups
//!
//! The lookup sits on the QUIC handshake path, so both outcomes are bound to
//! their label value once and a lookup is a single atomic increment.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use crate::metrics::config::MetricsConfig;
use crate::metrics::errors::MetricsResult;

/// Label value of a lookup that found a cached validation.
pub const HIT: &str = "1";

/// Label value of a lookup that did not.
pub const MISS: &str = "0";

const LOOKUPS_HELP: &str =
    "The number of QUIC address validation lookups. hit=1 means that a cached item was found.";

#[derive(Clone)]
pub struct QuicValidationCounters {
    hits: IntCounter,
    misses: IntCounter,
}

impl QuicValidationCounters {
    pub(crate) fn register(config: &MetricsConfig, registry: &Registry) -> MetricsResult<Self> {
        let lookups = IntCounterVec::new(
            Opts::new(
                "quic_addr_validation_lookups",
                LOOKUPS_HELP,
            )
            .namespace(config.namespace.as_str())
            .subsystem(config.subsystem.as_str()),
            &["hit"],
        )?;
        registry.register(Box::new(lookups.clone()))?;

        Ok(QuicValidationCounters {
            hits: lookups.with_label_values(&[HIT]),
            misses: lookups.with_label_values(&[MISS]),
        })
    }

    #[inline]
    pub fn record(&self, hit: bool) {
        if hit {
            self.hits.inc();
        } else {
            self.misses.inc();
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.get()
    }

    pub fn misses(&self) -> u64 {
        self.misses.get()
    }
}
