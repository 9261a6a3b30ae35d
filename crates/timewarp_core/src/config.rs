//! # Host Configuration
//!
//! Loaded once at startup, either from defaults, a preset, or a TOML string.

use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Configuration for the cycle host.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Maximum consecutive cycles `run_until_idle` may run before giving up.
    pub max_cycles_per_drain: u64,
    /// Emit a `trace!` event at every cycle boundary.
    pub trace_cycles: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_cycles_per_drain: 1024,
            trace_cycles: false,
        }
    }
}

impl HostConfig {
    /// Tight drain bound, for tests and tools that expect to settle quickly.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_cycles_per_drain: 64,
            trace_cycles: true,
        }
    }

    /// Parses a config from TOML. Missing keys take their default.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the TOML is malformed, has
    /// unknown keys, or sets `max_cycles_per_drain` to zero.
    pub fn from_toml_str(source: &str) -> CoreResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.max_cycles_per_drain == 0 {
            return Err(CoreError::InvalidConfig(
                "max_cycles_per_drain must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = HostConfig::from_toml_str("trace_cycles = true").unwrap();
        assert!(config.trace_cycles);
        assert_eq!(config.max_cycles_per_drain, 1024);
    }

    #[test]
    fn test_zero_drain_bound_rejected() {
        let err = HostConfig::from_toml_str("max_cycles_per_drain = 0").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(HostConfig::from_toml_str("tick_rate = 60").is_err());
    }
}
