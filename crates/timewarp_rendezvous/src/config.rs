//! # Rendezvous Configuration

use serde::Deserialize;

use crate::error::{RendezvousError, RendezvousResult};

/// Which waiting entry a pairing takes first.
///
/// Entries are always inserted at the front. `Lifo` pops the front (newest
/// first), `Fifo` pops the back (oldest first).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingOrder {
    /// Most recently queued entry first.
    #[default]
    Lifo,
    /// Oldest queued entry first.
    Fifo,
}

/// Configuration shared by the queued and mutual rendezvous.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendezvousConfig {
    /// Pairing discipline for every queue of the rendezvous.
    pub order: PairingOrder,
}

impl RendezvousConfig {
    /// Newest first. The default.
    #[must_use]
    pub const fn lifo() -> Self {
        Self {
            order: PairingOrder::Lifo,
        }
    }

    /// Oldest first.
    #[must_use]
    pub const fn fifo() -> Self {
        Self {
            order: PairingOrder::Fifo,
        }
    }

    /// Parses a config from TOML. Missing keys take their default.
    ///
    /// # Errors
    ///
    /// Returns [`RendezvousError::InvalidConfig`] if the TOML is malformed,
    /// has unknown keys, or names an unknown order.
    pub fn from_toml_str(source: &str) -> RendezvousResult<Self> {
        toml::from_str(source).map_err(|e| RendezvousError::InvalidConfig(e.to_string()))
    }
}
