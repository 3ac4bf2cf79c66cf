use crate::clock::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Options for constructing a [`Chain`](crate::chain::Chain).
#[derive(Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Largest accepted payload in bytes (None = unlimited).
    #[serde(default)]
    pub max_payload_size: Option<usize>,
    /// Time source for block timestamps.
    #[serde(skip, default = "default_clock")]
    pub clock: Arc<dyn Clock>,
}

fn default_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

impl ChainConfig {
    pub fn with_max_payload_size(mut self, limit: usize) -> Self {
        self.max_payload_size = Some(limit);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_payload_size: None,
            clock: default_clock(),
        }
    }
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("max_payload_size", &self.max_payload_size)
            .finish_non_exhaustive()
    }
}
