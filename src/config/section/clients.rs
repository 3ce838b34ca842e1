//! `[clients]` section configuration.
//!
//! ```toml
//! [clients]
//! max_connections_per_ip = 16   # 0 disables the limit
//! ```

use serde::{Deserialize, Serialize};

/// Connected client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientsConfig {
    /// Simultaneous connections allowed from one IP.
    pub max_connections_per_ip: usize,
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            max_connections_per_ip: 16,
        }
    }
}
