use crate::RelayError;
use huddle_core::IceServerConfig;
use huddle_core::utils::default_ice_servers;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Capacity of each room's command queue.
pub const DEFAULT_ROOM_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    /// Pushed to every client right after it connects.
    pub ice_servers: Vec<IceServerConfig>,
    /// Served as a fallback for any path other than `/ws`.
    pub static_dir: Option<PathBuf>,
    pub room_channel_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            ice_servers: default_ice_servers(),
            static_dir: None,
            room_channel_capacity: DEFAULT_ROOM_CHANNEL_CAPACITY,
        }
    }
}

impl RelayConfig {
    /// Reads `HUDDLE_BIND`, `HUDDLE_STATIC_DIR` and the `TURN_*` variables.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(bind) = lookup("HUDDLE_BIND") {
            config.bind = bind.parse().map_err(|source| RelayError::InvalidAddr {
                var: "HUDDLE_BIND",
                value: bind.clone(),
                source,
            })?;
        }

        if let Some(dir) = lookup("HUDDLE_STATIC_DIR") {
            config.static_dir = Some(PathBuf::from(dir));
        }

        if let Some(turn_url) = lookup("TURN_URL") {
            config.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: lookup("TURN_USERNAME"),
                credential: lookup("TURN_CREDENTIAL"),
            });
        }

        Ok(config)
    }
}
