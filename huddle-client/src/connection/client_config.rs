use huddle_core::IceServerConfig;
use huddle_core::utils::default_ice_servers;

use crate::ClientError;

/// Where to connect and under which name.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: String,
    pub room: String,
    pub username: String,
    /// Used until the relay announces its own list.
    pub ice_servers: Vec<IceServerConfig>,
}

impl ClientConfig {
    pub fn new(
        url: impl Into<String>,
        room: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            room: room.into(),
            username: username.into(),
            ice_servers: default_ice_servers(),
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.username.trim().is_empty() {
            return Err(ClientError::Usage("username"));
        }
        if self.room.trim().is_empty() {
            return Err(ClientError::Usage("room"));
        }
        Ok(())
    }
}
