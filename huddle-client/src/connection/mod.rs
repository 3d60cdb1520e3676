mod client_config;
mod signaling_client;

pub use client_config::*;
pub use signaling_client::*;
