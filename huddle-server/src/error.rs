use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid client frame: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid {var} value `{value}`: {source}")]
    InvalidAddr {
        var: &'static str,
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("relay server stopped: {0}")]
    Serve(#[source] std::io::Error),
}
