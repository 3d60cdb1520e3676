mod config;
mod error;
mod http;
mod registry;
mod room;
mod signaling;

pub use config::*;
pub use error::*;
pub use http::*;
pub use registry::*;
pub use room::*;
pub use signaling::*;
