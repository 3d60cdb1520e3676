mod connection;
mod engine;
mod error;
mod session;

pub use connection::*;
pub use engine::*;
pub use error::*;
pub use session::*;
