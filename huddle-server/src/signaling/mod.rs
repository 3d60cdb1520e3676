mod relay_service;
mod signal_router;
mod signaling_output;
mod ws_handler;

pub use relay_service::*;
pub use signal_router::*;
pub use signaling_output::*;
pub use ws_handler::*;
