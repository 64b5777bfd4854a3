mod config;
mod server;
mod session;
mod signaling;
mod transport;

pub use config::*;
pub use server::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;
