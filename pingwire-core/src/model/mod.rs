mod connection;
mod error;
mod ice;
mod ping;
#[cfg(not(target_arch = "wasm32"))]
mod rtc;
mod signaling;

pub use connection::ConnectionId;
pub use error::SignalError;
pub use ice::{DEFAULT_STUN_SERVERS, IceServerConfig};
pub use ping::{PING, PONG};
pub use signaling::{CandidatePayload, SessionDescriptionPayload, SignalMessage};
#[cfg(not(target_arch = "wasm32"))]
pub use rtc::rtc_ice_servers;
