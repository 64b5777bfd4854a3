pub use pingwire_core::model::{ConnectionId, PING, PONG};

pub mod model {
    pub use pingwire_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use pingwire_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use pingwire_client::*;
}
