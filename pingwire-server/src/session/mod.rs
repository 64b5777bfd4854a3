mod channel_behavior;
mod context;
mod pong_responder;
mod session;
mod session_command;
mod session_manager;
mod session_status;

pub use channel_behavior::*;
pub use context::*;
pub use pong_responder::*;
pub use session::*;
pub use session_command::*;
pub use session_manager::*;
pub use session_status::*;
