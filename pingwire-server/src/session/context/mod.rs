mod channel_context;

pub use channel_context::*;
