/// Payload the demo client sends once its data channel opens.
pub const PING: &str = "PING";

/// Fixed acknowledgment sent back, as a text message, for every inbound
/// data-channel message.
pub const PONG: &str = "PONG";
