use serde::{Deserialize, Serialize};

/// Two STUN servers on different addresses and ports, so that the mapped
/// address can be checked from two vantage points.
pub const DEFAULT_STUN_SERVERS: [&str; 2] = [
    "stun:stun1.l.google.com:19302",
    "stun:stun2.l.google.com:19305",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    pub fn turn(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            urls: vec![url.into()],
            username: Some(username.into()),
            credential: Some(credential.into()),
        }
    }

    /// One entry per default STUN server.
    pub fn defaults() -> Vec<Self> {
        DEFAULT_STUN_SERVERS.iter().map(|url| Self::stun(*url)).collect()
    }
}
