use crate::transport::TransportConfig;
use std::net::SocketAddr;

/// All interfaces, port 8080.
pub const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub transport: TransportConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            transport: TransportConfig::default(),
        }
    }
}
