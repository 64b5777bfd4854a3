use pingwire_core::IceServerConfig;

/// ICE configuration handed to every peer connection the server creates.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl TransportConfig {
    /// Host candidates only. Useful on loopback and in tests.
    pub fn host_only() -> Self {
        Self {
            ice_servers: Vec::new(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: IceServerConfig::defaults(),
        }
    }
}
