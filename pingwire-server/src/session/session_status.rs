use std::fmt;

/// `Idle -> Negotiating -> Connected -> Ready`, plus `Closed` once the
/// signaling connection is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Negotiating,
    Connected,
    Ready,
    Closed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Negotiating => "negotiating",
            SessionPhase::Connected => "connected",
            SessionPhase::Ready => "ready",
            SessionPhase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Snapshot published by a session after every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    /// Answers sent over the lifetime of the session.
    pub answers_sent: u32,
    /// Remote candidates accepted by the current peer connection.
    pub remote_candidates: usize,
    /// Local candidates trickled to the client for the current peer connection.
    pub local_candidates: usize,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            answers_sent: 0,
            remote_candidates: 0,
            local_candidates: 0,
        }
    }
}
