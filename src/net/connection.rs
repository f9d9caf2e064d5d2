//! Stable name tables for network connections.
//!
//! Platform backends enumerate connections; the protocol and TCP state
//! names here give monitoring output an OS-independent vocabulary.

use serde::{Deserialize, Serialize};

/// Transport protocol of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionProtocol {
    Tcp,
    Udp,
    Raw,
    Unix,
}

impl ConnectionProtocol {
    pub fn name(self) -> &'static str {
        match self {
            ConnectionProtocol::Tcp => "tcp",
            ConnectionProtocol::Udp => "udp",
            ConnectionProtocol::Raw => "raw",
            ConnectionProtocol::Unix => "unix",
        }
    }
}

impl std::fmt::Display for ConnectionProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// TCP connection state as reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TcpState {
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    Idle,
    Bound,
    Unknown,
}

impl TcpState {
    pub fn name(self) -> &'static str {
        match self {
            TcpState::Established => "ESTABLISHED",
            TcpState::SynSent => "SYN_SENT",
            TcpState::SynRecv => "SYN_RECV",
            TcpState::FinWait1 => "FIN_WAIT1",
            TcpState::FinWait2 => "FIN_WAIT2",
            TcpState::TimeWait => "TIME_WAIT",
            TcpState::Close => "CLOSE",
            TcpState::CloseWait => "CLOSE_WAIT",
            TcpState::LastAck => "LAST_ACK",
            TcpState::Listen => "LISTEN",
            TcpState::Closing => "CLOSING",
            TcpState::Idle => "IDLE",
            TcpState::Bound => "BOUND",
            TcpState::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for TcpState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_names() {
        assert_eq!(ConnectionProtocol::Tcp.name(), "tcp");
        assert_eq!(ConnectionProtocol::Unix.to_string(), "unix");
    }

    #[test]
    fn test_tcp_state_names() {
        assert_eq!(TcpState::Established.name(), "ESTABLISHED");
        assert_eq!(TcpState::TimeWait.to_string(), "TIME_WAIT");
        assert_eq!(TcpState::Unknown.name(), "UNKNOWN");
    }
}
