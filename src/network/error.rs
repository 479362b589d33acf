use std::{error::Error, fmt::Display, net::Ipv4Addr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    /// Frame or message shorter than its fixed wire size.
    Malformed { expected: usize, actual: usize },
    /// ARP message whose address lengths are not Ethernet/IPv4.
    Unsupported { hardware_addr_len: u8, protocol_addr_len: u8 },
    /// No existing or empty cache slot for this address.
    CacheFull(Ipv4Addr),
    TransmitFailure(String),
    Config(String),
}

impl Display for NetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetError::Malformed { expected, actual } => {
                write!(f, "malformed: expected at least {} bytes, got {}", expected, actual)
            }
            NetError::Unsupported { hardware_addr_len, protocol_addr_len } => write!(
                f,
                "unsupported address lengths: hardware={}, protocol={}",
                hardware_addr_len, protocol_addr_len
            ),
            NetError::CacheFull(ip) => write!(f, "ARP cache is full, dropping entry for {}", ip),
            NetError::TransmitFailure(reason) => write!(f, "transmit failure: {}", reason),
            NetError::Config(reason) => write!(f, "configuration error: {}", reason),
        }
    }
}

impl Error for NetError {}
