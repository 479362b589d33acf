use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

use super::error::NetError;

pub const MAC_ADDRESS_LENGTH: usize = 6;
pub const IPV4_ADDRESS_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct MacAddress(pub [u8; MAC_ADDRESS_LENGTH]);

impl MacAddress {
    pub const BROADCAST: MacAddress = MacAddress([0xFF; MAC_ADDRESS_LENGTH]);
    pub const ZERO: MacAddress = MacAddress([0x00; MAC_ADDRESS_LENGTH]);

    pub fn octets(&self) -> [u8; MAC_ADDRESS_LENGTH] {
        self.0
    }

    /// Reads six bytes starting at `offset`. The caller has checked the length.
    pub(crate) fn read(bytes: &[u8], offset: usize) -> MacAddress {
        let mut mac = [0u8; MAC_ADDRESS_LENGTH];
        mac.copy_from_slice(&bytes[offset..offset + MAC_ADDRESS_LENGTH]);
        MacAddress(mac)
    }
}

impl Display for MacAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a, b, c, d, e, g)
    }
}

impl FromStr for MacAddress {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != MAC_ADDRESS_LENGTH {
            return Err(NetError::Config(format!("invalid MAC address '{}'", s)));
        }

        let mut mac = [0u8; MAC_ADDRESS_LENGTH];
        for (byte, part) in mac.iter_mut().zip(parts) {
            *byte = u8::from_str_radix(part, 16)
                .map_err(|_| NetError::Config(format!("invalid MAC address '{}'", s)))?;
        }
        Ok(MacAddress(mac))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = NetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// Every multi-byte protocol field is big-endian on the wire. All codecs go
// through these two helpers.

pub fn read_u16_be(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

pub fn write_u16_be(bytes: &mut [u8], offset: usize, value: u16) {
    bytes[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}
