use crate::network::{
    error::NetError,
    utils::{read_u16_be, write_u16_be, MacAddress},
};

// 0                    6                    12                    14
// |---6 byte Dest_MAC--|---6 byte Src_MAC---|--2 Byte EtherType--|
pub const ETHERNET_HEADER_SIZE: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub destination: MacAddress,
    pub source: MacAddress,
    pub ethertype: u16,
}

pub fn decode_ethernet_header(bytes: &[u8]) -> Result<EthernetHeader, NetError> {
    if bytes.len() < ETHERNET_HEADER_SIZE {
        return Err(NetError::Malformed {
            expected: ETHERNET_HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    Ok(EthernetHeader {
        destination: MacAddress::read(bytes, 0),
        source: MacAddress::read(bytes, 6),
        ethertype: read_u16_be(bytes, 12),
    })
}

/// Writes the header into the first 14 bytes of `buffer`.
///
/// # Panics
///
/// Panics if `buffer` is shorter than [`ETHERNET_HEADER_SIZE`].
pub fn encode_ethernet_header(header: &EthernetHeader, buffer: &mut [u8]) {
    buffer[0..6].copy_from_slice(&header.destination.octets());
    buffer[6..12].copy_from_slice(&header.source.octets());
    write_u16_be(buffer, 12, header.ethertype);
}
