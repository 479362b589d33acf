use std::net::Ipv4Addr;

use crate::network::{
    config::NetworkIdentity,
    error::NetError,
    utils::{read_u16_be, write_u16_be, MacAddress, IPV4_ADDRESS_LENGTH, MAC_ADDRESS_LENGTH},
};

use super::{
    ethernet::{encode_ethernet_header, EthernetHeader, ETHERNET_HEADER_SIZE},
    ETHERTYPE_ARP, ETHERTYPE_IPV4,
};

pub const ARP_HW_TYPE_ETHERNET: u16 = 1;
pub const ARP_OPCODE_REQUEST: u16 = 1;
pub const ARP_OPCODE_REPLY: u16 = 2;

pub const ARP_MESSAGE_SIZE: usize = 28;
pub const ARP_FRAME_SIZE: usize = ETHERNET_HEADER_SIZE + ARP_MESSAGE_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOperation {
    Request,
    Reply,
    Other(u16),
}

impl From<u16> for ArpOperation {
    fn from(opcode: u16) -> Self {
        match opcode {
            ARP_OPCODE_REQUEST => ArpOperation::Request,
            ARP_OPCODE_REPLY => ArpOperation::Reply,
            other => ArpOperation::Other(other),
        }
    }
}

impl From<ArpOperation> for u16 {
    fn from(operation: ArpOperation) -> Self {
        match operation {
            ArpOperation::Request => ARP_OPCODE_REQUEST,
            ArpOperation::Reply => ARP_OPCODE_REPLY,
            ArpOperation::Other(opcode) => opcode,
        }
    }
}

/// An ARP packet for Ethernet/IPv4 (RFC 826), fields in host order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpMessage {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub hardware_addr_len: u8,
    pub protocol_addr_len: u8,
    pub operation: ArpOperation,
    pub sender_mac: MacAddress,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddress,
    pub target_ip: Ipv4Addr,
}

impl ArpMessage {
    pub fn new(
        operation: ArpOperation,
        sender_mac: MacAddress,
        sender_ip: Ipv4Addr,
        target_mac: MacAddress,
        target_ip: Ipv4Addr,
    ) -> ArpMessage {
        ArpMessage {
            hardware_type: ARP_HW_TYPE_ETHERNET,
            protocol_type: ETHERTYPE_IPV4,
            hardware_addr_len: MAC_ADDRESS_LENGTH as u8,
            protocol_addr_len: IPV4_ADDRESS_LENGTH as u8,
            operation,
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
        }
    }

    pub fn is_request(&self) -> bool {
        self.operation == ArpOperation::Request
    }

    /// Writes the 28 byte wire form into the start of `buffer`.
    ///
    /// # Panics
    ///
    /// Panics if `buffer` is shorter than [`ARP_MESSAGE_SIZE`].
    pub fn encode(&self, buffer: &mut [u8]) {
        write_u16_be(buffer, 0, self.hardware_type);
        write_u16_be(buffer, 2, self.protocol_type);
        buffer[4] = self.hardware_addr_len;
        buffer[5] = self.protocol_addr_len;
        write_u16_be(buffer, 6, self.operation.into());
        buffer[8..14].copy_from_slice(&self.sender_mac.octets());
        buffer[14..18].copy_from_slice(&self.sender_ip.octets());
        buffer[18..24].copy_from_slice(&self.target_mac.octets());
        buffer[24..28].copy_from_slice(&self.target_ip.octets());
    }
}

pub fn decode_arp_message(bytes: &[u8]) -> Result<ArpMessage, NetError> {
    if bytes.len() < ARP_MESSAGE_SIZE {
        return Err(NetError::Malformed {
            expected: ARP_MESSAGE_SIZE,
            actual: bytes.len(),
        });
    }

    let hardware_addr_len = bytes[4];
    let protocol_addr_len = bytes[5];
    // the fixed offsets below only hold for Ethernet/IPv4
    if hardware_addr_len as usize != MAC_ADDRESS_LENGTH
        || protocol_addr_len as usize != IPV4_ADDRESS_LENGTH
    {
        return Err(NetError::Unsupported {
            hardware_addr_len,
            protocol_addr_len,
        });
    }

    Ok(ArpMessage {
        hardware_type: read_u16_be(bytes, 0),
        protocol_type: read_u16_be(bytes, 2),
        hardware_addr_len,
        protocol_addr_len,
        operation: read_u16_be(bytes, 6).into(),
        sender_mac: MacAddress::read(bytes, 8),
        sender_ip: Ipv4Addr::new(bytes[14], bytes[15], bytes[16], bytes[17]),
        target_mac: MacAddress::read(bytes, 18),
        target_ip: Ipv4Addr::new(bytes[24], bytes[25], bytes[26], bytes[27]),
    })
}

fn encode_arp_frame(destination: MacAddress, source: MacAddress, message: &ArpMessage) -> [u8; ARP_FRAME_SIZE] {
    let mut frame = [0u8; ARP_FRAME_SIZE];
    let header = EthernetHeader {
        destination,
        source,
        ethertype: ETHERTYPE_ARP,
    };
    encode_ethernet_header(&header, &mut frame);
    message.encode(&mut frame[ETHERNET_HEADER_SIZE..]);
    frame
}

/// Broadcast "who has `target_ip`" from our own address.
pub fn encode_arp_request(identity: &NetworkIdentity, target_ip: Ipv4Addr) -> [u8; ARP_FRAME_SIZE] {
    let message = ArpMessage::new(
        ArpOperation::Request,
        identity.mac,
        identity.ipv4,
        MacAddress::ZERO,
        target_ip,
    );
    encode_arp_frame(MacAddress::BROADCAST, identity.mac, &message)
}

/// Unicast answer to the requester telling it our MAC.
pub fn encode_arp_reply(
    identity: &NetworkIdentity,
    requester_ip: Ipv4Addr,
    requester_mac: MacAddress,
) -> [u8; ARP_FRAME_SIZE] {
    let message = ArpMessage::new(
        ArpOperation::Reply,
        identity.mac,
        identity.ipv4,
        requester_mac,
        requester_ip,
    );
    encode_arp_frame(requester_mac, identity.mac, &message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::messages::ethernet::decode_ethernet_header;

    fn identity() -> NetworkIdentity {
        NetworkIdentity {
            mac: MacAddress([0xF4, 0x7B, 0x09, 0x51, 0x91, 0x63]),
            ipv4: Ipv4Addr::new(10, 23, 42, 10),
            gateway_ipv4: Ipv4Addr::new(10, 23, 42, 1),
        }
    }

    #[test]
    fn test_request_wire_layout() {
        let frame = encode_arp_request(&identity(), Ipv4Addr::new(10, 23, 42, 1));
        assert_eq!(frame.len(), 42);
        assert_eq!(
            frame.to_vec(),
            vec![
                0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // broadcast
                0xF4, 0x7B, 0x09, 0x51, 0x91, 0x63, // our MAC
                0x08, 0x06, // ARP
                0x00, 0x01, // Ethernet
                0x08, 0x00, // IPv4
                0x06, 0x04, // lengths
                0x00, 0x01, // request
                0xF4, 0x7B, 0x09, 0x51, 0x91, 0x63, // sender MAC
                10, 23, 42, 10, // sender IP
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // target MAC unknown
                10, 23, 42, 1, // target IP
            ]
        );
    }

    #[test]
    fn test_request_round_trip() {
        let id = identity();
        let frame = encode_arp_request(&id, Ipv4Addr::new(10, 23, 42, 99));
        let message = decode_arp_message(&frame[ETHERNET_HEADER_SIZE..]).unwrap();
        assert_eq!(message.sender_mac, id.mac);
        assert_eq!(message.sender_ip, id.ipv4);
        assert_eq!(message.operation, ArpOperation::Request);
        assert_eq!(message.target_ip, Ipv4Addr::new(10, 23, 42, 99));
        assert_eq!(message.target_mac, MacAddress::ZERO);
        assert_eq!(message.hardware_type, ARP_HW_TYPE_ETHERNET);
        assert_eq!(message.protocol_type, ETHERTYPE_IPV4);
    }

    #[test]
    fn test_reply_is_unicast_to_requester() {
        let id = identity();
        let requester_mac = MacAddress([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let requester_ip = Ipv4Addr::new(10, 23, 42, 7);
        let frame = encode_arp_reply(&id, requester_ip, requester_mac);

        let header = decode_ethernet_header(&frame).unwrap();
        assert_eq!(header.destination, requester_mac);
        assert_eq!(header.source, id.mac);
        assert_eq!(header.ethertype, ETHERTYPE_ARP);

        let message = decode_arp_message(&frame[ETHERNET_HEADER_SIZE..]).unwrap();
        assert_eq!(message.operation, ArpOperation::Reply);
        assert_eq!(message.sender_mac, id.mac);
        assert_eq!(message.sender_ip, id.ipv4);
        assert_eq!(message.target_mac, requester_mac);
        assert_eq!(message.target_ip, requester_ip);
    }

    #[test]
    fn test_short_message_is_malformed() {
        let frame = encode_arp_request(&identity(), Ipv4Addr::new(10, 23, 42, 1));
        assert_eq!(
            decode_arp_message(&frame[ETHERNET_HEADER_SIZE..ARP_FRAME_SIZE - 1]),
            Err(NetError::Malformed { expected: 28, actual: 27 })
        );
    }

    #[test]
    fn test_wrong_address_lengths_are_rejected() {
        let mut frame = encode_arp_request(&identity(), Ipv4Addr::new(10, 23, 42, 1));
        frame[ETHERNET_HEADER_SIZE + 5] = 16;
        assert_eq!(
            decode_arp_message(&frame[ETHERNET_HEADER_SIZE..]),
            Err(NetError::Unsupported { hardware_addr_len: 6, protocol_addr_len: 16 })
        );
    }

    #[test]
    fn test_unknown_opcode_is_kept() {
        let mut frame = encode_arp_request(&identity(), Ipv4Addr::new(10, 23, 42, 1));
        write_u16_be(&mut frame, ETHERNET_HEADER_SIZE + 6, 9);
        let message = decode_arp_message(&frame[ETHERNET_HEADER_SIZE..]).unwrap();
        assert_eq!(message.operation, ArpOperation::Other(9));
        assert!(!message.is_request());
        assert_eq!(u16::from(message.operation), 9);
    }

    #[test]
    #[should_panic]
    fn test_encode_into_short_buffer_panics() {
        let frame = encode_arp_request(&identity(), Ipv4Addr::new(10, 23, 42, 1));
        let message = decode_arp_message(&frame[ETHERNET_HEADER_SIZE..]).unwrap();
        message.encode(&mut [0u8; ARP_MESSAGE_SIZE - 1]);
    }
}
