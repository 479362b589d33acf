pub mod arp;
pub mod ethernet;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_IPV6: u16 = 0x86DD;

/// Largest untagged Ethernet frame without FCS.
pub const MAX_FRAME_SIZE: usize = 1514;
