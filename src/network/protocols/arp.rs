use std::net::Ipv4Addr;

use crate::network::{
    config::NetworkIdentity,
    error::NetError,
    logger::{Logger, Source},
    messages::arp::ArpMessage,
    utils::MacAddress,
};

pub const ARP_CACHE_SIZE: usize = 16;
pub const ARP_ENTRY_TIMEOUT_MS: u32 = 5 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArpEntryState {
    #[default]
    Empty,
    /// Reserved for tracking outstanding requests. Nothing sets it yet,
    /// lookup never matches it and aging leaves it alone.
    Pending,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpEntry {
    pub state: ArpEntryState,
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
    pub last_updated_ms: u32,
}

impl Default for ArpEntry {
    fn default() -> Self {
        ArpEntry {
            state: ArpEntryState::Empty,
            ip: Ipv4Addr::UNSPECIFIED,
            mac: MacAddress::ZERO,
            last_updated_ms: 0,
        }
    }
}

/// What the cache needs from the stack to answer requests for our address.
pub trait ArpResponder {
    fn identity(&self) -> &NetworkIdentity;

    fn send_arp_reply(&mut self, target_ip: Ipv4Addr, target_mac: MacAddress) -> Result<(), NetError>;
}

/// Fixed-size IPv4 to MAC table. Slots are reused in place, a full table
/// drops new addresses instead of evicting.
#[derive(Debug)]
pub struct ArpCache {
    entries: [ArpEntry; ARP_CACHE_SIZE],
    logger: Logger,
}

impl ArpCache {
    pub fn new(logger: Logger) -> ArpCache {
        ArpCache {
            entries: [ArpEntry::default(); ARP_CACHE_SIZE],
            logger,
        }
    }

    pub fn lookup(&self, ip: Ipv4Addr) -> Option<MacAddress> {
        self.logger.debug(Source::ARP, format!("Cache lookup for {}", ip));
        let found = self
            .entries
            .iter()
            .find(|entry| entry.state == ArpEntryState::Resolved && entry.ip == ip)
            .map(|entry| entry.mac);
        if found.is_none() {
            self.logger.debug(Source::ARP, format!("No match for {} in cache", ip));
        }
        found
    }

    /// Learns the sender of every ARP message, then answers requests for our own address.
    pub fn process_arp_message<R: ArpResponder>(&mut self, responder: &mut R, message: &ArpMessage, now_ms: u32) {
        self.logger.debug(
            Source::ARP,
            format!(
                "Received {:?} from {} ({}) for {}",
                message.operation, message.sender_ip, message.sender_mac, message.target_ip
            ),
        );

        // a full cache only loses the entry, the request is still answered
        let _ = self.upsert(message.sender_ip, message.sender_mac, ArpEntryState::Resolved, now_ms);

        if message.is_request() && message.target_ip == responder.identity().ipv4 {
            self.logger.debug(
                Source::ARP,
                format!("Request for our address from {}, replying", message.sender_ip),
            );
            if let Err(e) = responder.send_arp_reply(message.sender_ip, message.sender_mac) {
                self.logger.warn(Source::ARP, format!("Could not reply to {}: {}", message.sender_ip, e));
            }
        }
    }

    pub fn upsert(&mut self, ip: Ipv4Addr, mac: MacAddress, state: ArpEntryState, now_ms: u32) -> Result<(), NetError> {
        let existing = self
            .entries
            .iter()
            .position(|entry| entry.state != ArpEntryState::Empty && entry.ip == ip);
        let slot = match existing {
            Some(index) => {
                self.logger.debug(Source::ARP, format!("Updated entry {} -> {}", ip, mac));
                index
            }
            None => {
                let free = self.entries.iter().position(|entry| entry.state == ArpEntryState::Empty);
                match free {
                    Some(index) => {
                        self.logger.debug(Source::ARP, format!("Added entry {} -> {}", ip, mac));
                        index
                    }
                    None => {
                        let e = NetError::CacheFull(ip);
                        self.logger.warn(Source::ARP, e.to_string());
                        return Err(e);
                    }
                }
            }
        };

        self.entries[slot] = ArpEntry {
            state,
            ip,
            mac,
            last_updated_ms: now_ms,
        };
        Ok(())
    }

    pub fn age_entries(&mut self, now_ms: u32) {
        for entry in self.entries.iter_mut() {
            if entry.state == ArpEntryState::Resolved
                && now_ms.wrapping_sub(entry.last_updated_ms) > ARP_ENTRY_TIMEOUT_MS
            {
                self.logger.debug(Source::ARP, format!("Entry for {} expired", entry.ip));
                entry.state = ArpEntryState::Empty;
            }
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &ArpEntry> {
        self.entries.iter()
    }

    /// Number of slots in use.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.state != ArpEntryState::Empty)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
