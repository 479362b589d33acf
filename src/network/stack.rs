use std::{net::Ipv4Addr, sync::Arc};

use super::{
    config::NetworkIdentity,
    error::NetError,
    hal::{Clock, FrameReceiver, FrameSender},
    logger::{Logger, Source},
    messages::{
        arp::{decode_arp_message, encode_arp_reply, encode_arp_request},
        ethernet::{decode_ethernet_header, ETHERNET_HEADER_SIZE},
        ETHERTYPE_ARP, MAX_FRAME_SIZE,
    },
    protocols::arp::{ArpCache, ArpResponder},
    utils::MacAddress,
};

pub const DEFAULT_PERIODIC_INTERVAL_MS: u32 = 2000;

/// Transmit half of the stack. Kept apart from the cache so the cache can
/// reply through it while the stack is borrowed mutably.
#[derive(Debug)]
struct Interface<D> {
    identity: Arc<NetworkIdentity>,
    device: D,
    logger: Logger,
}

impl<D: FrameSender> Interface<D> {
    fn transmit(&mut self, frame: &[u8], what: &str) -> Result<(), NetError> {
        self.logger.debug(Source::NET, format!("Sending {}", what));
        self.device.send(frame).map_err(|e| {
            self.logger.error(Source::HAL, format!("Failed to send {}: {}", what, e));
            e
        })
    }
}

impl<D: FrameSender> ArpResponder for Interface<D> {
    fn identity(&self) -> &NetworkIdentity {
        &self.identity
    }

    fn send_arp_reply(&mut self, target_ip: Ipv4Addr, target_mac: MacAddress) -> Result<(), NetError> {
        let frame = encode_arp_reply(&self.identity, target_ip, target_mac);
        self.transmit(&frame, &format!("ARP reply to {} ({})", target_ip, target_mac))
    }
}

/// ARP resolution for one interface, driven by repeated calls to [`NetworkStack::poll`].
#[derive(Debug)]
pub struct NetworkStack<D, C> {
    interface: Interface<D>,
    clock: C,
    cache: ArpCache,
    buffer: [u8; MAX_FRAME_SIZE],
    last_periodic_ms: u32,
    periodic_interval_ms: u32,
}

impl<D, C> NetworkStack<D, C>
where
    D: FrameSender + FrameReceiver,
    C: Clock,
{
    pub fn new(identity: Arc<NetworkIdentity>, device: D, clock: C, logger: Logger) -> NetworkStack<D, C> {
        let last_periodic_ms = clock.now_ms();
        NetworkStack {
            interface: Interface {
                identity,
                device,
                logger: logger.clone(),
            },
            clock,
            cache: ArpCache::new(logger),
            buffer: [0u8; MAX_FRAME_SIZE],
            last_periodic_ms,
            periodic_interval_ms: DEFAULT_PERIODIC_INTERVAL_MS,
        }
    }

    pub fn with_periodic_interval(mut self, interval_ms: u32) -> NetworkStack<D, C> {
        self.periodic_interval_ms = interval_ms;
        self
    }

    /// Drains every pending inbound frame, then ages the cache if the
    /// periodic interval has passed. Never blocks. Returns the number of
    /// frames drained.
    pub fn poll(&mut self) -> usize {
        let mut frames = 0;
        loop {
            let received = self
                .interface
                .device
                .try_receive(&mut self.buffer)
                .min(self.buffer.len());
            if received == 0 {
                break;
            }
            frames += 1;
            self.interface
                .logger
                .debug(Source::NET, format!("poll() received a frame of size {}", received));
            let now = self.clock.now_ms();
            Self::process_incoming_frame(&mut self.cache, &mut self.interface, &self.buffer[..received], now);
        }

        let now = self.clock.now_ms();
        if now.wrapping_sub(self.last_periodic_ms) >= self.periodic_interval_ms {
            self.cache.age_entries(now);
            self.last_periodic_ms = now;
        }
        frames
    }

    fn process_incoming_frame(cache: &mut ArpCache, interface: &mut Interface<D>, frame: &[u8], now_ms: u32) {
        let header = match decode_ethernet_header(frame) {
            Ok(header) => header,
            Err(_) => return,
        };
        if header.ethertype != ETHERTYPE_ARP {
            return;
        }
        interface
            .logger
            .debug(Source::NET, format!("Frame has EtherType 0x{:04X}", header.ethertype));

        match decode_arp_message(&frame[ETHERNET_HEADER_SIZE..]) {
            Ok(message) => cache.process_arp_message(interface, &message, now_ms),
            Err(e) => interface.logger.debug(Source::NET, format!("Dropping ARP payload: {}", e)),
        }
    }

    /// Broadcasts one request. Retrying is up to the caller.
    pub fn send_arp_request_for(&mut self, target_ip: Ipv4Addr) -> Result<(), NetError> {
        let frame = encode_arp_request(&self.interface.identity, target_ip);
        self.interface.transmit(&frame, &format!("ARP request for {}", target_ip))
    }

    pub fn send_arp_request_for_gateway(&mut self) -> Result<(), NetError> {
        let gateway = self.interface.identity.gateway_ipv4;
        self.send_arp_request_for(gateway)
    }

    pub fn send_arp_reply(&mut self, target_ip: Ipv4Addr, target_mac: MacAddress) -> Result<(), NetError> {
        self.interface.send_arp_reply(target_ip, target_mac)
    }

    pub fn is_target_resolved(&self, ip: Ipv4Addr) -> bool {
        self.cache.lookup(ip).is_some()
    }

    pub fn is_gateway_mac_known(&self) -> bool {
        match self.cache.lookup(self.interface.identity.gateway_ipv4) {
            Some(mac) => {
                self.interface.logger.debug(Source::NET, format!("Gateway MAC address: {}", mac));
                true
            }
            None => false,
        }
    }

    pub fn arp_cache(&self) -> &ArpCache {
        &self.cache
    }

    pub fn identity(&self) -> &NetworkIdentity {
        &self.interface.identity
    }
}
