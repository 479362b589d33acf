use tokio::sync::mpsc::{channel, error::TryRecvError, Receiver, Sender};

use crate::network::{
    error::NetError,
    messages::{ethernet::decode_ethernet_header, ETHERTYPE_ARP},
};

use super::{FrameReceiver, FrameSender};

/// What a link end hands to the stack, like a capture filter on a raw socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveFilter {
    All,
    Arp,
}

impl ReceiveFilter {
    fn accepts(&self, frame: &[u8]) -> bool {
        match self {
            ReceiveFilter::All => true,
            ReceiveFilter::Arp => matches!(
                decode_ethernet_header(frame),
                Ok(header) if header.ethertype == ETHERTYPE_ARP
            ),
        }
    }
}

/// One end of an in-memory Ethernet segment between two stations.
#[derive(Debug)]
pub struct ChannelLink {
    sender: Sender<Vec<u8>>,
    receiver: Receiver<Vec<u8>>,
    filter: ReceiveFilter,
}

/// Two connected link ends; what one sends the other receives.
pub fn link_pair(capacity: usize) -> (ChannelLink, ChannelLink) {
    let (tx1, rx1) = channel(capacity);
    let (tx2, rx2) = channel(capacity);
    (
        ChannelLink { sender: tx1, receiver: rx2, filter: ReceiveFilter::All },
        ChannelLink { sender: tx2, receiver: rx1, filter: ReceiveFilter::All },
    )
}

impl ChannelLink {
    pub fn with_filter(mut self, filter: ReceiveFilter) -> ChannelLink {
        self.filter = filter;
        self
    }
}

impl FrameSender for ChannelLink {
    fn send(&mut self, frame: &[u8]) -> Result<(), NetError> {
        self.sender
            .try_send(frame.to_vec())
            .map_err(|e| NetError::TransmitFailure(e.to_string()))
    }
}

impl FrameReceiver for ChannelLink {
    fn try_receive(&mut self, buffer: &mut [u8]) -> usize {
        loop {
            match self.receiver.try_recv() {
                Ok(frame) => {
                    // an empty frame would read as "nothing available"
                    if frame.is_empty() || !self.filter.accepts(&frame) {
                        continue;
                    }
                    let len = frame.len().min(buffer.len());
                    buffer[..len].copy_from_slice(&frame[..len]);
                    return len;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return 0,
            }
        }
    }
}
