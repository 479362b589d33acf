use std::{env, sync::Arc, time::Duration};

use arp_resolver::network::{
    config::{Config, NetworkIdentity},
    hal::{
        channel::{link_pair, ChannelLink, ReceiveFilter},
        timer::SystemClock,
        Clock,
    },
    logger::{Logger, Source},
    protocols::arp::ArpEntryState,
    utils::MacAddress,
    NetError, NetworkStack,
};
use tokio::task::JoinHandle;

const DEFAULT_CONFIG: &str = "config/netconfig.yaml";
const SIMULATED_GATEWAY_MAC: MacAddress = MacAddress([0x02, 0x00, 0x5E, 0x00, 0x00, 0x01]);

/// Plays the gateway on the other end of the link, answering requests for its address.
fn spawn_gateway(host: &NetworkIdentity, link: ChannelLink, logger: Logger) -> JoinHandle<()> {
    let identity = Arc::new(NetworkIdentity {
        mac: SIMULATED_GATEWAY_MAC,
        ipv4: host.gateway_ipv4,
        gateway_ipv4: host.ipv4,
    });
    tokio::spawn(async move {
        let mut gateway = NetworkStack::new(identity, link, SystemClock::start(), logger);
        loop {
            gateway.poll();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), NetError> {
    // RUST_LOG=arp_resolver::arp=debug narrows the output to a single component
    let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = Config::from_file(&path)?;
    let logger = Logger::start_with_filters(config.logging.clone(), config.log_sources.clone());
    let identity = Arc::new(config.identity.clone());

    let (host_link, wire) = link_pair(1024);
    let gateway = spawn_gateway(&identity, wire, logger.clone());

    let clock = SystemClock::start();
    let mut stack = NetworkStack::new(
        Arc::clone(&identity),
        host_link.with_filter(ReceiveFilter::Arp),
        clock,
        logger.clone(),
    )
    .with_periodic_interval(config.stack.periodic_interval_ms);

    logger.info(
        Source::HAL,
        format!("Starting ARP discovery for gateway {}...", identity.gateway_ipv4),
    );

    let mut last_request_ms: Option<u32> = None;
    while !stack.is_gateway_mac_known() {
        stack.poll();

        let now = clock.now_ms();
        let due = last_request_ms
            .map_or(true, |last| now.wrapping_sub(last) > config.stack.arp_request_interval_ms);
        if due {
            // failures are logged by the stack, the next interval retries
            let _ = stack.send_arp_request_for_gateway();
            last_request_ms = Some(now);
        }
        tokio::time::sleep(Duration::from_millis(config.stack.poll_delay_ms)).await;
    }

    logger.info(Source::HAL, "SUCCESS: Gateway MAC address has been resolved!".to_string());
    if let Some(mac) = stack.arp_cache().lookup(identity.gateway_ipv4) {
        logger.info(Source::HAL, format!("MAC Address: {}", mac));
    }

    println!("ARP cache of {} ({})", identity.ipv4, identity.mac);
    for entry in stack
        .arp_cache()
        .entries()
        .filter(|entry| entry.state == ArpEntryState::Resolved)
    {
        println!("  {} -> {} (updated at {} ms)", entry.ip, entry.mac, entry.last_updated_ms);
    }

    logger.info(Source::HAL, "Test complete. Shutting down.".to_string());
    gateway.abort();

    Ok(())
}
