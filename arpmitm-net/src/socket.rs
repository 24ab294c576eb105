//! Raw link-layer socket and the platform capability trait

use std::io;
use std::time::Duration;

use tracing::{debug, warn};

use arpmitm_core::{Error, Ipv4Address, MacAddr, Result};

use crate::interface::{self, InterfaceDescriptor};
use crate::neighbor;

/// Read timeout of the receive side; the engine polls, so this bounds
/// how long one poll may block.
const READ_TIMEOUT: Duration = Duration::from_millis(1);

/// A raw Ethernet socket bound to one interface. Closed on drop.
pub trait RawSocket: Send {
    /// Send one frame; false on failure (never panics)
    fn send(&mut self, frame: &[u8]) -> bool;

    /// Non-blocking poll for one inbound frame
    fn recv(&mut self) -> Option<Vec<u8>>;
}

/// The OS capabilities the attack engine consumes.
pub trait Platform: Send {
    /// Enumerate up, attack-capable interfaces
    fn list_interfaces(&self) -> Result<Vec<InterfaceDescriptor>>;

    /// Resolve an IP reachable via `interface` to its MAC address
    fn resolve_mac(&self, interface: &str, ip: Ipv4Address) -> Option<MacAddr>;

    /// Open a raw socket bound to `interface`
    fn open_raw_socket(&self, interface: &str, promiscuous: bool) -> Result<Box<dyn RawSocket>>;
}

/// [`Platform`] implementation for the host OS, built on pnet.
#[derive(Debug, Default)]
pub struct HostPlatform;

impl HostPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for HostPlatform {
    fn list_interfaces(&self) -> Result<Vec<InterfaceDescriptor>> {
        interface::list_interfaces()
    }

    fn resolve_mac(&self, interface: &str, ip: Ipv4Address) -> Option<MacAddr> {
        neighbor::resolve(interface, ip)
    }

    fn open_raw_socket(&self, interface: &str, promiscuous: bool) -> Result<Box<dyn RawSocket>> {
        let pnet_iface = pnet_datalink::interfaces()
            .into_iter()
            .find(|i| i.name == interface)
            .ok_or_else(|| Error::InterfaceNotFound(interface.to_string()))?;

        let config = pnet_datalink::Config {
            read_timeout: Some(READ_TIMEOUT),
            promiscuous,
            ..Default::default()
        };

        match pnet_datalink::channel(&pnet_iface, config) {
            Ok(pnet_datalink::Channel::Ethernet(tx, rx)) => {
                debug!("raw socket open on {interface} (promiscuous: {promiscuous})");
                Ok(Box::new(PnetSocket { tx, rx }))
            }
            Ok(_) => Err(Error::Interface(format!(
                "Interface '{interface}' does not provide an Ethernet channel"
            ))),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Err(Error::InsufficientPrivileges(privilege_hint(interface)))
            }
            Err(e) => Err(Error::Interface(format!(
                "Failed to open raw socket on '{interface}': {e}"
            ))),
        }
    }
}

#[cfg(windows)]
fn privilege_hint(interface: &str) -> String {
    format!(
        "opening a raw socket on '{interface}' requires elevation; \
         run the program as Administrator"
    )
}

#[cfg(not(windows))]
fn privilege_hint(interface: &str) -> String {
    format!(
        "opening a raw socket on '{interface}' requires elevation; \
         run with sudo or grant CAP_NET_RAW"
    )
}

struct PnetSocket {
    tx: Box<dyn pnet_datalink::DataLinkSender>,
    rx: Box<dyn pnet_datalink::DataLinkReceiver>,
}

impl RawSocket for PnetSocket {
    fn send(&mut self, frame: &[u8]) -> bool {
        match self.tx.send_to(frame, None) {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                warn!("send failed: {e}");
                false
            }
            None => {
                warn!("send failed: channel rejected frame");
                false
            }
        }
    }

    fn recv(&mut self) -> Option<Vec<u8>> {
        match self.rx.next() {
            Ok(frame) => Some(frame.to_vec()),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                None
            }
            Err(e) => {
                warn!("receive failed: {e}");
                None
            }
        }
    }
}
