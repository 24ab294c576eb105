//! Network interface enumeration

use std::fmt;

use arpmitm_core::{Error, Ipv4Address, MacAddr, Result};

/// Information about one network interface, valid for a single
/// enumeration call.
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    /// OS-level interface name (e.g. "eth0", "en0")
    pub name: String,
    /// Human-readable description; falls back to the name
    pub description: String,
    /// Interface MAC address
    pub mac: MacAddr,
    /// First IPv4 address, or the sentinel when none is assigned
    pub ip: Ipv4Address,
    /// CIDR prefix length of that address (0-32)
    pub prefix_len: u8,
    /// Default gateway for this interface, or the sentinel
    pub gateway: Ipv4Address,
    /// Administrative/operational up flag
    pub is_up: bool,
}

impl InterfaceDescriptor {
    /// Netmask derived from the prefix length
    pub fn netmask(&self) -> Ipv4Address {
        Ipv4Address::from_prefix_len(self.prefix_len).unwrap_or(Ipv4Address::UNSPECIFIED)
    }

    /// Whether `ip` lives in this interface's network
    pub fn contains(&self, ip: Ipv4Address) -> bool {
        !self.ip.is_unspecified() && ip.in_same_network(self.ip, self.netmask())
    }
}

impl fmt::Display for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gateway = if self.gateway.is_unspecified() {
            "none".to_string()
        } else {
            self.gateway.to_string()
        };
        write!(
            f,
            "{}\t{}\n\t{}/{} gw={} mac={}",
            self.name, self.description, self.ip, self.prefix_len, gateway, self.mac
        )
    }
}

/// List the attack-capable interfaces: up, not loopback, carrying a MAC.
pub fn list_interfaces() -> Result<Vec<InterfaceDescriptor>> {
    let interfaces = pnet_datalink::interfaces();

    if interfaces.is_empty() {
        return Err(Error::Interface(
            "No network interfaces found. Are you running with sufficient privileges?".to_string(),
        ));
    }

    Ok(interfaces
        .iter()
        .filter(|iface| iface.is_up() && !iface.is_loopback())
        .filter_map(descriptor_from)
        .collect())
}

/// Look up a single interface by name.
pub fn get_interface(name: &str) -> Result<InterfaceDescriptor> {
    pnet_datalink::interfaces()
        .iter()
        .find(|iface| iface.name == name)
        .and_then(descriptor_from)
        .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
}

fn descriptor_from(iface: &pnet_datalink::NetworkInterface) -> Option<InterfaceDescriptor> {
    let mac = iface
        .mac
        .map(|m| MacAddr::new([m.0, m.1, m.2, m.3, m.4, m.5]))?;
    if mac.is_unresolved() {
        return None;
    }

    let (ip, prefix_len) = iface
        .ips
        .iter()
        .find_map(|net| match net {
            ipnetwork::IpNetwork::V4(v4) => Some((Ipv4Address::from(v4.ip()), v4.prefix())),
            _ => None,
        })
        .unwrap_or((Ipv4Address::UNSPECIFIED, 0));

    let description = if iface.description.is_empty() {
        iface.name.clone()
    } else {
        iface.description.clone()
    };

    Some(InterfaceDescriptor {
        name: iface.name.clone(),
        description,
        mac,
        ip,
        prefix_len,
        gateway: default_gateway(&iface.name),
        is_up: iface.is_up(),
    })
}

/// Default gateway of an interface from the kernel routing table.
#[cfg(target_os = "linux")]
pub fn default_gateway(interface: &str) -> Ipv4Address {
    let Ok(table) = std::fs::read_to_string("/proc/net/route") else {
        return Ipv4Address::UNSPECIFIED;
    };
    parse_route_table(&table, interface)
}

#[cfg(not(target_os = "linux"))]
pub fn default_gateway(_interface: &str) -> Ipv4Address {
    // No routing-table source wired up on this platform; the caller must
    // pass the target IP explicitly.
    Ipv4Address::UNSPECIFIED
}

/// Parse `/proc/net/route` for the default route of `interface`.
/// Gateway column is hexadecimal in host (little-endian) byte order.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_route_table(table: &str, interface: &str) -> Ipv4Address {
    for line in table.lines().skip(1) {
        let mut fields = line.split_whitespace();
        let (Some(iface), Some(dest), Some(gateway)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };

        if iface != interface || dest != "00000000" || gateway == "00000000" {
            continue;
        }

        if let Ok(raw) = u32::from_str_radix(gateway, 16) {
            return Ipv4Address(raw.to_le_bytes());
        }
    }

    Ipv4Address::UNSPECIFIED
}
