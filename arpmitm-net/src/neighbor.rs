//! IP-to-MAC resolution through the OS neighbor table
//!
//! Resolution is table-first: look the IP up in the kernel ARP cache,
//! and only on a miss send one broadcast ARP probe, then re-poll the
//! table briefly. Probing is best-effort; a host that never answers
//! resolves to `None`.

use std::thread;
use std::time::Duration;

use tracing::debug;

use arpmitm_core::{Ipv4Address, MacAddr};
use arpmitm_packet::build_arp_request;

use crate::interface::get_interface;

const PROBE_POLLS: u32 = 10;
const PROBE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Resolve `ip` on `interface` to a MAC address.
pub fn resolve(interface: &str, ip: Ipv4Address) -> Option<MacAddr> {
    if let Some(mac) = lookup(interface, ip) {
        return Some(mac);
    }

    debug!("{ip} not in neighbor table, probing on {interface}");
    send_probe(interface, ip);

    for _ in 0..PROBE_POLLS {
        thread::sleep(PROBE_POLL_INTERVAL);
        if let Some(mac) = lookup(interface, ip) {
            return Some(mac);
        }
    }

    None
}

/// Neighbor-table lookup, reachable entries only.
#[cfg(target_os = "linux")]
pub fn lookup(interface: &str, ip: Ipv4Address) -> Option<MacAddr> {
    let table = std::fs::read_to_string("/proc/net/arp").ok()?;
    lookup_in_table(&table, interface, ip)
}

#[cfg(not(target_os = "linux"))]
pub fn lookup(_interface: &str, _ip: Ipv4Address) -> Option<MacAddr> {
    // No neighbor-table source wired up on this platform.
    None
}

/// Scan a `/proc/net/arp` style table. Entries must be complete
/// (flags 0x2) and carry a non-zero MAC.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn lookup_in_table(table: &str, interface: &str, ip: Ipv4Address) -> Option<MacAddr> {
    for line in table.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [entry_ip, _hw_type, flags, mac, _mask, device] = fields.as_slice() else {
            continue;
        };

        if *device != interface || Ipv4Address::parse(entry_ip) != ip {
            continue;
        }

        let complete = u32::from_str_radix(flags.trim_start_matches("0x"), 16)
            .map(|f| f & 0x2 != 0)
            .unwrap_or(false);
        if !complete {
            continue;
        }

        match mac.parse::<MacAddr>() {
            Ok(mac) if !mac.is_unresolved() => return Some(mac),
            _ => continue,
        }
    }

    None
}

/// Fire one broadcast ARP request for `ip`; failures are silent.
fn send_probe(interface: &str, ip: Ipv4Address) {
    let Ok(iface) = get_interface(interface) else {
        return;
    };
    if iface.ip.is_unspecified() {
        return;
    }

    let Some(pnet_iface) = pnet_datalink::interfaces()
        .into_iter()
        .find(|i| i.name == interface)
    else {
        return;
    };

    let frame = build_arp_request(ip, iface.mac, iface.ip);
    if let Ok(pnet_datalink::Channel::Ethernet(mut tx, _rx)) =
        pnet_datalink::channel(&pnet_iface, pnet_datalink::Config::default())
    {
        if let Some(Err(e)) = tx.send_to(&frame, None) {
            debug!("ARP probe send failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "IP address       HW type     Flags       HW address            Mask     Device\n\
        192.168.1.1      0x1         0x2         aa:bb:cc:dd:ee:ff     *        eth0\n\
        192.168.1.7      0x1         0x0         00:00:00:00:00:00     *        eth0\n\
        192.168.1.9      0x1         0x2         11:22:33:44:55:66     *        wlan0\n";

    #[test]
    fn test_lookup_finds_complete_entry() {
        let mac = lookup_in_table(TABLE, "eth0", Ipv4Address::new(192, 168, 1, 1));
        assert_eq!(mac, Some("aa:bb:cc:dd:ee:ff".parse().unwrap()));
    }

    #[test]
    fn test_lookup_skips_incomplete_entry() {
        assert!(lookup_in_table(TABLE, "eth0", Ipv4Address::new(192, 168, 1, 7)).is_none());
    }

    #[test]
    fn test_lookup_respects_interface() {
        assert!(lookup_in_table(TABLE, "eth0", Ipv4Address::new(192, 168, 1, 9)).is_none());
        assert!(lookup_in_table(TABLE, "wlan0", Ipv4Address::new(192, 168, 1, 9)).is_some());
    }

    #[test]
    fn test_lookup_misses_absent_ip() {
        assert!(lookup_in_table(TABLE, "eth0", Ipv4Address::new(192, 168, 1, 200)).is_none());
    }
}
