//! arpmitm wire codec
//!
//! Byte-exact Ethernet+ARP frame construction and just enough
//! Ethernet/IPv4 parsing to classify intercepted traffic. All header
//! access goes through explicit byte offsets with bounds checks; nothing
//! here aliases a struct over a raw buffer.

pub mod arp;
pub mod classify;

pub use arp::{ArpOpcode, ArpPacket, build_arp_reply, build_arp_request};
pub use classify::{classify_inbound, rewrite_for_relay, Verdict};

/// Ethernet header length in bytes
pub const ETHERNET_HEADER_LEN: usize = 14;

/// ARP payload length in bytes
pub const ARP_PAYLOAD_LEN: usize = 28;

/// Full ARP frame length: Ethernet header + ARP payload
pub const ARP_FRAME_LEN: usize = ETHERNET_HEADER_LEN + ARP_PAYLOAD_LEN;

/// Minimum IPv4 header length in bytes
pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// EtherType: ARP
pub const ETHERTYPE_ARP: u16 = 0x0806;

/// EtherType: IPv4
pub const ETHERTYPE_IPV4: u16 = 0x0800;
