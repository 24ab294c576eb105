//! ARP packet structure and frame construction

use bytes::{BufMut, BytesMut};

use arpmitm_core::{Error, Ipv4Address, MacAddr, Result};

use crate::{ARP_FRAME_LEN, ARP_PAYLOAD_LEN, ETHERTYPE_ARP};

/// Hardware type: Ethernet
pub const HTYPE_ETHERNET: u16 = 1;

/// Protocol type: IPv4
pub const PTYPE_IPV4: u16 = 0x0800;

/// ARP operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOpcode {
    /// ARP request
    Request = 1,
    /// ARP reply
    Reply = 2,
}

impl ArpOpcode {
    pub fn from_u16(val: u16) -> Option<Self> {
        match val {
            1 => Some(Self::Request),
            2 => Some(Self::Reply),
            _ => None,
        }
    }
}

/// ARP packet (the 28-byte payload behind the Ethernet header)
#[derive(Debug, Clone)]
pub struct ArpPacket {
    pub htype: u16,
    pub ptype: u16,
    pub hlen: u8,
    pub plen: u8,
    pub operation: ArpOpcode,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Address,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Address,
}

impl ArpPacket {
    /// Create an ARP request (target MAC unknown)
    pub fn request(sender_mac: MacAddr, sender_ip: Ipv4Address, target_ip: Ipv4Address) -> Self {
        Self {
            htype: HTYPE_ETHERNET,
            ptype: PTYPE_IPV4,
            hlen: 6,
            plen: 4,
            operation: ArpOpcode::Request,
            sender_mac,
            sender_ip,
            target_mac: MacAddr::zero(),
            target_ip,
        }
    }

    /// Create an ARP reply
    pub fn reply(
        sender_mac: MacAddr,
        sender_ip: Ipv4Address,
        target_mac: MacAddr,
        target_ip: Ipv4Address,
    ) -> Self {
        Self {
            htype: HTYPE_ETHERNET,
            ptype: PTYPE_IPV4,
            hlen: 6,
            plen: 4,
            operation: ArpOpcode::Reply,
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
        }
    }

    /// Serialize the 28-byte ARP payload
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(ARP_PAYLOAD_LEN);

        buf.put_u16(self.htype);
        buf.put_u16(self.ptype);
        buf.put_u8(self.hlen);
        buf.put_u8(self.plen);
        buf.put_u16(self.operation as u16);
        buf.put_slice(self.sender_mac.as_bytes());
        buf.put_slice(&self.sender_ip.octets());
        buf.put_slice(self.target_mac.as_bytes());
        buf.put_slice(&self.target_ip.octets());

        buf.to_vec()
    }

    /// Parse an ARP payload from bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < ARP_PAYLOAD_LEN {
            return Err(Error::PacketParsing("ARP packet too short".into()));
        }

        let htype = u16::from_be_bytes([data[0], data[1]]);
        let ptype = u16::from_be_bytes([data[2], data[3]]);
        let hlen = data[4];
        let plen = data[5];
        let op_val = u16::from_be_bytes([data[6], data[7]]);

        let operation = ArpOpcode::from_u16(op_val)
            .ok_or_else(|| Error::PacketParsing("Invalid ARP opcode".into()))?;

        let mut sender_mac = [0u8; 6];
        sender_mac.copy_from_slice(&data[8..14]);
        let sender_ip = Ipv4Address([data[14], data[15], data[16], data[17]]);

        let mut target_mac = [0u8; 6];
        target_mac.copy_from_slice(&data[18..24]);
        let target_ip = Ipv4Address([data[24], data[25], data[26], data[27]]);

        Ok(Self {
            htype,
            ptype,
            hlen,
            plen,
            operation,
            sender_mac: MacAddr(sender_mac),
            sender_ip,
            target_mac: MacAddr(target_mac),
            target_ip,
        })
    }
}

/// Prepend an Ethernet header to an ARP payload
fn build_ethernet_frame(dest_mac: MacAddr, src_mac: MacAddr, arp: &ArpPacket) -> Vec<u8> {
    let mut frame = BytesMut::with_capacity(ARP_FRAME_LEN);

    frame.put_slice(dest_mac.as_bytes());
    frame.put_slice(src_mac.as_bytes());
    frame.put_u16(ETHERTYPE_ARP);
    frame.put_slice(&arp.serialize());

    frame.to_vec()
}

/// Build a 42-byte ARP reply frame announcing `announced_ip` as owned by
/// `announced_mac`, addressed to the recipient.
///
/// This is both the spoof primitive (announced MAC = our MAC, announced
/// IP = the impersonated party) and the restore primitive (announced MAC
/// = the real owner's MAC).
pub fn build_arp_reply(
    announced_ip: Ipv4Address,
    announced_mac: MacAddr,
    recipient_ip: Ipv4Address,
    recipient_mac: MacAddr,
) -> Vec<u8> {
    let arp = ArpPacket::reply(announced_mac, announced_ip, recipient_mac, recipient_ip);
    build_ethernet_frame(recipient_mac, announced_mac, &arp)
}

/// Build a 42-byte broadcast ARP request for `target_ip`, used by active
/// MAC resolution probing.
pub fn build_arp_request(
    target_ip: Ipv4Address,
    sender_mac: MacAddr,
    sender_ip: Ipv4Address,
) -> Vec<u8> {
    let arp = ArpPacket::request(sender_mac, sender_ip, target_ip);
    build_ethernet_frame(MacAddr::broadcast(), sender_mac, &arp)
}
