//! IPv4 address value type and network math
//!
//! A thin 4-byte value type with the bit and arithmetic operations the
//! attack engine needs for interface auto-detection (network membership,
//! masks, broadcast/host ranges). The all-zero address is the canonical
//! "empty/unset" sentinel: parsing failures yield it instead of an error,
//! and callers test it with [`Ipv4Address::is_unspecified`].

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::{Add, BitAnd, BitOr, BitXor, Not, Sub};

/// IPv4 address (4 bytes, network order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ipv4Address(pub [u8; 4]);

impl Ipv4Address {
    /// The all-zero sentinel (0.0.0.0), used as "empty/unset"
    pub const UNSPECIFIED: Self = Self([0, 0, 0, 0]);

    /// 127.0.0.1
    pub const LOCALHOST: Self = Self([127, 0, 0, 1]);

    /// 255.255.255.255
    pub const BROADCAST: Self = Self([255, 255, 255, 255]);

    /// Create an address from four octets
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self([a, b, c, d])
    }

    /// Parse a dotted-decimal string.
    ///
    /// Any malformed input (wrong token count, non-digit characters,
    /// out-of-range byte, trailing garbage) yields the all-zero sentinel
    /// rather than an error.
    pub fn parse(s: &str) -> Self {
        let mut octets = [0u8; 4];
        let mut tokens = s.split('.');

        for octet in octets.iter_mut() {
            let token = match tokens.next() {
                Some(t) => t,
                None => return Self::UNSPECIFIED,
            };
            if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
                return Self::UNSPECIFIED;
            }
            match token.parse::<u32>() {
                Ok(v) if v <= 255 => *octet = v as u8,
                _ => return Self::UNSPECIFIED,
            }
        }

        if tokens.next().is_some() {
            return Self::UNSPECIFIED;
        }

        Self(octets)
    }

    /// Build a netmask from a CIDR prefix length; `None` for prefixes > 32
    pub fn from_prefix_len(prefix: u8) -> Option<Self> {
        if prefix > 32 {
            return None;
        }
        let mask = if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix))
        };
        Some(Self::from_u32(mask))
    }

    /// The raw octets
    pub const fn octets(&self) -> [u8; 4] {
        self.0
    }

    /// Numeric value (big-endian semantic)
    pub const fn to_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Address from its numeric value
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    /// True for the all-zero sentinel
    pub fn is_unspecified(&self) -> bool {
        *self == Self::UNSPECIFIED
    }

    /// True for 127.0.0.0/8
    pub fn is_loopback(&self) -> bool {
        self.0[0] == 127
    }

    /// True for the RFC 1918 private ranges
    pub fn is_private(&self) -> bool {
        match self.0 {
            [10, ..] => true,
            [172, b, ..] => (16..=31).contains(&b),
            [192, 168, ..] => true,
            _ => false,
        }
    }

    /// Next address, wrapping at 255.255.255.255
    pub fn next(&self) -> Self {
        Self::from_u32(self.to_u32().wrapping_add(1))
    }

    /// Previous address, wrapping at 0.0.0.0
    pub fn prev(&self) -> Self {
        Self::from_u32(self.to_u32().wrapping_sub(1))
    }

    /// Network address under the given mask (`self & mask`)
    pub fn network_address(&self, mask: Ipv4Address) -> Self {
        *self & mask
    }

    /// Directed broadcast address under the given mask (`self | !mask`)
    pub fn broadcast_address(&self, mask: Ipv4Address) -> Self {
        *self | !mask
    }

    /// First usable host address in the network
    pub fn first_host(&self, mask: Ipv4Address) -> Self {
        self.network_address(mask).next()
    }

    /// Last usable host address in the network
    pub fn last_host(&self, mask: Ipv4Address) -> Self {
        self.broadcast_address(mask).prev()
    }

    /// Number of usable host addresses in the network.
    ///
    /// `broadcast - network - 1`, saturating at 0 so that /31 and /32
    /// networks report no usable hosts.
    pub fn host_count(&self, mask: Ipv4Address) -> u32 {
        let network = self.network_address(mask).to_u32();
        let broadcast = self.broadcast_address(mask).to_u32();
        (broadcast - network).saturating_sub(1)
    }

    /// Whether two addresses share a network under the given mask
    pub fn in_same_network(&self, other: Ipv4Address, mask: Ipv4Address) -> bool {
        self.network_address(mask) == other.network_address(mask)
    }
}

impl fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl BitAnd for Ipv4Address {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self::from_u32(self.to_u32() & rhs.to_u32())
    }
}

impl BitOr for Ipv4Address {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_u32(self.to_u32() | rhs.to_u32())
    }
}

impl BitXor for Ipv4Address {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self::from_u32(self.to_u32() ^ rhs.to_u32())
    }
}

impl Not for Ipv4Address {
    type Output = Self;

    fn not(self) -> Self {
        Self::from_u32(!self.to_u32())
    }
}

impl Add<u32> for Ipv4Address {
    type Output = Self;

    fn add(self, rhs: u32) -> Self {
        Self::from_u32(self.to_u32().wrapping_add(rhs))
    }
}

impl Sub<u32> for Ipv4Address {
    type Output = Self;

    fn sub(self, rhs: u32) -> Self {
        Self::from_u32(self.to_u32().wrapping_sub(rhs))
    }
}

impl From<Ipv4Addr> for Ipv4Address {
    fn from(addr: Ipv4Addr) -> Self {
        Self(addr.octets())
    }
}

impl From<Ipv4Address> for Ipv4Addr {
    fn from(addr: Ipv4Address) -> Self {
        Ipv4Addr::from(addr.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_roundtrip() {
        for s in ["0.0.0.1", "192.168.1.10", "255.255.255.255", "10.0.0.1"] {
            let addr = Ipv4Address::parse(s);
            assert_eq!(addr.to_string(), s);
            assert_eq!(Ipv4Address::parse(&addr.to_string()), addr);
        }
    }

    #[test]
    fn test_parse_invalid_yields_sentinel() {
        for s in [
            "",
            "1.2.3",
            "1.2.3.4.5",
            "1.2.3.256",
            "1.2.3.x",
            "1..3.4",
            "1.2.3.4 ",
            "-1.2.3.4",
        ] {
            assert!(Ipv4Address::parse(s).is_unspecified(), "input: {s:?}");
        }
    }

    #[test]
    fn test_u32_conversion() {
        let addr = Ipv4Address::new(192, 168, 1, 1);
        assert_eq!(addr.to_u32(), 0xC0A8_0101);
        assert_eq!(Ipv4Address::from_u32(0xC0A8_0101), addr);
    }

    #[test]
    fn test_ordering_matches_numeric() {
        let a = Ipv4Address::new(10, 0, 0, 255);
        let b = Ipv4Address::new(10, 0, 1, 0);
        assert!(a < b);
        assert!(a.to_u32() < b.to_u32());
    }

    #[test]
    fn test_prefix_len_masks() {
        assert_eq!(
            Ipv4Address::from_prefix_len(24),
            Some(Ipv4Address::new(255, 255, 255, 0))
        );
        assert_eq!(Ipv4Address::from_prefix_len(0), Some(Ipv4Address::UNSPECIFIED));
        assert_eq!(Ipv4Address::from_prefix_len(32), Some(Ipv4Address::BROADCAST));
        assert_eq!(Ipv4Address::from_prefix_len(33), None);
    }

    #[test]
    fn test_network_math() {
        let addr = Ipv4Address::new(192, 168, 1, 130);
        let mask = Ipv4Address::from_prefix_len(24).unwrap();

        assert_eq!(addr.network_address(mask), Ipv4Address::new(192, 168, 1, 0));
        assert_eq!(
            addr.broadcast_address(mask),
            Ipv4Address::new(192, 168, 1, 255)
        );
        assert_eq!(addr.first_host(mask), Ipv4Address::new(192, 168, 1, 1));
        assert_eq!(addr.last_host(mask), Ipv4Address::new(192, 168, 1, 254));

        // network | broadcast == broadcast
        let network = addr.network_address(mask);
        let broadcast = addr.broadcast_address(mask);
        assert_eq!(network | broadcast, broadcast);
    }

    #[test]
    fn test_host_count() {
        let addr = Ipv4Address::new(10, 1, 2, 3);
        for prefix in 1..31u8 {
            let mask = Ipv4Address::from_prefix_len(prefix).unwrap();
            let expected = 2u64.pow(32 - u32::from(prefix)) - 2;
            assert_eq!(u64::from(addr.host_count(mask)), expected, "/{prefix}");
        }

        // /31 and /32 saturate at zero
        let mask31 = Ipv4Address::from_prefix_len(31).unwrap();
        let mask32 = Ipv4Address::from_prefix_len(32).unwrap();
        assert_eq!(addr.host_count(mask31), 0);
        assert_eq!(addr.host_count(mask32), 0);
    }

    #[test]
    fn test_same_network_membership() {
        let mask = Ipv4Address::from_prefix_len(24).unwrap();
        let gateway = Ipv4Address::new(192, 168, 1, 1);

        assert!(Ipv4Address::new(192, 168, 1, 10).in_same_network(gateway, mask));
        assert!(!Ipv4Address::new(192, 168, 2, 10).in_same_network(gateway, mask));
    }

    #[test]
    fn test_increment_decrement_wrap() {
        assert_eq!(Ipv4Address::BROADCAST.next(), Ipv4Address::UNSPECIFIED);
        assert_eq!(Ipv4Address::UNSPECIFIED.prev(), Ipv4Address::BROADCAST);
        assert_eq!(
            Ipv4Address::new(10, 0, 0, 255).next(),
            Ipv4Address::new(10, 0, 1, 0)
        );
    }

    #[test]
    fn test_arithmetic_wraps() {
        let addr = Ipv4Address::new(0, 0, 0, 1);
        assert_eq!(addr + 255, Ipv4Address::new(0, 0, 1, 0));
        assert_eq!(addr - 2, Ipv4Address::BROADCAST);
    }

    #[test]
    fn test_bit_ops() {
        let a = Ipv4Address::new(192, 168, 1, 130);
        let m = Ipv4Address::new(255, 255, 255, 0);
        assert_eq!(a & m, Ipv4Address::new(192, 168, 1, 0));
        assert_eq!((a ^ a), Ipv4Address::UNSPECIFIED);
        assert_eq!(!Ipv4Address::UNSPECIFIED, Ipv4Address::BROADCAST);
    }

    #[test]
    fn test_classification() {
        assert!(Ipv4Address::LOCALHOST.is_loopback());
        assert!(Ipv4Address::new(10, 1, 1, 1).is_private());
        assert!(Ipv4Address::new(172, 16, 0, 1).is_private());
        assert!(!Ipv4Address::new(172, 32, 0, 1).is_private());
        assert!(Ipv4Address::new(192, 168, 0, 1).is_private());
        assert!(!Ipv4Address::new(8, 8, 8, 8).is_private());
    }

    #[test]
    fn test_std_conversion() {
        let std_addr = Ipv4Addr::new(192, 168, 1, 1);
        let addr: Ipv4Address = std_addr.into();
        assert_eq!(addr, Ipv4Address::new(192, 168, 1, 1));
        assert_eq!(Ipv4Addr::from(addr), std_addr);
    }
}
