//! arpmitm platform port
//!
//! The narrow OS-facing surface the attack engine consumes: interface
//! enumeration, IP-to-MAC resolution through the neighbor table, and a
//! raw link-layer socket. The engine only sees the [`Platform`] and
//! [`RawSocket`] traits; [`platform()`] selects the host implementation.

pub mod interface;
pub mod neighbor;
pub mod socket;

pub use interface::InterfaceDescriptor;
pub use socket::{HostPlatform, Platform, RawSocket};

/// Host platform factory. New platforms are additive: implement
/// [`Platform`] and branch here.
pub fn platform() -> Box<dyn Platform> {
    Box::new(HostPlatform::new())
}
