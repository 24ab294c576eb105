//! arpmitm core library
//!
//! Value types, attack configuration and error handling shared by every
//! other arpmitm crate.

pub mod addr;
pub mod config;
pub mod error;
pub mod types;

pub use addr::Ipv4Address;
pub use config::{AttackConfig, AttackState};
pub use error::{Error, Result};
pub use types::MacAddr;
