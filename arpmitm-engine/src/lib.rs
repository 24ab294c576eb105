//! arpmitm attack engine
//!
//! Owns the whole lifecycle of one ARP poisoning run: configuration and
//! address resolution, the spoof/relay loop, and ARP cache restoration
//! on shutdown. One engine value per attack; no process-wide state.

pub mod engine;

pub use engine::{AttackEngine, Phase, StopHandle};
