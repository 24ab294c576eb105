//! Attack configuration and runtime state

use crate::{Ipv4Address, MacAddr};

/// User-supplied attack configuration. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// IP address of the victim host (required)
    pub victim_ip: Ipv4Address,
    /// IP address of the second party; the interface gateway when unset
    pub target_ip: Ipv4Address,
    /// Interface to attack on; auto-detected when `None`
    pub interface: Option<String>,
    /// Poison only the victim's ARP cache
    pub oneway: bool,
    /// Discard intercepted traffic instead of relaying it
    pub drop_mode: bool,
    /// Seconds between ARP re-announcements; must be greater than zero
    pub arp_interval_secs: u64,
}

impl AttackConfig {
    /// Default re-announce interval in seconds
    pub const DEFAULT_INTERVAL_SECS: u64 = 2;

    /// Configuration poisoning `victim_ip`, with everything else defaulted
    pub fn new(victim_ip: Ipv4Address) -> Self {
        Self {
            victim_ip,
            target_ip: Ipv4Address::UNSPECIFIED,
            interface: None,
            oneway: false,
            drop_mode: false,
            arp_interval_secs: Self::DEFAULT_INTERVAL_SECS,
        }
    }
}

/// Resolved addresses and counters for a configured attack.
///
/// Owned exclusively by the engine; mutated only from the run-loop thread.
#[derive(Debug, Clone, Default)]
pub struct AttackState {
    pub victim_ip: Ipv4Address,
    pub victim_mac: MacAddr,
    pub target_ip: Ipv4Address,
    pub target_mac: MacAddr,
    pub own_mac: MacAddr,
    pub interface: String,
    pub active: bool,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_dropped: u64,
}

impl AttackState {
    /// Clear counters and mark the attack active
    pub fn begin_run(&mut self) {
        self.active = true;
        self.packets_sent = 0;
        self.packets_received = 0;
        self.packets_dropped = 0;
    }

    /// Mark the attack inactive
    pub fn end_run(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AttackConfig::new(Ipv4Address::new(192, 168, 1, 50));
        assert!(config.target_ip.is_unspecified());
        assert!(config.interface.is_none());
        assert!(!config.oneway);
        assert!(!config.drop_mode);
        assert_eq!(config.arp_interval_secs, 2);
    }

    #[test]
    fn test_state_run_transitions() {
        let mut state = AttackState {
            packets_sent: 10,
            ..Default::default()
        };

        state.begin_run();
        assert!(state.active);
        assert_eq!(state.packets_sent, 0);

        state.end_run();
        assert!(!state.active);
    }
}
