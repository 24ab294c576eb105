//! CLI argument parsing

use clap::Parser;

use arpmitm_core::{AttackConfig, Error, Ipv4Address, Result};

#[derive(Parser, Debug)]
#[command(name = "arpmitm")]
#[command(version, about = "ARP cache poisoning man-in-the-middle tool", long_about = None)]
#[command(after_help = "Requires elevated privileges (raw sockets, promiscuous mode).\n\
                        Use only on networks you are authorized to test.")]
pub struct Cli {
    /// IP address of the victim host
    #[arg(value_name = "VICTIM_IP", required_unless_present = "list")]
    pub victim: Option<String>,

    /// IP address of the second party (defaults to the gateway)
    #[arg(value_name = "TARGET_IP")]
    pub target: Option<String>,

    /// Network interface to attack on (auto-detected when omitted)
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Poison only the victim's ARP cache
    #[arg(short, long)]
    pub oneway: bool,

    /// Discard intercepted traffic instead of relaying it
    #[arg(short, long)]
    pub drop: bool,

    /// ARP re-announce interval in seconds
    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        default_value_t = AttackConfig::DEFAULT_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// List available network interfaces and exit
    #[arg(short, long)]
    pub list: bool,

    /// Verbose output (-v, -vv for increasing verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Build the attack configuration, validating the IP arguments.
    pub fn attack_config(&self) -> Result<AttackConfig> {
        let victim_str = self.victim.as_deref().unwrap_or("");
        let victim_ip = Ipv4Address::parse(victim_str);
        if victim_ip.is_unspecified() {
            return Err(Error::config(format!(
                "invalid victim IP address: '{victim_str}'"
            )));
        }

        let target_ip = match self.target.as_deref() {
            Some(s) => {
                let ip = Ipv4Address::parse(s);
                if ip.is_unspecified() {
                    return Err(Error::config(format!("invalid target IP address: '{s}'")));
                }
                ip
            }
            None => Ipv4Address::UNSPECIFIED,
        };

        Ok(AttackConfig {
            victim_ip,
            target_ip,
            interface: self.interface.clone(),
            oneway: self.oneway,
            drop_mode: self.drop,
            arp_interval_secs: self.interval,
        })
    }
}
