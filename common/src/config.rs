use std::time::Duration;

/// Knobs shared by every probe. One instance per scan invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Disables reverse-DNS lookups entirely.
    pub no_dns: bool,
    /// Bounded wait for a single ARP reply.
    pub arp_timeout: Duration,
    /// Per-port TCP connect timeout during service probing.
    pub connect_timeout: Duration,
    /// How long to wait for a banner after a port accepts.
    pub banner_timeout: Duration,
    /// 0 = full output, higher values progressively mute the terminal.
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            no_dns: false,
            arp_timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_millis(500),
            banner_timeout: Duration::from_millis(800),
            quiet: 0,
        }
    }
}
