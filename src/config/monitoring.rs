use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::SocketAddr;

use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::Error;
use crate::Result;

/// Exposure of the observe relation metrics over HTTP
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MonitoringConfig {
    /// Serve `/metrics` for the observe counters and gauges
    #[serde(default)]
    pub prometheus_enabled: bool,

    #[serde(default = "default_prometheus_port")]
    pub prometheus_port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            prometheus_enabled: false,
            prometheus_port: default_prometheus_port(),
            bind_address: default_bind_address(),
        }
    }
}

impl MonitoringConfig {
    /// Address of the metrics server, `None` while monitoring is disabled.
    pub fn metrics_address(&self) -> Option<SocketAddr> {
        self.prometheus_enabled
            .then(|| SocketAddr::new(self.bind_address, self.prometheus_port))
    }

    /// Validates monitoring configuration
    /// # Errors
    /// Returns `Error::InvalidConfig` when the metrics server is enabled on
    /// port 0 or on a privileged port
    pub fn validate(&self) -> Result<()> {
        match (self.prometheus_enabled, self.prometheus_port) {
            (true, 0) => Err(Error::InvalidConfig(
                "prometheus_port cannot be 0 when enabled".into(),
            )),
            (true, port) if port < 1024 => Err(Error::InvalidConfig(format!(
                "prometheus_port {port} is a privileged port (requires root)"
            ))),
            (false, port) if port != default_prometheus_port() => {
                warn!("observe metrics port {} configured, but monitoring is disabled", port);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn default_prometheus_port() -> u16 {
    9100
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}
