//! `[serve]` section: where the API and the generated pages are served.

use super::{ConfigError, defaults};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// `[serve]` section in marknote.toml.
///
/// ```toml
/// [serve]
/// interface = "127.0.0.1"
/// port = 5000     # first port tried, later ones are used if it is taken
/// watch = true    # regenerate on store changes while serving
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Address to listen on, IPv4 or IPv6. Loopback unless configured.
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,

    /// Start the store watcher next to the server.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub watch: bool,
}

impl ServeConfig {
    /// The listening address as an IP.
    pub fn ip(&self) -> Result<IpAddr, ConfigError> {
        self.interface.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "[serve.interface] `{}` is not an IP address",
                self.interface
            ))
        })
    }
}
