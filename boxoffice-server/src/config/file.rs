//! TOML file configuration structures.
//!
//! These structs directly map to the `boxoffice-config.toml` file format.

use boxoffice_core::partners::PartnerKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use url::Url;

/// Root configuration structure as read from the TOML file.
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub partners: PartnersConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Partner routing table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnersConfig {
    /// Upper bound on a single reservation call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub routes: Vec<PartnerRouteConfig>,
}

impl Default for PartnersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            routes: Vec::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// One `[[partners.routes]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerRouteConfig {
    /// The partner id events refer to.
    pub id: i32,
    /// Wire format spoken by the partner.
    pub kind: PartnerKind,
    pub base_url: Url,
}

/// Price multiplier per ticket type, applied to the event's base price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_full_multiplier")]
    pub full: Decimal,
    #[serde(default = "default_half_multiplier")]
    pub half: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            full: default_full_multiplier(),
            half: default_half_multiplier(),
        }
    }
}

fn default_full_multiplier() -> Decimal {
    Decimal::ONE
}

fn default_half_multiplier() -> Decimal {
    Decimal::new(5, 1)
}
