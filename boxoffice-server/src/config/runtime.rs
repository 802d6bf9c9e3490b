//! Validated configuration the server runs with.

use boxoffice_core::entities::PriceTable;
use boxoffice_core::partners::PartnerRoute;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub listen: SocketAddr,
    pub partner_routes: Vec<PartnerRoute>,
    pub partner_timeout: Duration,
    pub prices: PriceTable,
}
