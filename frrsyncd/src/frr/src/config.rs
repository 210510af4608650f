use serde::{Deserialize, Serialize};

use crate::ipfamily::IpFamily;

pub const RETRACTED_PASSWORD: &str = "<retracted>";

/// Fully assembled configuration for the local FRR instance.
///
/// This is rebuilt from scratch on every reconcile pass and handed to an
/// [`FrrHandler`](crate::handler::FrrHandler) as a value. Empty vectors,
/// not absent fields, represent "none".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub routers: Vec<RouterConfig>,
    pub bfd_profiles: Vec<BFDProfile>,
    pub extra_config: String,
}

impl Config {
    /// Copy of the configuration with every neighbor password retracted.
    pub fn sanitized(&self) -> Config {
        let mut sanitized = self.clone();
        for router in sanitized.routers.iter_mut() {
            for neighbor in router.neighbors.iter_mut() {
                neighbor.password = RETRACTED_PASSWORD.to_string();
            }
        }
        sanitized
    }

    /// Renders the configuration for diagnostics. Passwords never appear
    /// in the output.
    pub fn dump(&self) -> String {
        let sanitized = self.sanitized();
        serde_json::to_string(&sanitized).unwrap_or_else(|_| format!("{sanitized:?}"))
    }
}

/// One `router bgp` block, unique by (asn, vrf).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    pub my_asn: u32,
    pub router_id: String,
    pub vrf: String,
    pub neighbors: Vec<NeighborConfig>,
    pub ipv4_prefixes: Vec<String>,
    pub ipv6_prefixes: Vec<String>,
}

/// One BGP session, unique by address within its router.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborConfig {
    pub ip_family: IpFamily,
    pub name: String,
    pub asn: u32,
    pub addr: String,
    pub port: u16,
    pub hold_time: Option<u64>,
    pub keepalive_time: Option<u64>,
    pub ebgp_multi_hop: bool,
    pub password: String,
    pub outgoing: AllowedOut,
    pub incoming: AllowedIn,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedOut {
    pub prefixes_v4: Vec<OutgoingFilter>,
    pub prefixes_v6: Vec<OutgoingFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedIn {
    pub all: bool,
    pub prefixes_v4: Vec<IncomingFilter>,
    pub prefixes_v6: Vec<IncomingFilter>,
}

/// Announcement of one prefix, with the communities and local preference
/// attached to it. A `local_pref` of 0 means unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingFilter {
    pub ip_family: IpFamily,
    pub prefix: String,
    pub communities: Vec<String>,
    pub large_communities: Vec<String>,
    pub local_pref: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingFilter {
    pub ip_family: IpFamily,
    pub prefix: String,
}

/// BFD timers, carried through opaquely and deduplicated by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BFDProfile {
    pub name: String,
    pub receive_interval: Option<u32>,
    pub transmit_interval: Option<u32>,
    pub detect_multiplier: Option<u32>,
    pub echo_interval: Option<u32>,
    pub echo_mode: Option<bool>,
    pub passive_mode: Option<bool>,
    pub minimum_ttl: Option<u32>,
}
