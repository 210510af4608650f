use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

use k8s_openapi::api::core::v1::Secret;
use thiserror::Error;

use frrsyncd_frr::{config as frr, ipfamily::IpFamily};

use crate::crd::routing_config::{
    AllowMode, BFDProfile, Neighbor, Router, RoutingConfig, SecretReference,
};

pub const DEFAULT_BGP_PORT: u16 = 179;

const SECRET_TYPE_BASIC_AUTH: &str = "kubernetes.io/basic-auth";
const SECRET_PASSWORD_KEY: &str = "password";
const LARGE_COMMUNITY_PREFIX: &str = "large:";

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to process neighbor {neighbor} for router {router}: {source}")]
    Neighbor {
        neighbor: String,
        router: String,
        #[source]
        source: Box<ConversionError>,
    },

    #[error("secret ref not found for neighbor {0}")]
    SecretMissing(String),

    #[error("secret {secret} for neighbor {neighbor} is not of type basic-auth")]
    SecretTypeMismatch { secret: String, neighbor: String },

    #[error("password field not found in secret {secret} for neighbor {neighbor}")]
    SecretNoPassword { secret: String, neighbor: String },

    #[error("password in secret {secret} for neighbor {neighbor} is not valid UTF-8")]
    SecretPasswordNotUtf8 { secret: String, neighbor: String },

    #[error("prefix {prefix} to advertise from neighbor {neighbor} is not in the router prefixes")]
    PrefixNotInRouter { prefix: String, neighbor: String },

    #[error("prefix {prefix} with community {community} not in allowed list for neighbor {neighbor}")]
    CommunityOnUnallowedPrefix {
        prefix: String,
        community: String,
        neighbor: String,
    },

    #[error("localPref associated to non existing prefix {prefix} for neighbor {neighbor}")]
    LocalPrefOnUnallowedPrefix { prefix: String, neighbor: String },

    #[error("multiple local prefs specified for prefix {prefix} of neighbor {neighbor}")]
    MultipleLocalPrefs { prefix: String, neighbor: String },

    #[error("conflicting passwords for neighbor {0}")]
    NeighborPasswordConflict(String),

    #[error("conflicting definitions for BFD profile {0}")]
    BFDProfileConflict(String),

    #[error("{0}")]
    Address(#[from] frrsyncd_frr::error::Error),
}

/// Merges the RoutingConfigs selected for this node into one FRR
/// configuration.
///
/// Routers are unique by (asn, vrf), neighbors by address within their
/// router. The output is canonicalized so it only depends on the set of
/// inputs, not their order: routers are sorted by (asn, vrf), neighbors by
/// address, prefix and filter lists lexically. Any validation failure
/// aborts the whole conversion; no partial configuration is produced.
pub fn api_to_frr(
    configs: &[RoutingConfig],
    secrets: &BTreeMap<String, Secret>,
) -> Result<frr::Config, ConversionError> {
    let mut routers: BTreeMap<(u32, String), RouterAcc> = BTreeMap::new();
    let mut bfd_profiles: BTreeMap<String, BFDProfile> = BTreeMap::new();
    let mut raws: Vec<(i32, String)> = Vec::new();

    for config in configs.iter() {
        for router in config.spec.bgp.routers.iter() {
            merge_router(&mut routers, router, secrets)?;
        }
        for profile in config.spec.bgp.bfd_profiles.iter() {
            match bfd_profiles.entry(profile.name.clone()) {
                Entry::Occupied(existing) => {
                    if existing.get() != profile {
                        return Err(ConversionError::BFDProfileConflict(profile.name.clone()));
                    }
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(profile.clone());
                }
            }
        }
        if let Some(raw) = &config.spec.raw {
            if !raw.config.is_empty() {
                raws.push((raw.priority, raw.config.clone()));
            }
        }
    }

    let mut out = frr::Config {
        routers: Vec::with_capacity(routers.len()),
        bfd_profiles: bfd_profiles.into_values().map(bfd_profile_to_frr).collect(),
        extra_config: join_raw_configs(raws),
    };
    for acc in routers.into_values() {
        out.routers.push(acc.into_router_config()?);
    }
    Ok(out)
}

fn merge_router(
    routers: &mut BTreeMap<(u32, String), RouterAcc>,
    router: &Router,
    secrets: &BTreeMap<String, Secret>,
) -> Result<(), ConversionError> {
    let vrf = router.vrf.clone().unwrap_or_default();
    let acc = routers
        .entry((router.asn, vrf.clone()))
        .or_insert_with(|| RouterAcc::new(router.asn, vrf));

    // the first contributor to declare a router id wins
    if acc.router_id.is_none() {
        if let Some(id) = router.id.as_ref().filter(|id| !id.is_empty()) {
            acc.router_id = Some(id.clone());
        }
    }
    acc.prefixes.extend(router.prefixes.iter().cloned());

    let declared: BTreeSet<&str> = router.prefixes.iter().map(String::as_str).collect();
    for neighbor in router.neighbors.iter() {
        acc.merge_neighbor(neighbor, &declared, secrets)
            .map_err(|e| ConversionError::Neighbor {
                neighbor: neighbor_name(neighbor.asn, &neighbor.address),
                router: format!("{}-{}", acc.asn, acc.vrf),
                source: Box::new(e),
            })?;
    }
    Ok(())
}

fn neighbor_name(asn: u32, address: &str) -> String {
    format!("{asn}@{address}")
}

fn resolve_password(
    secrets: &BTreeMap<String, Secret>,
    secret_ref: &SecretReference,
    neighbor: &str,
) -> Result<String, ConversionError> {
    let secret = secrets
        .get(&secret_ref.name)
        .ok_or_else(|| ConversionError::SecretMissing(neighbor.to_string()))?;
    if secret.type_.as_deref() != Some(SECRET_TYPE_BASIC_AUTH) {
        return Err(ConversionError::SecretTypeMismatch {
            secret: secret_ref.name.clone(),
            neighbor: neighbor.to_string(),
        });
    }
    let password = secret
        .data
        .as_ref()
        .and_then(|data| data.get(SECRET_PASSWORD_KEY))
        .ok_or_else(|| ConversionError::SecretNoPassword {
            secret: secret_ref.name.clone(),
            neighbor: neighbor.to_string(),
        })?;
    String::from_utf8(password.0.clone()).map_err(|_| ConversionError::SecretPasswordNotUtf8 {
        secret: secret_ref.name.clone(),
        neighbor: neighbor.to_string(),
    })
}

fn bfd_profile_to_frr(profile: BFDProfile) -> frr::BFDProfile {
    frr::BFDProfile {
        name: profile.name,
        receive_interval: profile.receive_interval,
        transmit_interval: profile.transmit_interval,
        detect_multiplier: profile.detect_multiplier,
        echo_interval: profile.echo_interval,
        echo_mode: profile.echo_mode,
        passive_mode: profile.passive_mode,
        minimum_ttl: profile.minimum_ttl,
    }
}

fn join_raw_configs(mut raws: Vec<(i32, String)>) -> String {
    // stable by priority, so equal priorities keep input order
    raws.sort_by_key(|(priority, _)| *priority);
    let mut out = String::new();
    for (_, snippet) in raws {
        out.push_str(&snippet);
        out.push('\n');
    }
    out
}

/// Accumulates the contributions of every RoutingConfig to one (asn, vrf)
/// router. Lives only for a single conversion.
struct RouterAcc {
    asn: u32,
    vrf: String,
    router_id: Option<String>,
    prefixes: BTreeSet<String>,
    neighbors: BTreeMap<String, NeighborAcc>,
}

impl RouterAcc {
    fn new(asn: u32, vrf: String) -> RouterAcc {
        RouterAcc {
            asn,
            vrf,
            router_id: None,
            prefixes: BTreeSet::new(),
            neighbors: BTreeMap::new(),
        }
    }

    fn merge_neighbor(
        &mut self,
        neighbor: &Neighbor,
        declared: &BTreeSet<&str>,
        secrets: &BTreeMap<String, Secret>,
    ) -> Result<(), ConversionError> {
        let name = neighbor_name(neighbor.asn, &neighbor.address);
        let password = match &neighbor.password_secret {
            Some(secret_ref) => Some(resolve_password(secrets, secret_ref, &name)?),
            None => None,
        };
        let ip_family = IpFamily::of(&neighbor.address)?;

        let acc = self
            .neighbors
            .entry(neighbor.address.clone())
            .or_insert_with(|| NeighborAcc::new(neighbor, ip_family));

        match (&acc.password, &password) {
            (Some(current), Some(new)) if current != new => {
                return Err(ConversionError::NeighborPasswordConflict(acc.name()));
            }
            (None, Some(new)) => acc.password = Some(new.clone()),
            _ => {}
        }

        let advertise_all = neighbor.to_advertise.allowed.mode == AllowMode::All;
        if advertise_all {
            acc.advertise_all = true;
        } else {
            for prefix in neighbor.to_advertise.allowed.prefixes.iter() {
                if !declared.contains(prefix.as_str()) {
                    return Err(ConversionError::PrefixNotInRouter {
                        prefix: prefix.clone(),
                        neighbor: neighbor.address.clone(),
                    });
                }
                acc.advertised.insert(prefix.clone());
            }
        }
        // the advertise set this contribution may attach attributes to;
        // for advertise-all the membership check moves to finalization,
        // where the full union of router prefixes is known
        let allowed: BTreeSet<&str> = neighbor
            .to_advertise
            .allowed
            .prefixes
            .iter()
            .map(String::as_str)
            .collect();

        for entry in neighbor.to_advertise.prefixes_with_community.iter() {
            let (community, large) = match entry.community.strip_prefix(LARGE_COMMUNITY_PREFIX) {
                Some(stripped) => (stripped.to_string(), true),
                None => (entry.community.clone(), false),
            };
            for prefix in entry.prefixes.iter() {
                if advertise_all {
                    acc.deferred.push(DeferredCheck::Community {
                        prefix: prefix.clone(),
                        community: entry.community.clone(),
                    });
                } else if !allowed.contains(prefix.as_str()) {
                    return Err(ConversionError::CommunityOnUnallowedPrefix {
                        prefix: prefix.clone(),
                        community: entry.community.clone(),
                        neighbor: neighbor.address.clone(),
                    });
                }
                let communities = if large {
                    &mut acc.large_communities
                } else {
                    &mut acc.communities
                };
                communities
                    .entry(prefix.clone())
                    .or_default()
                    .insert(community.clone());
            }
        }

        for entry in neighbor.to_advertise.prefixes_with_local_pref.iter() {
            for prefix in entry.prefixes.iter() {
                if advertise_all {
                    acc.deferred.push(DeferredCheck::LocalPref {
                        prefix: prefix.clone(),
                    });
                } else if !allowed.contains(prefix.as_str()) {
                    return Err(ConversionError::LocalPrefOnUnallowedPrefix {
                        prefix: prefix.clone(),
                        neighbor: neighbor.address.clone(),
                    });
                }
                match acc.local_prefs.entry(prefix.clone()) {
                    Entry::Occupied(existing) if *existing.get() != entry.local_pref => {
                        return Err(ConversionError::MultipleLocalPrefs {
                            prefix: prefix.clone(),
                            neighbor: neighbor.address.clone(),
                        });
                    }
                    Entry::Occupied(_) => {}
                    Entry::Vacant(vacant) => {
                        vacant.insert(entry.local_pref);
                    }
                }
            }
        }

        match neighbor.to_receive.allowed.mode {
            AllowMode::All => acc.receive_all = true,
            AllowMode::Filtered => acc
                .received
                .extend(neighbor.to_receive.allowed.prefixes.iter().cloned()),
        }
        Ok(())
    }

    fn into_router_config(self) -> Result<frr::RouterConfig, ConversionError> {
        let mut ipv4_prefixes = Vec::new();
        let mut ipv6_prefixes = Vec::new();
        for prefix in self.prefixes.iter() {
            match IpFamily::of(prefix)? {
                IpFamily::Ipv4 => ipv4_prefixes.push(prefix.clone()),
                IpFamily::Ipv6 => ipv6_prefixes.push(prefix.clone()),
            }
        }
        let mut neighbors = Vec::with_capacity(self.neighbors.len());
        for acc in self.neighbors.into_values() {
            neighbors.push(acc.into_neighbor_config(&self.prefixes)?);
        }
        Ok(frr::RouterConfig {
            my_asn: self.asn,
            router_id: self.router_id.unwrap_or_default(),
            vrf: self.vrf,
            neighbors,
            ipv4_prefixes,
            ipv6_prefixes,
        })
    }
}

enum DeferredCheck {
    Community { prefix: String, community: String },
    LocalPref { prefix: String },
}

struct NeighborAcc {
    asn: u32,
    address: String,
    port: u16,
    ip_family: IpFamily,
    hold_time: Option<u64>,
    keepalive_time: Option<u64>,
    ebgp_multi_hop: bool,
    password: Option<String>,
    advertise_all: bool,
    advertised: BTreeSet<String>,
    communities: BTreeMap<String, BTreeSet<String>>,
    large_communities: BTreeMap<String, BTreeSet<String>>,
    local_prefs: BTreeMap<String, u32>,
    deferred: Vec<DeferredCheck>,
    receive_all: bool,
    received: BTreeSet<String>,
}

impl NeighborAcc {
    fn new(neighbor: &Neighbor, ip_family: IpFamily) -> NeighborAcc {
        NeighborAcc {
            asn: neighbor.asn,
            address: neighbor.address.clone(),
            port: neighbor.port.unwrap_or(DEFAULT_BGP_PORT),
            ip_family,
            hold_time: neighbor.hold_time,
            keepalive_time: neighbor.keepalive_time,
            ebgp_multi_hop: neighbor.ebgp_multi_hop,
            password: None,
            advertise_all: false,
            advertised: BTreeSet::new(),
            communities: BTreeMap::new(),
            large_communities: BTreeMap::new(),
            local_prefs: BTreeMap::new(),
            deferred: Vec::new(),
            receive_all: false,
            received: BTreeSet::new(),
        }
    }

    fn name(&self) -> String {
        neighbor_name(self.asn, &self.address)
    }

    fn into_neighbor_config(
        mut self,
        router_prefixes: &BTreeSet<String>,
    ) -> Result<frr::NeighborConfig, ConversionError> {
        let advertised = if self.advertise_all {
            router_prefixes.clone()
        } else {
            std::mem::take(&mut self.advertised)
        };

        for check in self.deferred.iter() {
            match check {
                DeferredCheck::Community { prefix, community } if !advertised.contains(prefix) => {
                    return Err(ConversionError::CommunityOnUnallowedPrefix {
                        prefix: prefix.clone(),
                        community: community.clone(),
                        neighbor: self.address.clone(),
                    });
                }
                DeferredCheck::LocalPref { prefix } if !advertised.contains(prefix) => {
                    return Err(ConversionError::LocalPrefOnUnallowedPrefix {
                        prefix: prefix.clone(),
                        neighbor: self.address.clone(),
                    });
                }
                _ => {}
            }
        }

        let mut outgoing = frr::AllowedOut::default();
        for prefix in advertised.iter() {
            let filter = frr::OutgoingFilter {
                ip_family: IpFamily::of(prefix)?,
                prefix: prefix.clone(),
                communities: self
                    .communities
                    .get(prefix)
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default(),
                large_communities: self
                    .large_communities
                    .get(prefix)
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default(),
                local_pref: self.local_prefs.get(prefix).copied().unwrap_or(0),
            };
            match filter.ip_family {
                IpFamily::Ipv4 => outgoing.prefixes_v4.push(filter),
                IpFamily::Ipv6 => outgoing.prefixes_v6.push(filter),
            }
        }

        let mut incoming = frr::AllowedIn {
            all: self.receive_all,
            ..Default::default()
        };
        // an all filter supersedes explicit lists contributed elsewhere
        let received = if self.receive_all {
            BTreeSet::new()
        } else {
            std::mem::take(&mut self.received)
        };
        for prefix in received.iter() {
            let filter = frr::IncomingFilter {
                ip_family: IpFamily::of(prefix)?,
                prefix: prefix.clone(),
            };
            match filter.ip_family {
                IpFamily::Ipv4 => incoming.prefixes_v4.push(filter),
                IpFamily::Ipv6 => incoming.prefixes_v6.push(filter),
            }
        }

        Ok(frr::NeighborConfig {
            ip_family: self.ip_family,
            name: self.name(),
            asn: self.asn,
            addr: self.address,
            port: self.port,
            hold_time: self.hold_time,
            keepalive_time: self.keepalive_time,
            ebgp_multi_hop: self.ebgp_multi_hop,
            password: self.password.unwrap_or_default(),
            outgoing,
            incoming,
        })
    }
}
