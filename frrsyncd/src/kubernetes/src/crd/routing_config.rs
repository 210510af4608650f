use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Declarative BGP/BFD intent for the nodes selected by `node_selector`.
///
/// Every RoutingConfig whose selector matches the local node is merged
/// into the single configuration applied to the local FRR instance.
#[derive(CustomResource, Debug, Serialize, Deserialize, Default, Clone, JsonSchema)]
#[kube(group = "frrsync.io", version = "v1beta1", kind = "RoutingConfig", namespaced)]
#[kube(status = "RoutingConfigStatus")]
#[kube(
    printcolumn = r#"{"name":"AGE", "type":"date", "description":"Date from created", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfigSpec {
    #[serde(default)]
    pub bgp: BGPConfig,
    pub raw: Option<RawConfig>,
    pub node_selector: Option<NodeSelector>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
pub struct RoutingConfigStatus {}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BGPConfig {
    #[serde(default)]
    pub routers: Vec<Router>,
    #[serde(default)]
    pub bfd_profiles: Vec<BFDProfile>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    pub asn: u32,
    pub id: Option<String>,
    /// VRF the router lives in. Empty means the default VRF.
    pub vrf: Option<String>,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub neighbors: Vec<Neighbor>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Neighbor {
    pub asn: u32,
    pub address: String,
    pub port: Option<u16>,
    #[serde(default)]
    pub ebgp_multi_hop: bool,
    pub hold_time: Option<u64>,
    pub keepalive_time: Option<u64>,
    pub password_secret: Option<SecretReference>,
    #[serde(default)]
    pub to_advertise: Advertise,
    #[serde(default)]
    pub to_receive: Receive,
}

/// Reference to a basic-auth secret holding the session password in its
/// `password` field.
#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Advertise {
    #[serde(default)]
    pub allowed: AllowedPrefixes,
    #[serde(default)]
    pub prefixes_with_community: Vec<CommunityPrefixes>,
    #[serde(default)]
    pub prefixes_with_local_pref: Vec<LocalPrefPrefixes>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Receive {
    #[serde(default)]
    pub allowed: AllowedPrefixes,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllowedPrefixes {
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub mode: AllowMode,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, JsonSchema, PartialEq, Eq)]
pub enum AllowMode {
    /// Only the prefixes listed explicitly.
    #[default]
    #[serde(rename = "filtered")]
    Filtered,
    /// For advertisements, every prefix of the owning router; for
    /// receiving, everything the neighbor sends.
    #[serde(rename = "all")]
    All,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPrefixes {
    /// `"<asn>:<value>"`, or `"large:<a>:<b>:<c>"` for a large community.
    pub community: String,
    #[serde(default)]
    pub prefixes: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocalPrefPrefixes {
    pub local_pref: u32,
    #[serde(default)]
    pub prefixes: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema, PartialEq)]
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

/// Raw FRR configuration lines appended verbatim after the generated
/// sections, ordered by ascending priority.
#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub config: String,
}

/// Subset of the Kubernetes label-selector grammar used to scope a
/// RoutingConfig to nodes. Empty selectors match every node.
#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelector {
    pub match_labels: Option<BTreeMap<String, String>>,
    pub match_expressions: Option<Vec<MatchExpression>>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchExpression {
    pub key: String,
    pub operator: SelectorOperator,
    pub values: Option<Vec<String>>,
}

#[derive(Deserialize, Serialize, Clone, Copy, Default, Debug, JsonSchema, PartialEq, Eq)]
pub enum SelectorOperator {
    #[default]
    In,
    NotIn,
    Exists,
    DoesNotExist,
}
