use std::{collections::BTreeMap, sync::Arc, time::Duration};

use futures::StreamExt;
use k8s_openapi::api::core::v1::{Node, Secret};
use kube::{
    api::ListParams,
    runtime::{watcher, WatchStreamExt},
    Api, Client, ResourceExt,
};
use tokio::sync::mpsc;

use frrsyncd_frr::{config as frr, handler::FrrHandler};

use crate::{
    agent::{conversion, error::Error, selector},
    config::Config,
    context::{Context, State},
    crd::routing_config::RoutingConfig,
};

pub const RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Watches RoutingConfigs in every namespace, Secrets in the agent
/// namespace and the local Node, and recomputes the FRR configuration on
/// any change.
///
/// All three watch streams feed a single bounded trigger channel. There is
/// only one meaningful work item ("recompute from the current cluster
/// state"), so bursts of events coalesce into one follow-up pass and at
/// most one pass runs at a time.
pub async fn run(state: State, config: Config, handler: Arc<dyn FrrHandler>) {
    let client = Client::try_default()
        .await
        .expect("Failed to create kube client");

    let routing_configs = Api::<RoutingConfig>::all(client.clone());
    if let Err(e) = routing_configs.list(&ListParams::default().limit(1)).await {
        tracing::error!("CRD is not queryable; {e:?}. Is the CRD installed?");
        tracing::info!("Installation: cargo run --bin crdgen | kubectl apply -f -");
        std::process::exit(1);
    }

    tracing::info!(node = config.node_name, "Start RoutingConfig reconciler");

    let ctx = state.to_context(client.clone(), config.requeue_interval, handler);

    let (tx, mut rx) = mpsc::channel::<()>(1);
    let _ = tx.try_send(());

    spawn_trigger(
        Api::<RoutingConfig>::all(client.clone()),
        watcher::Config::default(),
        "routingconfig",
        tx.clone(),
    );
    spawn_trigger(
        Api::<Secret>::namespaced(client.clone(), &config.namespace),
        watcher::Config::default(),
        "secret",
        tx.clone(),
    );
    spawn_trigger(
        Api::<Node>::all(client.clone()),
        watcher::Config::default().fields(&format!("metadata.name={}", config.node_name)),
        "node",
        tx.clone(),
    );

    let mut resync = tokio::time::interval(Duration::from_secs(ctx.resync_interval.max(1)));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down RoutingConfig reconciler");
                return;
            }
            _ = resync.tick() => {
                let _ = tx.try_send(());
            }
            trigger = rx.recv() => {
                if trigger.is_none() {
                    return;
                }
                if let Err(e) = reconcile(&config, ctx.clone()).await {
                    tracing::warn!(error = %e, "reconcile failed");
                    ctx.metrics.reconcile_failure(&e);
                    let retry = tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(RETRY_INTERVAL).await;
                        let _ = retry.try_send(());
                    });
                }
            }
        }
    }
}

fn spawn_trigger<K>(
    api: Api<K>,
    watch_config: watcher::Config,
    kind: &'static str,
    tx: mpsc::Sender<()>,
) where
    K: kube::Resource + Clone + std::fmt::Debug + serde::de::DeserializeOwned + Send + 'static,
    K::DynamicType: Default + Eq + std::hash::Hash + Clone,
{
    tokio::spawn(async move {
        let mut stream = std::pin::pin!(watcher(api, watch_config).default_backoff().touched_objects());
        while let Some(event) = stream.next().await {
            match event {
                Ok(obj) => {
                    tracing::debug!(kind = kind, name = obj.name_any(), "watch event");
                    let _ = tx.try_send(());
                }
                Err(e) => tracing::warn!(kind = kind, error = %e, "watch stream error"),
            }
        }
    });
}

/// One reconcile pass: fetch a snapshot of the cluster state, translate it
/// and hand the result to the FRR handler. Pure function of its inputs;
/// failures leave the previously applied configuration untouched.
#[tracing::instrument(skip_all)]
pub async fn reconcile(config: &Config, ctx: Arc<Context>) -> Result<(), Error> {
    ctx.metrics.reconciliation();
    let _timer = ctx.metrics.measure();

    let client = ctx.client.clone();

    let routing_config_api = Api::<RoutingConfig>::all(client.clone());
    let mut routing_configs = routing_config_api
        .list(&ListParams::default())
        .await
        .map_err(Error::Kube)?
        .items;
    routing_configs.sort_by_key(|rc| (rc.namespace().unwrap_or_default(), rc.name_any()));

    let secret_api = Api::<Secret>::namespaced(client.clone(), &config.namespace);
    let secrets: BTreeMap<String, Secret> = secret_api
        .list(&ListParams::default())
        .await
        .map_err(Error::Kube)?
        .into_iter()
        .map(|secret| (secret.name_any(), secret))
        .collect();

    let node_api = Api::<Node>::all(client.clone());
    let node = node_api.get(&config.node_name).await.map_err(Error::Kube)?;
    let node_labels = node.labels().clone();

    let desired = desired_config(&routing_configs, &secrets, &node_labels)?;

    tracing::info!(
        node = config.node_name,
        routers = desired.routers.len(),
        "apply FRR configuration"
    );
    tracing::debug!(config = desired.dump(), "desired FRR configuration");

    ctx.frr.apply_config(&desired).await.map_err(Error::Apply)?;
    ctx.applied(desired.routers.len()).await;
    Ok(())
}

/// Filters the RoutingConfigs by node selector and merges the survivors.
/// The caller passes the configs sorted by (namespace, name) so the output
/// is deterministic.
pub fn desired_config(
    configs: &[RoutingConfig],
    secrets: &BTreeMap<String, Secret>,
    node_labels: &BTreeMap<String, String>,
) -> Result<frr::Config, conversion::ConversionError> {
    let selected: Vec<RoutingConfig> = configs
        .iter()
        .filter(|rc| selector::matches(rc.spec.node_selector.as_ref(), node_labels))
        .cloned()
        .collect();
    conversion::api_to_frr(&selected, secrets)
}
