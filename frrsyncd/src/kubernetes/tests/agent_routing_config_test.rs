use std::sync::Arc;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{
    api::{Patch, PatchParams, PostParams},
    Api, Client, CustomResourceExt, ResourceExt,
};

use frrsyncd_kubernetes::{
    agent::reconciler::routing_config::reconcile,
    config::Config,
    context::State,
    crd::routing_config::RoutingConfig,
    fixture::reconciler::test_routing_config,
};
use frrsyncd_mock::frr::MockFrrHandler;

use crate::common::{cleanup_kind, setup_kind, KIND_NODE_CP};

mod common;

#[tokio::test]
#[ignore = "use kind cluster"]
async fn integration_test_agent_routing_config() {
    tracing::info!("Creating a kind cluster");
    setup_kind();

    tracing::info!("Getting kube client");
    let client = Client::try_default().await.unwrap();

    tracing::info!("Installing the RoutingConfig CRD");
    let crd_api = Api::<CustomResourceDefinition>::all(client.clone());
    let ssapply = PatchParams::apply("ctrltest").force();
    crd_api
        .patch(
            "routingconfigs.frrsync.io",
            &ssapply,
            &Patch::Apply(&RoutingConfig::crd()),
        )
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    tracing::info!("Creating the RoutingConfig resource");
    let rc = test_routing_config("test", "default", 65042, "");
    let rc_api = Api::<RoutingConfig>::namespaced(client.clone(), "default");
    rc_api
        .create(&PostParams::default(), &rc)
        .await
        .unwrap();

    let handler = MockFrrHandler::new();
    let ctx = State::default().to_context(client.clone(), 30, Arc::new(handler.clone()));
    let config = Config {
        node_name: KIND_NODE_CP.to_string(),
        namespace: "default".to_string(),
        ..Default::default()
    };

    tracing::info!("Reconciling the resource");
    reconcile(&config, ctx.clone()).await.unwrap();

    tracing::info!("Checking the applied FRR configuration");
    let applied = handler.last_config().unwrap();
    assert_eq!(1, applied.routers.len());
    assert_eq!(65042, applied.routers[0].my_asn);

    tracing::info!("Deleting the RoutingConfig resource");
    rc_api
        .delete(&rc.name_any(), &Default::default())
        .await
        .unwrap();

    tracing::info!("Reconciling after the deletion");
    reconcile(&config, ctx.clone()).await.unwrap();
    let applied = handler.last_config().unwrap();
    assert!(applied.routers.is_empty());

    tracing::info!("Cleaning up a kind cluster");
    cleanup_kind();
}
