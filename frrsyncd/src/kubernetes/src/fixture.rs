pub mod reconciler {
    use std::{collections::BTreeMap, sync::Arc};

    use http::{Request, Response};
    use hyper::Body;
    use k8s_openapi::{
        api::core::v1::{Node, Secret},
        ByteString,
    };
    use kube::{core::ObjectMeta, Client};
    use prometheus::Registry;
    use serde::Serialize;

    use frrsyncd_frr::handler::FrrHandler;
    use frrsyncd_trace::metrics::Metrics;

    use crate::{
        context::Context,
        crd::routing_config::{
            BGPConfig, NodeSelector, Router, RoutingConfig, RoutingConfigSpec,
        },
    };

    pub type ApiServerHandle = tower_test::mock::Handle<Request<Body>, Response<Body>>;
    pub struct ApiServerVerifier(pub ApiServerHandle);

    pub async fn timeout_after_1s(handle: tokio::task::JoinHandle<()>) {
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("timeout on mock apiserver")
            .expect("scenario succeeded")
    }

    impl Context {
        pub fn test(frr: Arc<dyn FrrHandler>) -> (Arc<Self>, ApiServerVerifier, Registry) {
            let (mock_service, handle) = tower_test::mock::pair::<Request<Body>, Response<Body>>();
            let mock_client = Client::new(mock_service, "default");
            let registry = Registry::default();
            let ctx = Context {
                client: mock_client,
                frr,
                resync_interval: 30,
                diagnostics: Arc::default(),
                metrics: Metrics::default().register(&registry).unwrap(),
            };
            (Arc::new(ctx), ApiServerVerifier(handle), registry)
        }
    }

    pub fn api_server_response_resource<T: Serialize>(res: &T) -> Vec<u8> {
        serde_json::to_vec(res).unwrap()
    }

    pub fn api_server_response_list<T: Serialize>(items: &[T]) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "metadata": {},
            "items": items,
        }))
        .unwrap()
    }

    pub fn test_routing_config(name: &str, namespace: &str, asn: u32, vrf: &str) -> RoutingConfig {
        let mut rc = RoutingConfig::new(
            name,
            RoutingConfigSpec {
                bgp: BGPConfig {
                    routers: vec![Router {
                        asn,
                        vrf: (!vrf.is_empty()).then(|| vrf.to_string()),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        rc.metadata.namespace = Some(namespace.to_string());
        rc
    }

    pub fn test_routing_config_with_selector(
        name: &str,
        namespace: &str,
        asn: u32,
        vrf: &str,
        match_labels: &[(&str, &str)],
    ) -> RoutingConfig {
        let mut rc = test_routing_config(name, namespace, asn, vrf);
        rc.spec.node_selector = Some(NodeSelector {
            match_labels: Some(
                match_labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            match_expressions: None,
        });
        rc
    }

    pub fn test_node(name: &str, labels: &[(&str, &str)]) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(
                    labels
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn test_secret(name: &str, namespace: &str, password: &str) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            type_: Some("kubernetes.io/basic-auth".to_string()),
            data: Some(BTreeMap::from([(
                "password".to_string(),
                ByteString(password.as_bytes().to_vec()),
            )])),
            ..Default::default()
        }
    }
}
