use std::sync::Arc;

use chrono::{DateTime, Utc};
use kube::Client;
use serde::Serialize;
use tokio::sync::RwLock;

use frrsyncd_frr::handler::FrrHandler;
use frrsyncd_trace::metrics::Metrics;

/// Everything one reconcile pass needs: the API client the cluster
/// snapshot is fetched with, the handler the assembled configuration is
/// applied to, and the shared observability state.
pub struct Context {
    pub client: Client,
    /// Sink for assembled FRR configurations.
    pub frr: Arc<dyn FrrHandler>,
    /// Seconds between drift-backstop resyncs.
    pub resync_interval: u64,
    pub diagnostics: Arc<RwLock<Diagnostics>>,
    pub metrics: Metrics,
}

impl Context {
    /// Records a successful apply for the diagnostics endpoint.
    pub async fn applied(&self, routers: usize) {
        let mut diagnostics = self.diagnostics.write().await;
        diagnostics.last_applied = Some(Utc::now());
        diagnostics.routers = routers;
    }
}

/// State shared between the HTTP server and the reconciler.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub diagnostics: Arc<RwLock<Diagnostics>>,
    pub registry: prometheus::Registry,
}

impl State {
    pub fn new(component: &str) -> State {
        State {
            diagnostics: Arc::new(RwLock::new(Diagnostics::new(component.to_string()))),
            registry: prometheus::Registry::default(),
        }
    }

    /// Metrics getter
    pub fn metrics(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Diagnostics getter
    pub async fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.read().await.clone()
    }

    pub fn to_context(
        &self,
        client: Client,
        resync_interval: u64,
        frr: Arc<dyn FrrHandler>,
    ) -> Arc<Context> {
        Arc::new(Context {
            client,
            frr,
            resync_interval,
            diagnostics: self.diagnostics.clone(),
            metrics: Metrics::default().register(&self.registry).unwrap(),
        })
    }
}

/// What the agent last applied, served on the index endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub component: String,
    pub last_applied: Option<DateTime<Utc>>,
    pub routers: usize,
}

impl Diagnostics {
    pub fn new(component: String) -> Self {
        Self {
            component,
            last_applied: None,
            routers: 0,
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new("frrsync".to_string())
    }
}
