use std::sync::Arc;

use actix_web::{
    get, middleware, web::Data, App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use prometheus::{Encoder, TextEncoder};

use frrsyncd_frr::handler::FrrHandler;
use frrsyncd_trace::init::{prepare_tracing, TraceConfig};

use crate::config::Config;
use crate::context::State;

use super::reconciler;

pub fn start(config: Config, trace: TraceConfig, handler: Arc<dyn FrrHandler>) {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(run(config, trace, handler));
}

#[tracing::instrument(skip_all)]
async fn run(config: Config, trace_config: TraceConfig, handler: Arc<dyn FrrHandler>) {
    prepare_tracing(trace_config).await;

    // Initialize Kubernetes controller state
    let state = State::new("frrsync-agent");

    let server_state = state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(Data::new(server_state.clone()))
            .service(index)
            .service(health)
            .service(ready)
            .service(metrics_)
            .wrap(
                middleware::Logger::default()
                    .exclude("/healthz")
                    .exclude("/readyz"),
            )
    })
    .bind(format!("0.0.0.0:{}", config.http_port))
    .unwrap()
    .shutdown_timeout(5);

    tracing::info!(
        http_port = config.http_port,
        node = config.node_name,
        "Agent server is running."
    );

    tracing::info!("Start Agent Reconciler");

    let reconciler_state = state.clone();
    tokio::spawn(async move {
        reconciler::routing_config::run(reconciler_state, config, handler).await;
    });

    server.run().await.unwrap()
}

#[get("/healthz")]
async fn health(_: HttpRequest) -> impl Responder {
    HttpResponse::Ok().json("healthy")
}

#[get("/readyz")]
async fn ready(_: HttpRequest) -> impl Responder {
    HttpResponse::Ok().json("ready")
}

#[get("/metrics")]
async fn metrics_(c: Data<State>, _req: HttpRequest) -> impl Responder {
    let metrics = c.metrics();
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    encoder.encode(&metrics, &mut buffer).unwrap();
    HttpResponse::Ok().body(buffer)
}

#[get("/")]
async fn index(c: Data<State>, _req: HttpRequest) -> impl Responder {
    let d = c.diagnostics().await;
    HttpResponse::Ok().json(&d)
}
