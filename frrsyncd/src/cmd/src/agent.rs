use std::sync::Arc;

use clap::Parser;

use frrsyncd_frr::handler::FileHandler;
use frrsyncd_kubernetes::{agent::server, config::Config};
use frrsyncd_trace::init::TraceConfig;

pub const ENV_HOSTNAME: &str = "HOSTNAME";

#[derive(Debug, Clone, Parser)]
pub struct AgentCmd {
    #[arg(short = 'f', long, help = "Config file path for the agent")]
    pub file: Option<String>,

    #[arg(long, help = "Name of the node this agent runs on (defaults to HOSTNAME)")]
    pub node: Option<String>,

    #[arg(
        short,
        long,
        help = "Namespace the agent and its password secrets live in"
    )]
    pub namespace: Option<String>,

    #[arg(long = "http-port", help = "HTTP server port")]
    pub http_port: Option<u32>,

    #[arg(
        long = "frr-config",
        help = "Path the assembled FRR configuration is written to"
    )]
    pub frr_config: Option<String>,
}

pub fn run(cmd: AgentCmd, trace: TraceConfig) {
    let mut config = match &cmd.file {
        Some(file) => Config::load(file).expect("failed to load the agent config file"),
        None => Config::default(),
    };
    if let Some(node) = cmd.node {
        config.node_name = node;
    }
    if config.node_name.is_empty() {
        config.node_name =
            std::env::var(ENV_HOSTNAME).expect("HOSTNAME environment value is not set");
    }
    if let Some(namespace) = cmd.namespace {
        config.namespace = namespace;
    }
    if let Some(port) = cmd.http_port {
        config.http_port = port;
    }
    if let Some(path) = cmd.frr_config {
        config.frr_config_path = path;
    }

    let handler = Arc::new(FileHandler::new(&config.frr_config_path));
    server::start(config, trace, handler);
}
