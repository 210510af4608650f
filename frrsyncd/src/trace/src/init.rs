use std::str::FromStr;
use std::sync::Arc;

use tracing_subscriber::{filter::LevelFilter, prelude::*, Registry};

/// How the agent logs: level, plain or JSON lines on stdout, optionally
/// duplicated into a file.
#[derive(Debug)]
pub struct TraceConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl TraceConfig {
    fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.level).unwrap_or(LevelFilter::INFO)
    }

    fn json(&self) -> bool {
        self.format == "json"
    }
}

pub async fn prepare_tracing(conf: TraceConfig) {
    let file_layer = conf.file.as_ref().map(|path| {
        let file = std::fs::File::create(path).expect("failed to create the log file");
        tracing_subscriber::fmt::Layer::new()
            .with_ansi(false)
            .with_writer(Arc::new(file))
    });
    let registry = Registry::default()
        .with(conf.level_filter())
        .with(file_layer);
    let stdout = tracing_subscriber::fmt::Layer::new().with_ansi(true);
    if conf.json() {
        registry.with(stdout.json()).init();
    } else {
        registry.with(stdout).init();
    }
}
