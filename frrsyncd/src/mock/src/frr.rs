use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use frrsyncd_frr::{config::Config, error::Error, handler::FrrHandler};

/// FRR handler that records the most recently applied configuration.
#[derive(Debug, Clone, Default)]
pub struct MockFrrHandler {
    inner: Arc<Mutex<MockFrrHandlerInner>>,
}

#[derive(Debug, Default)]
struct MockFrrHandlerInner {
    last_config: Option<Config>,
    applied: usize,
    must_error: bool,
}

impl MockFrrHandler {
    pub fn new() -> MockFrrHandler {
        MockFrrHandler::default()
    }

    pub fn set_must_error(&self, must_error: bool) {
        self.inner.lock().unwrap().must_error = must_error;
    }

    pub fn last_config(&self) -> Option<Config> {
        self.inner.lock().unwrap().last_config.clone()
    }

    pub fn applied(&self) -> usize {
        self.inner.lock().unwrap().applied
    }
}

#[async_trait]
impl FrrHandler for MockFrrHandler {
    async fn apply_config(&self, config: &Config) -> Result<(), Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.last_config = Some(config.clone());
        inner.applied += 1;
        if inner.must_error {
            return Err(Error::Apply("mock handler told to fail".to_string()));
        }
        Ok(())
    }
}
