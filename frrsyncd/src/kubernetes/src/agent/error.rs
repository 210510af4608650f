use thiserror::Error;

use frrsyncd_trace::error::TraceableError;

use super::conversion::ConversionError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Kube Error: {0}")]
    Kube(#[source] kube::Error),

    #[error("Conversion Error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Failed to apply FRR configuration: {0}")]
    Apply(#[source] frrsyncd_frr::error::Error),
}

impl TraceableError for Error {
    fn metric_label(&self) -> String {
        match self {
            Error::Kube(_) => "kube".to_string(),
            Error::Conversion(_) => "conversion".to_string(),
            Error::Apply(_) => "apply".to_string(),
        }
    }
}
