/// Errors that can be counted in metrics under a stable label.
pub trait TraceableError {
    fn metric_label(&self) -> String;
}
