use crate::twoface::Fallible;
use prometheus::Encoder;
use std::future::Future;
use std::time::Instant;

lazy_static! {

    pub static ref OPERATION_SECS: prometheus::HistogramVec = register_histogram_vec!(
        "microblog_operation_secs",
        "Seconds taken for each model operation, partitioned by operation name",
        &["operation"],
        vec![0.001, 0.01, 0.1, 0.5, 1.0] // Prometheus buckets
    )
    .expect("couldn't make OPERATION_SECS");

    pub static ref OPERATIONS: prometheus::IntCounterVec = register_int_counter_vec!(
        "microblog_operations",
        "How many results of Ok/Err per model operation",
        &["operation", "result"]
    )
    .expect("couldn't make OPERATIONS");
}

/// Execute the closure, then record its operational metrics, e.g. time taken, whether it returned Ok/Err, etc.
pub async fn observe<F, Fut, R>(name: &'static str, f: F) -> Fallible<R>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Fallible<R>>,
{
    let start = Instant::now();
    let return_val = f().await;
    let duration = start.elapsed();
    OPERATION_SECS
        .with_label_values(&[name])
        .observe(duration.as_secs_f64());
    OPERATIONS
        .with_label_values(&[name, variant_name(&return_val)])
        .inc();
    return_val
}

fn variant_name<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "err"
    }
}

/// Every registered metric in the Prometheus text exposition format.
pub fn render() -> anyhow::Result<String> {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = vec![];
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
