//! Prometheus metrics for livestream-service.
//!
//! Exposes statistics/reaction collectors and an HTTP handler for the
//! `/metrics` endpoint.

use crate::error::AppError;
use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::time::Duration;

lazy_static! {
    /// Statistics requests by kind (user, livestream) and outcome.
    pub static ref STATISTICS_REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "statistics_request_total",
        "Statistics requests segmented by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("failed to register statistics_request_total");

    /// Time spent assembling statistics, transaction included.
    pub static ref STATISTICS_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "statistics_request_duration_seconds",
        "Statistics assembly duration segmented by kind",
        &["kind"]
    )
    .expect("failed to register statistics_request_duration_seconds");

    /// Number of subjects ranked per request.
    pub static ref RANKING_SUBJECTS: HistogramVec = register_histogram_vec!(
        "ranking_subjects",
        "Number of subjects in each computed ranking",
        &["kind"],
        vec![1.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0]
    )
    .expect("failed to register ranking_subjects");

    pub static ref REACTIONS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "reactions_created_total",
        "Reactions successfully created"
    )
    .expect("failed to register reactions_created_total");
}

pub fn observe_statistics<T>(kind: &str, result: &Result<T, AppError>, elapsed: Duration) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(err) => err.kind(),
    };
    STATISTICS_REQUEST_TOTAL
        .with_label_values(&[kind, outcome])
        .inc();
    STATISTICS_REQUEST_DURATION_SECONDS
        .with_label_values(&[kind])
        .observe(elapsed.as_secs_f64());
}

pub fn observe_ranking_size(kind: &str, subjects: usize) {
    RANKING_SUBJECTS
        .with_label_values(&[kind])
        .observe(subjects as f64);
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
