use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);
static SMS_SENT_COUNT: AtomicU64 = AtomicU64::new(0);
static SMS_FAILED_COUNT: AtomicU64 = AtomicU64::new(0);
static NOTIFICATION_ERROR_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_error_count() {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_sms_sent() {
    SMS_SENT_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_sms_failed() {
    SMS_FAILED_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// A duty event whose dispatch ended in an error (lookup or send)
pub fn increment_notification_errors() {
    NOTIFICATION_ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MetricsResponse {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub sms_sent_total: u64,
    pub sms_failed_total: u64,
    pub notification_errors_total: u64,
}

pub fn snapshot() -> MetricsResponse {
    MetricsResponse {
        http_requests_total: REQUEST_COUNT.load(Ordering::Relaxed),
        http_errors_total: ERROR_COUNT.load(Ordering::Relaxed),
        sms_sent_total: SMS_SENT_COUNT.load(Ordering::Relaxed),
        sms_failed_total: SMS_FAILED_COUNT.load(Ordering::Relaxed),
        notification_errors_total: NOTIFICATION_ERROR_COUNT.load(Ordering::Relaxed),
    }
}

pub fn render_prometheus(m: &MetricsResponse) -> String {
    format!(
        "# HELP http_requests_total Total number of HTTP requests\n\
         # TYPE http_requests_total counter\n\
         http_requests_total {}\n\
         \n\
         # HELP http_errors_total Total number of HTTP errors\n\
         # TYPE http_errors_total counter\n\
         http_errors_total {}\n\
         \n\
         # HELP sms_sent_total Duty notifications accepted by the SMS provider\n\
         # TYPE sms_sent_total counter\n\
         sms_sent_total {}\n\
         \n\
         # HELP sms_failed_total Duty notifications rejected or not delivered to the provider\n\
         # TYPE sms_failed_total counter\n\
         sms_failed_total {}\n\
         \n\
         # HELP notification_errors_total Duty events whose notification dispatch failed\n\
         # TYPE notification_errors_total counter\n\
         notification_errors_total {}\n",
        m.http_requests_total,
        m.http_errors_total,
        m.sms_sent_total,
        m.sms_failed_total,
        m.notification_errors_total
    )
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "System metrics (Prometheus text format)", body = String)
    )
)]
pub async fn get_metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render_prometheus(&snapshot()))
}
