//! Prometheus metrics owned by the application state.
//!
//! The registry is created once at startup and injected; nothing registers
//! into the process-wide default registry.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const AUTH_ATTEMPTS_TOTAL: &str = "auth_attempts_total";

pub struct Metrics {
    registry: Registry,
    http_requests: IntCounterVec,
    http_duration: HistogramVec,
    auth_attempts: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests = IntCounterVec::new(
            Opts::new(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests"),
            &["method", "endpoint", "status"],
        )?;
        let http_duration = HistogramVec::new(
            HistogramOpts::new(
                HTTP_REQUEST_DURATION_SECONDS,
                "Duration of HTTP requests in seconds",
            ),
            &["method", "endpoint"],
        )?;
        let auth_attempts = IntCounterVec::new(
            Opts::new(AUTH_ATTEMPTS_TOTAL, "Total number of authentication attempts"),
            &["success"],
        )?;

        registry.register(Box::new(http_requests.clone()))?;
        registry.register(Box::new(http_duration.clone()))?;
        registry.register(Box::new(auth_attempts.clone()))?;

        Ok(Self {
            registry,
            http_requests,
            http_duration,
            auth_attempts,
        })
    }

    /// Record one handled request. `endpoint` is the matched route template,
    /// not the raw path.
    pub fn record_request(&self, method: &str, endpoint: &str, status: u16, seconds: f64) {
        let status = status.to_string();
        self.http_requests
            .with_label_values(&[method, endpoint, status.as_str()])
            .inc();
        self.http_duration
            .with_label_values(&[method, endpoint])
            .observe(seconds);
    }

    /// Record the outcome of a login attempt.
    pub fn record_auth_attempt(&self, success: bool) {
        self.auth_attempts
            .with_label_values(&[success_label(success)])
            .inc();
    }

    /// Current value of `auth_attempts_total{success=...}`.
    pub fn auth_attempts(&self, success: bool) -> u64 {
        self.auth_attempts
            .with_label_values(&[success_label(success)])
            .get()
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }

    /// `Content-Type` of [`render`](Self::render) output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

fn success_label(success: bool) -> &'static str {
    if success {
        "true"
    } else {
        "false"
    }
}
