//! Per-request access log

use axum::extract::ConnectInfo;
use http::{Request, Response};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, ServerErrorsFailureClass, SharedClassifier};
use tower_http::trace::{
    DefaultOnBodyChunk, DefaultOnEos, MakeSpan, OnFailure, OnRequest, OnResponse, TraceLayer,
};
use tracing::{debug, error, info, info_span, warn, Span};

pub type AccessLogLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    AccessLog,
    AccessLog,
    AccessLog,
    DefaultOnBodyChunk,
    DefaultOnEos,
    AccessLog,
>;

/// Opens one span per request carrying method, path and peer address, and
/// logs the outcome once the response head is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

pub fn logging_layer() -> AccessLogLayer {
    TraceLayer::new_for_http()
        .make_span_with(AccessLog)
        .on_request(AccessLog)
        .on_response(AccessLog)
        .on_failure(AccessLog)
}

/// Peer address recorded by `into_make_service_with_connect_info`, or `-`
/// when the router is driven without a listener.
pub fn remote_addr<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl<B> MakeSpan<B> for AccessLog {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            remote_addr = %remote_addr(request),
        )
    }
}

impl<B> OnRequest<B> for AccessLog {
    fn on_request(&mut self, _request: &Request<B>, _span: &Span) {
        debug!("request received");
    }
}

impl<B> OnResponse<B> for AccessLog {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        let status = response.status().as_u16();
        let latency_ms = latency.as_millis();

        if response.status().is_server_error() {
            warn!(status, latency_ms, "request served with server error");
        } else if response.status().is_client_error() {
            info!(status, latency_ms, "request rejected");
        } else {
            info!(status, latency_ms, "request served");
        }
    }
}

impl OnFailure<ServerErrorsFailureClass> for AccessLog {
    fn on_failure(&mut self, failure: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
        error!(latency_ms = latency.as_millis(), %failure, "request failed");
    }
}
