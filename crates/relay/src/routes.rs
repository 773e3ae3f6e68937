use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use crate::config::ANNOUNCEMENTS_PATH;
use crate::upstream::{Forwarded, Relay};

const ENDPOINTS: [&str; 6] = [
    "GET /api/v1/announcements - Main relay endpoint",
    "GET /health - Health check",
    "GET / - Service information",
    "GET /relay/status - Relay server status",
    "GET /relay/test - Test upstream connectivity",
    "GET /metrics - Prometheus metrics",
];

const KNOWN_PATHS: [&str; 6] = [
    ANNOUNCEMENTS_PATH,
    "/health",
    "/",
    "/relay/status",
    "/relay/test",
    "/metrics",
];

fn utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub async fn handle(relay: Arc<Relay>, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    if method == Method::OPTIONS {
        return web::preflight();
    }

    match (&method, path.as_str()) {
        (&Method::GET, ANNOUNCEMENTS_PATH) => relay_announcements(&relay, query.as_deref()).await,
        (&Method::GET, "/health") => health(&relay),
        (&Method::GET, "/") => info_document(&relay),
        (&Method::GET, "/relay/status") => relay_status(&relay),
        (&Method::GET, "/relay/test") => relay_test(&relay).await,
        (&Method::GET, "/metrics") => metrics(&relay),
        (_, p) if KNOWN_PATHS.contains(&p) => web::json(
            StatusCode::METHOD_NOT_ALLOWED,
            &json!({
                "error": "Method not allowed",
                "method": method.as_str(),
                "path": path,
                "relay_time": utc_now(),
            }),
        ),
        _ => {
            info!(%method, %path, "unknown request");
            web::json(
                StatusCode::NOT_FOUND,
                &json!({
                    "error": "Endpoint not found",
                    "available_endpoints": ENDPOINTS,
                    "relay_time": utc_now(),
                }),
            )
        }
    }
}

async fn relay_announcements(relay: &Relay, query: Option<&str>) -> Response<Body> {
    match relay.forward(query).await {
        Ok(forwarded) => relayed_response(relay, forwarded),
        Err(err) => web::json(status(err.status_code()), &err.to_body(&utc_now())),
    }
}

fn relayed_response(relay: &Relay, forwarded: Forwarded) -> Response<Body> {
    let config = relay.config();
    let content_type = forwarded
        .content_type
        .as_deref()
        .unwrap_or("application/json; charset=utf-8")
        .to_string();
    let duration_ms = forwarded.duration.as_millis();
    let mut resp = web::bytes_response(status(forwarded.status), &content_type, forwarded.body);

    if config.debug_headers {
        let headers = [
            ("x-relay-server", config.relay_id.clone()),
            ("x-relay-timestamp", utc_now()),
            ("x-relay-duration", format!("{duration_ms}ms")),
            ("x-relay-target", config.target_url.clone()),
        ];
        for (name, value) in headers {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    resp.headers_mut()
                        .insert(HeaderName::from_static(name), value);
                }
                Err(err) => warn!(header = name, error = ?err, "skipping relay header"),
            }
        }
    }
    resp
}

fn health(relay: &Relay) -> Response<Body> {
    let config = relay.config();
    web::json(
        StatusCode::OK,
        &json!({
            "status": "healthy",
            "service": config.service,
            "timezone": "UTC",
            "utc_time": utc_now(),
            "uptime_secs": relay.uptime().as_secs_f64(),
            "target": config.target_url,
            "version": config.version,
        }),
    )
}

fn info_document(relay: &Relay) -> Response<Body> {
    let config = relay.config();
    web::json(
        StatusCode::OK,
        &json!({
            "service": config.service,
            "version": config.version,
            "environment": config.environment,
            "endpoints": {
                "announcements": "/api/v1/announcements?os=web&page=1&per_page=1&category=trade",
                "health": "/health",
                "status": "/relay/status",
                "test": "/relay/test",
            },
            "target": config.target_url,
        }),
    )
}

fn relay_status(relay: &Relay) -> Response<Body> {
    let config = relay.config();
    web::json(
        StatusCode::OK,
        &json!({
            "service": config.service,
            "status": "running",
            "timezone": "UTC",
            "utc_time": utc_now(),
            "target": {
                "url": config.target_url,
                "probe": config.probe_url,
            },
            "relay_info": {
                "purpose": "Simulate UTC cloud servers relaying KST announcement data",
                "timeout_ms": config.timeout.as_millis() as u64,
                "debug_headers": config.debug_headers,
            },
        }),
    )
}

async fn relay_test(relay: &Relay) -> Response<Body> {
    info!(probe = %relay.config().probe_url, "testing upstream connectivity");
    match relay.probe().await {
        Ok(probe) => {
            let duration_ms = probe.duration.as_millis();
            info!(duration_ms = duration_ms as u64, "upstream healthy");
            web::json(
                StatusCode::OK,
                &json!({
                    "test_result": "success",
                    "target_status": "healthy",
                    "response_time": format!("{duration_ms}ms"),
                    "target_data": probe.data,
                    "relay_time": utc_now(),
                }),
            )
        }
        Err(err) => {
            warn!(error = %err, "upstream connectivity test failed");
            web::json(
                StatusCode::SERVICE_UNAVAILABLE,
                &json!({
                    "test_result": "failed",
                    "target_status": "unreachable",
                    "error": err.to_string(),
                    "relay_time": utc_now(),
                }),
            )
        }
    }
}

fn metrics(relay: &Relay) -> Response<Body> {
    match relay.metrics().encode() {
        Ok((content_type, body)) => web::bytes_response(StatusCode::OK, &content_type, body),
        Err(err) => {
            warn!(error = ?err, "failed to encode metrics");
            web::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "error": "metrics unavailable" }),
            )
        }
    }
}
