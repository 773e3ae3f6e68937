use hyper::{Body, Method, Request, Response, StatusCode};
use listings::{ListQuery, ListingKind, KST_LABEL};
use serde_json::json;
use tracing::{info, warn};

use crate::app::{AppState, SERVICE_NAME, VERSION};

pub const ANNOUNCEMENTS_PATH: &str = "/api/v1/announcements";

const ENDPOINTS: [&str; 6] = [
    "GET /api/v1/announcements - Announcement listing",
    "GET /health - Health check",
    "POST /control/new-listing-now - Post a new listing immediately",
    "POST /control/old-listing-now - Post an old listing immediately",
    "GET /control/status - Simulator status",
    "GET /metrics - Prometheus metrics",
];

pub async fn handle(state: AppState, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method == Method::OPTIONS {
        return web::preflight();
    }

    match (&method, path.as_str()) {
        (&Method::GET, ANNOUNCEMENTS_PATH) => list_announcements(&state, req.uri().query()),
        (&Method::GET, "/health") => health(&state),
        (&Method::POST, "/control/new-listing-now") => post_listing(&state, ListingKind::New),
        (&Method::POST, "/control/old-listing-now") => post_listing(&state, ListingKind::Old),
        (&Method::GET, "/control/status") => status(&state),
        (&Method::GET, "/metrics") => metrics(&state),
        (_, ANNOUNCEMENTS_PATH)
        | (_, "/health")
        | (_, "/control/new-listing-now")
        | (_, "/control/old-listing-now")
        | (_, "/control/status")
        | (_, "/metrics") => web::json(
            StatusCode::METHOD_NOT_ALLOWED,
            &json!({
                "error": "Method not allowed",
                "method": method.as_str(),
                "path": path,
            }),
        ),
        _ => {
            let kst_time = state.feed.lock().kst_now();
            info!(%method, %path, "unknown request");
            web::json(
                StatusCode::NOT_FOUND,
                &json!({
                    "error": "Endpoint not found",
                    "available_endpoints": ENDPOINTS,
                    "kst_time": kst_time,
                }),
            )
        }
    }
}

fn list_announcements(state: &AppState, query: Option<&str>) -> Response<Body> {
    let query = ListQuery::from_pairs(web::query_pairs(query));
    let (page, kst_time) = {
        let feed = state.feed.lock();
        (feed.list(&query), feed.kst_now())
    };
    state.metrics.record_query();
    info!(
        page = query.page,
        per_page = query.per_page,
        category = query.category.as_deref().unwrap_or(""),
        returned = page.data.notices.len(),
        %kst_time,
        "announcement request served"
    );
    web::json(StatusCode::OK, &page)
}

fn health(state: &AppState) -> Response<Body> {
    let (kst_time, count) = {
        let feed = state.feed.lock();
        (feed.kst_now(), feed.len())
    };
    web::json(
        StatusCode::OK,
        &json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "timezone": KST_LABEL,
            "kst_time": kst_time,
            "announcements_count": count,
            "version": VERSION,
        }),
    )
}

fn post_listing(state: &AppState, kind: ListingKind) -> Response<Body> {
    let listing = state.force(kind);
    let kst_time = state.feed.lock().kst_now();
    let action = match kind {
        ListingKind::New => "new-listing-posted",
        ListingKind::Old => "old-listing-posted",
    };
    web::json(
        StatusCode::OK,
        &json!({
            "success": true,
            "action": action,
            "kst_time": kst_time,
            "listing": listing,
        }),
    )
}

fn status(state: &AppState) -> Response<Body> {
    let status = state.feed.lock().status();
    web::json(
        StatusCode::OK,
        &json!({
            "server": SERVICE_NAME,
            "timezone": KST_LABEL,
            "current_time": status.current_time,
            "total_announcements": status.total_announcements,
            "next_phase": status.next_phase,
            "current_listing_id": status.current_listing_id,
        }),
    )
}

fn metrics(state: &AppState) -> Response<Body> {
    match state.metrics.handle().encode() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SimMetrics;
    use listings::{ListingFeed, NoticePage, SharedFeed, SystemClock};
    use metrics::MetricsHandle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Value;
    use std::time::Duration;

    fn state() -> AppState {
        let feed = ListingFeed::new(
            StdRng::seed_from_u64(3),
            SystemClock,
            Duration::from_secs(60),
        );
        let metrics = SimMetrics::register(MetricsHandle::new()).unwrap();
        AppState::new(SharedFeed::new(feed), metrics)
    }

    async fn call(state: &AppState, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = handle(state.clone(), req).await;
        let status = resp.status();
        let body = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        (status, body.to_vec())
    }

    async fn call_json(state: &AppState, method: Method, uri: &str) -> (StatusCode, Value) {
        let (status, body) = call(state, method, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn lists_seed_announcements_with_envelope() {
        let state = state();
        let (status, body) = call(&state, Method::GET, "/api/v1/announcements").await;
        assert_eq!(status, StatusCode::OK);
        let page: NoticePage = serde_json::from_slice(&body).unwrap();
        assert!(page.success);
        assert_eq!(page.data.total_count, 3);
        assert_eq!(page.data.total_pages, 1);
        assert!(page.data.fixed_notices.is_empty());
        let ids: Vec<u64> = page.data.notices.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![5769, 5740, 5701]);
    }

    #[tokio::test]
    async fn paginates_and_filters_from_query_string() {
        let state = state();
        call(&state, Method::POST, "/control/old-listing-now").await;
        let (_, body) = call(
            &state,
            Method::GET,
            "/api/v1/announcements?os=web&page=2&per_page=2&category=trade",
        )
        .await;
        let page: NoticePage = serde_json::from_slice(&body).unwrap();
        let ids: Vec<u64> = page.data.notices.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![5701, 10_001]);
        assert_eq!(page.data.total_pages, 2);
    }

    #[tokio::test]
    async fn invalid_paging_values_fall_back_to_defaults() {
        let state = state();
        let (status, value) = call_json(
            &state,
            Method::GET,
            "/api/v1/announcements?page=zero&per_page=0",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["total_pages"], 1);
        assert_eq!(value["data"]["notices"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn percent_encoded_query_values_are_decoded() {
        let state = state();
        let (status, value) = call_json(
            &state,
            Method::GET,
            "/api/v1/announcements?page=%32&per_page=%32&category=%74rade",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["data"]["total_pages"], 2);
        assert_eq!(value["data"]["total_count"], 3);
        let notices = value["data"]["notices"].as_array().unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0]["id"], 5701);
    }

    #[tokio::test]
    async fn manual_new_listing_is_returned_and_listed_first() {
        let state = state();
        let (status, value) = call_json(&state, Method::POST, "/control/new-listing-now").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["success"], true);
        assert_eq!(value["action"], "new-listing-posted");
        assert_eq!(value["listing"]["id"], 10_001);
        assert_eq!(value["listing"]["need_new_badge"], true);
        assert!(value["kst_time"].as_str().unwrap().ends_with("+09:00"));

        let (_, listed) = call_json(&state, Method::GET, "/api/v1/announcements").await;
        assert_eq!(listed["data"]["notices"][0]["id"], 10_001);
    }

    #[tokio::test]
    async fn status_reports_counter_and_unchanged_phase() {
        let state = state();
        call(&state, Method::POST, "/control/new-listing-now").await;
        call(&state, Method::POST, "/control/old-listing-now").await;
        let (_, value) = call_json(&state, Method::GET, "/control/status").await;
        assert_eq!(value["server"], SERVICE_NAME);
        assert_eq!(value["timezone"], "KST (UTC+9)");
        assert_eq!(value["total_announcements"], 5);
        assert_eq!(value["next_phase"], "new-listing");
        assert_eq!(value["current_listing_id"], 10_002);
    }

    #[tokio::test]
    async fn health_reports_count() {
        let state = state();
        let (status, value) = call_json(&state, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["announcements_count"], 3);
        assert_eq!(value["version"], "1.0.0");
        assert!(value["kst_time"].as_str().unwrap().ends_with("+09:00"));
    }

    #[tokio::test]
    async fn metrics_count_queries_and_manual_listings() {
        let state = state();
        call(&state, Method::GET, "/api/v1/announcements").await;
        call(&state, Method::POST, "/control/new-listing-now").await;
        let (status, body) = call(&state, Method::GET, "/metrics").await;
        let text = String::from_utf8(body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("announcement_queries_total 1"));
        assert!(text.contains("listings_generated_total{kind=\"new\",trigger=\"manual\"} 1"));
    }

    #[tokio::test]
    async fn unknown_paths_and_methods_are_rejected() {
        let state = state();
        let (status, value) = call_json(&state, Method::GET, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["error"], "Endpoint not found");

        let (status, _) = call_json(&state, Method::GET, "/control/new-listing-now").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, _) = call(&state, Method::OPTIONS, "/api/v1/announcements").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
