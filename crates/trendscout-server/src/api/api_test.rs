use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use tokio::sync::{mpsc, Semaphore};
use tower::ServiceExt;
use trendscout_core::{RawListing, Source};
use trendscout_scraper::{ScraperError, SourceCollector};
use trendscout_trends::Pipeline;

struct FeedCollector {
    gate: Option<Semaphore>,
    entered: Option<mpsc::UnboundedSender<()>>,
    calls: AtomicUsize,
}

impl FeedCollector {
    fn open() -> Self {
        Self {
            gate: None,
            entered: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn gated() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                gate: Some(Semaphore::new(0)),
                entered: Some(tx),
                calls: AtomicUsize::new(0),
            },
            rx,
        )
    }
}

fn raw(title: &str, source: &str, rating: Option<f64>) -> RawListing {
    let slug = title.to_lowercase().replace(' ', "-");
    RawListing {
        title: Some(title.to_string()),
        price: Some("$19.99".to_string()),
        image_url: Some(format!("https://img.example.com/{slug}.jpg")),
        product_url: Some(format!("https://{source}.example.com/{slug}")),
        source: Some(Source::from(source)),
        rating,
        ..RawListing::default()
    }
}

#[async_trait]
impl SourceCollector for FeedCollector {
    fn name(&self) -> &str {
        "test-feed"
    }

    fn source(&self) -> Source {
        Source::Other("test-feed".to_string())
    }

    async fn collect(&self) -> Result<Vec<RawListing>, ScraperError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(tx) = &self.entered {
            let _ = tx.send(());
        }
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        Ok(vec![
            raw("Wireless Bluetooth Earbuds Noise Cancelling", "amazon", Some(4.6)),
            raw("Bluetooth Wireless Earbuds with Case", "ebay", None),
            raw("Sunset Projection Lamp", "tiktok", None),
        ])
    }
}

fn app_with(collector: Arc<FeedCollector>) -> (Router, Arc<SnapshotCoordinator>) {
    let coordinator = Arc::new(SnapshotCoordinator::new(Pipeline::new(vec![
        collector as Arc<dyn SourceCollector>,
    ])));
    let app = build_app(
        AppState {
            coordinator: Arc::clone(&coordinator),
        },
        default_trigger_rate_limit(),
    );
    (app, coordinator)
}

async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

#[test]
fn normalize_limit_applies_bounds() {
    assert_eq!(normalize_limit(None), None);
    assert_eq!(normalize_limit(Some(0)), Some(1));
    assert_eq!(normalize_limit(Some(-5)), Some(1));
    assert_eq!(normalize_limit(Some(10_000)), Some(500));
    assert_eq!(normalize_limit(Some(25)), Some(25));
}

#[test]
fn api_error_conflict_maps_to_409() {
    let response = ApiError::new("req-1", "conflict", "busy").into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn health_returns_ok_with_request_id() {
    let (app, _) = app_with(Arc::new(FeedCollector::open()));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-abc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-abc"
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"]["request_id"], "req-abc");
}

#[tokio::test]
async fn trending_before_first_run_is_processing() {
    let (app, _) = app_with(Arc::new(FeedCollector::open()));
    let (status, json) = send(app, Method::GET, "/api/v1/trending-products").await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["status"], "processing");
    assert_eq!(json["data"], serde_json::json!([]));
    assert!(json["message"].as_str().unwrap().contains("try again"));
}

#[tokio::test]
async fn trending_after_run_returns_ranked_snapshot() {
    let (app, coordinator) = app_with(Arc::new(FeedCollector::open()));
    coordinator.trigger_run().await;

    let (status, json) = send(app, Method::GET, "/api/v1/trending-products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["meta"]["run_id"], 1);
    assert_eq!(json["meta"]["count"], 3);
    let data = json["data"].as_array().unwrap();
    assert_eq!(data[0]["trendScore"], 2);
    assert_eq!(data[0]["source"], "amazon");
    assert_eq!(data[0]["imageUrl"], "https://img.example.com/wireless-bluetooth-earbuds-noise-cancelling.jpg");
    assert_eq!(data[2]["title"], "Sunset Projection Lamp");
    assert_eq!(data[2]["trendScore"], 1);
    assert!(data[2].get("rating").is_none());
}

#[tokio::test]
async fn trending_filters_apply() {
    let (app, coordinator) = app_with(Arc::new(FeedCollector::open()));
    coordinator.trigger_run().await;

    let (status, json) = send(
        app.clone(),
        Method::GET,
        "/api/v1/trending-products?source=ebay",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["meta"]["count"], 1);
    assert_eq!(json["data"][0]["source"], "ebay");

    let (_, json) = send(
        app.clone(),
        Method::GET,
        "/api/v1/trending-products?min_rating=4.5",
    )
    .await;
    assert_eq!(json["meta"]["count"], 1);

    let (_, json) = send(app, Method::GET, "/api/v1/trending-products?limit=2").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    match coordinator.read() {
        trendscout_trends::SnapshotView::Ready(snapshot) => assert_eq!(snapshot.len(), 3),
        trendscout_trends::SnapshotView::NotReady => panic!("snapshot should be published"),
    }
}

#[tokio::test]
async fn trigger_starts_run_then_conflicts_while_running() {
    let (collector, mut entered) = FeedCollector::gated();
    let collector = Arc::new(collector);
    let (app, coordinator) = app_with(Arc::clone(&collector));

    let (status, json) = send(app.clone(), Method::POST, "/api/v1/runs").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["data"]["started"], true);

    entered.recv().await.expect("collector entered");

    let (status, json) = send(app.clone(), Method::POST, "/api/v1/runs").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "conflict");

    let (status, json) = send(app.clone(), Method::GET, "/api/v1/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["running"], true);
    assert_eq!(json["data"]["ready"], false);

    let (status, _) = send(app, Method::GET, "/api/v1/trending-products").await;
    assert_eq!(status, StatusCode::ACCEPTED);

    if let Some(gate) = &collector.gate {
        gate.add_permits(1);
    }
    for _ in 0..200 {
        if !coordinator.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(!coordinator.is_running());
    assert_eq!(collector.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn trigger_is_rate_limited() {
    let coordinator = Arc::new(SnapshotCoordinator::new(Pipeline::new(Vec::new())));
    let app = build_app(
        AppState { coordinator },
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let (status, _) = send(app.clone(), Method::POST, "/api/v1/runs").await;
    assert_ne!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, json) = send(app, Method::POST, "/api/v1/runs").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");
}
