use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trendscout_core::{Listing, Source};
use trendscout_trends::SnapshotView;

use crate::middleware::RequestId;

use super::{normalize_limit, AppState};

pub(super) const PROCESSING_MESSAGE: &str =
    "Trending data is being generated. Please try again in a moment.";

#[derive(Debug, Serialize)]
struct ProcessingResponse {
    status: &'static str,
    message: &'static str,
    data: [Listing; 0],
    meta: ProcessingMeta,
}

#[derive(Debug, Serialize)]
struct ProcessingMeta {
    request_id: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct TrendingResponse {
    status: &'static str,
    data: Vec<Listing>,
    meta: TrendingMeta,
}

#[derive(Debug, Serialize)]
struct TrendingMeta {
    request_id: String,
    timestamp: DateTime<Utc>,
    published_at: DateTime<Utc>,
    run_id: u64,
    count: usize,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct TrendingQuery {
    pub source: Option<String>,
    pub min_rating: Option<f64>,
    pub limit: Option<i64>,
}

pub(super) async fn list_trending(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendingQuery>,
) -> Response {
    let snapshot = match state.coordinator.read() {
        SnapshotView::Ready(snapshot) => snapshot,
        SnapshotView::NotReady => {
            return (
                StatusCode::ACCEPTED,
                Json(ProcessingResponse {
                    status: "processing",
                    message: PROCESSING_MESSAGE,
                    data: [],
                    meta: ProcessingMeta {
                        request_id: req_id.0,
                        timestamp: Utc::now(),
                    },
                }),
            )
                .into_response();
        }
    };

    let data = filter_listings(&snapshot.listings, &query);

    (
        StatusCode::OK,
        Json(TrendingResponse {
            status: "ok",
            meta: TrendingMeta {
                request_id: req_id.0,
                timestamp: Utc::now(),
                published_at: snapshot.published_at,
                run_id: snapshot.run_id,
                count: data.len(),
            },
            data,
        }),
    )
        .into_response()
}

/// Apply query filters to a copy of the snapshot, keeping rank order.
fn filter_listings(listings: &[Listing], query: &TrendingQuery) -> Vec<Listing> {
    let source = query.source.as_deref().map(Source::from);
    let limit = normalize_limit(query.limit).unwrap_or(usize::MAX);

    listings
        .iter()
        .filter(|l| source.as_ref().is_none_or(|s| &l.source == s))
        .filter(|l| {
            query
                .min_rating
                .is_none_or(|min| l.rating.is_some_and(|r| r >= min))
        })
        .take(limit)
        .cloned()
        .collect()
}
