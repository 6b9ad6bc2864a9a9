//! HTTP handler functions for the dashboard API.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use violations_dashboard_analytics::pipeline;
use violations_dashboard_dataset::{Dataset, DatasetError};
use violations_dashboard_incident_models::DateRange;
use violations_dashboard_server_models::{
    ApiDatasetChanged, ApiDatasetSummary, ApiHealth, ApiSession, RangeQueryParams,
    SetDatasetRequest, SetRangeRequest,
};

use crate::AppState;
use crate::charts;
use crate::sessions::SessionError;

fn error_json(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

fn dataset_error(e: &DatasetError) -> HttpResponse {
    if let DatasetError::NotFound { .. } = e {
        log::warn!("{e}");
        HttpResponse::NotFound().json(error_json(&e.to_string()))
    } else {
        log::error!("Dataset error: {e}");
        HttpResponse::InternalServerError().json(error_json("Dataset error"))
    }
}

fn session_error(e: &SessionError) -> HttpResponse {
    match e {
        SessionError::NotFound { .. } => {
            log::warn!("{e}");
            HttpResponse::NotFound().json(error_json(&e.to_string()))
        }
        SessionError::Dataset(inner) => dataset_error(inner),
        SessionError::Full { .. } => {
            log::warn!("{e}");
            HttpResponse::ServiceUnavailable().json(error_json(&e.to_string()))
        }
        SessionError::Poisoned => {
            log::error!("{e}");
            HttpResponse::InternalServerError().json(error_json("Session store unavailable"))
        }
    }
}

/// Resolves optional `from`/`to` parameters against a dataset.
///
/// Without either bound no date filter applies; a single bound is paired
/// with the dataset's own span for the other end.
fn resolve_range(params: &RangeQueryParams, dataset: &Dataset) -> Option<DateRange> {
    match (params.from, params.to) {
        (None, None) => None,
        (from, to) => {
            let span = dataset.span();
            Some(DateRange::new(
                from.unwrap_or(span.start),
                to.unwrap_or(span.end),
            ))
        }
    }
}

/// `GET /api/health`
///
/// Reports unhealthy if the session store is unusable.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let (healthy, active_sessions) = match state.sessions.count() {
        Ok(count) => (true, count),
        Err(e) => {
            log::error!("Health check failed: {e}");
            (false, 0)
        }
    };

    let body = ApiHealth {
        healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_sessions,
    };

    if healthy {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// `GET /api/datasets`
///
/// Lists the available datasets for the dataset picker.
pub async fn datasets(state: web::Data<AppState>) -> HttpResponse {
    let summaries: Vec<ApiDatasetSummary> = state
        .store
        .datasets()
        .map(|d| ApiDatasetSummary {
            id: d.id(),
            label: d.id().label().to_string(),
            record_count: pipeline::total_count(d.records()),
            min_date: d.span().start,
            max_date: d.span().end,
        })
        .collect();

    HttpResponse::Ok().json(summaries)
}

/// `GET /api/datasets/{id}/overview`
pub async fn overview(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match state.store.get(&path) {
        Ok(dataset) => HttpResponse::Ok().json(charts::overview_cards(pipeline::overview(dataset))),
        Err(e) => dataset_error(&e),
    }
}

/// `GET /api/datasets/{id}/trend`
pub async fn trend(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<RangeQueryParams>,
) -> HttpResponse {
    match state.store.get(&path) {
        Ok(dataset) => {
            let range = resolve_range(&params, dataset);
            let filtered = pipeline::filter_by_range(dataset, range.as_ref());
            HttpResponse::Ok().json(charts::trend_chart(pipeline::monthly_trend(
                filtered.iter().copied(),
            )))
        }
        Err(e) => dataset_error(&e),
    }
}

/// `GET /api/datasets/{id}/status`
pub async fn status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<RangeQueryParams>,
) -> HttpResponse {
    match state.store.get(&path) {
        Ok(dataset) => {
            let range = resolve_range(&params, dataset);
            let filtered = pipeline::filter_by_range(dataset, range.as_ref());
            HttpResponse::Ok().json(charts::status_chart(pipeline::status_distribution(
                filtered.iter().copied(),
            )))
        }
        Err(e) => dataset_error(&e),
    }
}

/// `GET /api/datasets/{id}/locations`
pub async fn locations(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<RangeQueryParams>,
) -> HttpResponse {
    match state.store.get(&path) {
        Ok(dataset) => {
            let range = resolve_range(&params, dataset);
            let filtered = pipeline::filter_by_range(dataset, range.as_ref());
            HttpResponse::Ok().json(charts::location_map(pipeline::geo_points(
                filtered.iter().copied(),
            )))
        }
        Err(e) => dataset_error(&e),
    }
}

/// `GET /api/datasets/{id}/age-groups`
///
/// Always computed over the whole dataset.
pub async fn age_groups(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match state.store.get(&path) {
        Ok(dataset) => HttpResponse::Ok().json(charts::age_group_chart(
            pipeline::age_group_distribution(dataset.records()),
        )),
        Err(e) => dataset_error(&e),
    }
}

/// `POST /api/sessions`
pub async fn create_session(state: web::Data<AppState>) -> HttpResponse {
    match state.sessions.create(&state.store) {
        Ok((session_id, selection)) => HttpResponse::Created().json(ApiSession {
            session_id,
            selection,
        }),
        Err(e) => session_error(&e),
    }
}

/// `GET /api/sessions/{id}`
pub async fn get_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    match state.sessions.current(*path) {
        Ok(selection) => HttpResponse::Ok().json(selection),
        Err(e) => session_error(&e),
    }
}

/// `PUT /api/sessions/{id}/dataset`
///
/// Switches the active dataset; the date range resets to its full span.
pub async fn set_session_dataset(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SetDatasetRequest>,
) -> HttpResponse {
    match state
        .sessions
        .set_active_dataset(*path, &state.store, &body.dataset)
    {
        Ok(selection) => {
            let dataset = state.store.dataset(selection.dataset);
            HttpResponse::Ok().json(ApiDatasetChanged {
                selection,
                overview: charts::overview_cards(pipeline::overview(dataset)),
            })
        }
        Err(e) => session_error(&e),
    }
}

/// `PUT /api/sessions/{id}/range`
pub async fn set_session_range(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SetRangeRequest>,
) -> HttpResponse {
    match state.sessions.set_date_range(*path, body.start, body.end) {
        Ok(selection) => HttpResponse::Ok().json(selection),
        Err(e) => session_error(&e),
    }
}

/// `GET /api/sessions/{id}/dashboard`
///
/// Computes every dashboard figure for the session's current selection.
pub async fn session_dashboard(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    match state.sessions.current(*path) {
        Ok(selection) => HttpResponse::Ok().json(charts::dashboard(&state.store, &selection)),
        Err(e) => session_error(&e),
    }
}

/// `DELETE /api/sessions/{id}`
pub async fn delete_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> HttpResponse {
    match state.sessions.remove(*path) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => session_error(&e),
    }
}
