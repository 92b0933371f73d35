//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::domain::{Coordinates, NewStation, Station, StationId};
use crate::geocoding::{LOCAL_ENDPOINT_PATH, Transport};
use crate::stations::{StationError, StationStore};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// `static_dir`, when given, serves the dashboard's assets for every
/// unmatched path.
pub fn create_router<T: Transport>(state: AppState<T>, static_dir: Option<&str>) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route(LOCAL_ENDPOINT_PATH, get(reverse_geocode::<T>))
        .route("/api/search-location", get(search_location::<T>))
        .route(
            "/stations.json",
            get(list_stations::<T>).put(replace_stations::<T>),
        )
        .route(
            "/api/stations",
            get(station_views::<T>).post(create_station::<T>),
        )
        .route("/api/stations/:id", delete(delete_station::<T>))
        .route("/api/stations/:id/resolve", post(resolve_station::<T>))
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Reverse geocode a point through the cached upstream lookup.
///
/// This is the server side of the `local` provider.
async fn reverse_geocode<T: Transport>(
    State(state): State<AppState<T>>,
    Query(query): Query<ReverseGeocodeQuery>,
) -> Result<Json<ReverseGeocodeResponse>, AppError> {
    let coords = query.coordinates().ok_or_else(|| AppError::BadRequest {
        message: "lat and lng query params are required".to_string(),
    })?;

    let address = state
        .lookup
        .reverse(coords)
        .await
        .map_err(|e| AppError::BadGateway {
            message: "Reverse geocoding failed".to_string(),
            details: e.to_string(),
        })?;

    Ok(Json(ReverseGeocodeResponse { address }))
}

/// Find coordinates for a free-text place name.
async fn search_location<T: Transport>(
    State(state): State<AppState<T>>,
    Query(query): Query<SearchLocationQuery>,
) -> Result<Json<Coordinates>, AppError> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(AppError::BadRequest {
            message: "q query param is required".to_string(),
        });
    }

    state
        .search
        .search(&*state.transport, q)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            message: format!("No location found for {q:?}"),
        })
}

async fn list_stations<T: Transport>(State(state): State<AppState<T>>) -> Json<Vec<Station>> {
    Json(state.stations.list())
}

/// Stations with their occupancy figures.
async fn station_views<T: Transport>(State(state): State<AppState<T>>) -> Json<Vec<StationView>> {
    Json(
        state
            .stations
            .list()
            .into_iter()
            .map(StationView::from_station)
            .collect(),
    )
}

/// Replace every station with the uploaded list.
///
/// Stations that still need an address are queued for resolution.
async fn replace_stations<T: Transport>(
    State(state): State<AppState<T>>,
    Json(payload): Json<Value>,
) -> Result<Json<Vec<Station>>, AppError> {
    if !payload.is_array() {
        return Err(AppError::BadRequest {
            message: "Stations must be an array.".to_string(),
        });
    }

    let stations = Vec::<Station>::deserialize(&payload).map_err(|e| AppError::BadRequest {
        message: format!("Invalid station: {e}"),
    })?;

    state.stations.replace_all(stations)?;
    let stations = state.stations.list();
    info!(count = stations.len(), "stations replaced");

    for station in &stations {
        state.pipeline.request_resolution(station, false);
    }

    Ok(Json(stations))
}

/// Add a station and resolve its address, even if one was supplied.
async fn create_station<T: Transport>(
    State(state): State<AppState<T>>,
    Json(new): Json<NewStation>,
) -> Result<(StatusCode, Json<Station>), AppError> {
    let station = state.stations.create(new)?;
    info!(station = %station.id, "station created");

    state.pipeline.request_resolution(&station, true);

    let current = state.stations.get(station.id).unwrap_or(station);
    Ok((StatusCode::CREATED, Json(current)))
}

async fn delete_station<T: Transport>(
    State(state): State<AppState<T>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    let removed = state.stations.delete(StationId(id))?;
    info!(station = %removed.id, "station deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Queue a resolution for an existing station.
async fn resolve_station<T: Transport>(
    State(state): State<AppState<T>>,
    Path(id): Path<u64>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, AppError> {
    let id = StationId(id);
    let station = state.stations.get(id).ok_or(StationError::NotFound(id))?;
    let queued = state.pipeline.request_resolution(&station, query.force);
    Ok(Json(ResolveResponse { queued }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    BadGateway { message: String, details: String },
    Internal { message: String },
}

impl From<StationError> for AppError {
    fn from(e: StationError) -> Self {
        match e {
            StationError::NotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, None),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message, None),
            AppError::BadGateway { message, details } => {
                (StatusCode::BAD_GATEWAY, message, Some(details))
            }
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message, None),
        };

        if status.is_server_error() {
            warn!(%status, %error, details = details.as_deref().unwrap_or(""), "request failed");
        }

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}
