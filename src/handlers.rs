use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::movie::{validate_full, validate_partial, Movie, RepoError, ValidationError};
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ValidationError,
}

/// Every failure a route can answer with.
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    Invalid(StatusCode, ValidationError),
    Conflict(String),
    OriginNotAllowed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(Message::new(message))).into_response()
            }
            ApiError::Invalid(status, error) => (status, Json(ErrorBody { error })).into_response(),
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(Message::new(message))).into_response()
            }
            ApiError::OriginNotAllowed => {
                (StatusCode::FORBIDDEN, Json(Message::new("not allowed by CORS"))).into_response()
            }
        }
    }
}

/// Map a store error, using the route-specific not-found message.
fn repo_error(not_found: &'static str) -> impl Fn(RepoError) -> ApiError {
    move |e| match e {
        RepoError::NotFound(id) => {
            debug!("movie {} not found", id);
            ApiError::NotFound(not_found)
        }
        RepoError::AlreadyExists(id) => {
            error!("movie id collision: {}", id);
            ApiError::Conflict(format!("movie {} already exists", id))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub genre: Option<String>,
}

pub async fn hello() -> Json<Message> {
    Json(Message::new("Hello World"))
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Movie>> {
    let genre = params.genre.as_deref().filter(|g| !g.is_empty());
    Json(state.movies.list_movies(genre).await)
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Movie>, ApiError> {
    state
        .movies
        .get_movie(&id)
        .await
        .map(Json)
        .map_err(repo_error("movie not found"))
}

pub async fn create_movie(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    let fields = validate_full(&body).map_err(|e| {
        debug!("create rejected: {}", e);
        ApiError::Invalid(StatusCode::UNPROCESSABLE_ENTITY, e)
    })?;

    let movie = state
        .movies
        .create_movie(fields)
        .await
        .map_err(repo_error("movie not found"))?;

    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Movie>, ApiError> {
    let patch = validate_partial(&body).map_err(|e| {
        debug!("update of {} rejected: {}", id, e);
        ApiError::Invalid(StatusCode::BAD_REQUEST, e)
    })?;

    state
        .movies
        .update_movie(&id, patch)
        .await
        .map(Json)
        .map_err(repo_error("Movie not found"))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    state
        .movies
        .delete_movie(&id)
        .await
        .map_err(repo_error("movie not found - 404"))?;

    Ok((StatusCode::ACCEPTED, Json(Message::new("movie deleted"))))
}

pub async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "page not found - 404")
}
