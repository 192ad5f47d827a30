//! HTTP surface: a single `POST /predict` endpoint.
//!
//! | Outcome                         | Status | Body                                   |
//! |---------------------------------|--------|----------------------------------------|
//! | Success                         | 200    | `{"predictions": [<label>, ...]}`      |
//! | Missing required key            | 400    | `{"error": "Missing key in input data: '<key>'"}` |
//! | Any other failure               | 500    | `{"error": "<message>"}`               |

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, warn};

use crate::artifacts::Artifacts;
use crate::error::PredictError;

mod request;

pub use request::{REQUIRED_FIELDS, parse_records};

#[derive(Debug, Serialize)]
struct PredictResponse {
    predictions: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Build the service router around shared artifacts.
pub fn router(artifacts: Arc<Artifacts>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .with_state(artifacts)
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    artifacts: Arc<Artifacts>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(artifacts))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn predict(State(artifacts): State<Arc<Artifacts>>, body: Bytes) -> Response {
    let result = parse_records(&body).and_then(|records| artifacts.predict(&records));

    match result {
        Ok(predictions) => Json(PredictResponse { predictions }).into_response(),
        Err(err) => {
            if err.is_client_error() {
                warn!(error = %err, "rejected prediction request");
            } else {
                error!(error = %err, "error during prediction");
            }
            err.into_response()
        }
    }
}
