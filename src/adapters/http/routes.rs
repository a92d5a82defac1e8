use axum::{
    extract::{multipart::Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::adapters::http::state::HttpState;
use crate::application::dto::{BannerResponse, ErrorDetail, HealthResponse, PredictResponse};
use crate::domain::errors::DomainError;
use crate::domain::video::VideoUpload;

const FILE_FIELD: &str = "file";

pub async fn root() -> impl IntoResponse {
    Json(BannerResponse::default())
}

pub async fn health(State(st): State<HttpState>) -> impl IntoResponse {
    Json(HealthResponse::from(st.recognition.status()))
}

fn client_error(status: StatusCode, detail: impl Into<String>) -> Response {
    let detail = detail.into();
    warn!("⚠️ Rejected upload: {}", detail);
    (status, Json(ErrorDetail { detail })).into_response()
}

/// Lee el campo `file` del formulario. `Err` ya es la respuesta 4xx.
async fn read_upload(multipart: &mut Multipart) -> Result<VideoUpload, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(client_error(StatusCode::BAD_REQUEST, "No file uploaded")),
            Err(e) => return Err(client_error(e.status(), e.body_text())),
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| client_error(e.status(), e.body_text()))?;

        return VideoUpload::new(filename, bytes.to_vec()).map_err(|e| {
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            match e {
                DomainError::InvalidInput(reason) => client_error(status, reason),
                other => client_error(status, other.to_string()),
            }
        });
    }
}

pub async fn predict_signs(State(st): State<HttpState>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    match st.recognition.recognize(upload).await {
        Ok(result) => Json(PredictResponse::from(result)).into_response(),
        Err(e) => {
            error!("❌ Prediction failed: {}", e);
            let body = PredictResponse::failure(format!("Error processing video: {}", e));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
