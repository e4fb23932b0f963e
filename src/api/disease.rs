//! Image disease detection endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
};

use super::{ApiResult, ApiState, bad_request, error_response};
use crate::disease::{CropDiseaseInfo, DiseaseDetection, crop_disease_info};

const DEFAULT_MIME: &str = "image/jpeg";

/// Largest accepted upload
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accept a multipart upload with an `image` field and diagnose it
async fn detect_disease(
    State(state): State<Arc<ApiState>>,
    mut multipart: Multipart,
) -> ApiResult<DiseaseDetection> {
    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let mime = field.content_type().unwrap_or(DEFAULT_MIME).to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Invalid image upload: {e}")))?;
        image = Some((bytes.to_vec(), mime));
        break;
    }

    let Some((bytes, mime)) = image.filter(|(bytes, _)| !bytes.is_empty()) else {
        return Err(bad_request("No image provided"));
    };

    tracing::info!(size = bytes.len(), mime = %mime, "disease detection requested");
    Ok(Json(state.disease.detect(&bytes, &mime).await))
}

async fn crop_info(Path(crop): Path<String>) -> ApiResult<&'static CropDiseaseInfo> {
    crop_disease_info(&crop)
        .map(Json)
        .ok_or_else(|| {
            error_response(
                StatusCode::NOT_FOUND,
                format!("No disease information for {crop}"),
            )
        })
}

/// Build the upload router, mounted at the root
pub fn detect_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/detect-disease", post(detect_disease))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Build the disease reference router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/crops/{crop}", get(crop_info))
        .with_state(state)
}
