// src/web/handlers.rs
//! Request handlers for the upload relay and result read paths.

use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::ContentType;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use crate::error::CvMatchError;
use crate::normalize::{self, RawUpload};
use crate::service_client::EvaluationClient;
use crate::storage::{self, FsUploadStore, UploadStore};
use crate::web::types::{ApiError, CvSubmissionForm, RelayResponse};

/// Hard cap on file parts per submission.
pub const MAX_CV_FILES: usize = 10;

pub async fn upload_cvs_handler(
    mut submission: Form<CvSubmissionForm<'_>>,
    store: &State<FsUploadStore>,
    client: &State<EvaluationClient>,
) -> Result<Json<RelayResponse>, ApiError> {
    if submission.cvs.len() > MAX_CV_FILES {
        return Err(CvMatchError::Validation(format!(
            "At most {MAX_CV_FILES} CV files per submission"
        ))
        .into());
    }

    let job_references = submission.job_urls.clone().unwrap_or_default();

    let mut raw_files = Vec::with_capacity(submission.cvs.len());
    for cv in submission.cvs.iter_mut() {
        let raw = read_upload(cv).await.map_err(|e| {
            error!("Failed to read uploaded file: {}", e);
            ApiError::from(e)
        })?;
        raw_files.push(raw);
    }

    let request = normalize::normalize(raw_files, &job_references)?;

    info!(
        "Relaying {} CV file(s) against {} job code(s)",
        request.files.len(),
        request.job_codes.len()
    );

    // Uploads are staged before the relay call and stay on disk even when
    // it fails; the /uploads links in historical results depend on that.
    storage::stage_uploads(store.inner(), &request.files)
        .await
        .map_err(|e| {
            error!("Failed to stage uploads: {}", e);
            ApiError::from(e)
        })?;

    match client.submit(request).await {
        Ok(data) => Ok(Json(RelayResponse {
            message: "Submission forwarded to evaluation service".to_string(),
            data,
        })),
        Err(e) => {
            error!("Evaluation relay failed: {}", e);
            Err(e.into())
        }
    }
}

pub async fn fetch_results_handler(
    client: &State<EvaluationClient>,
) -> Result<Json<RelayResponse>, ApiError> {
    match client.fetch_history().await {
        Ok(data) => Ok(Json(RelayResponse {
            message: "Evaluation history fetched".to_string(),
            data,
        })),
        Err(e) => {
            error!("Failed to fetch evaluation history: {}", e);
            Err(e.into())
        }
    }
}

pub async fn serve_upload_handler(
    name: &str,
    store: &State<FsUploadStore>,
) -> Result<(ContentType, Vec<u8>), ApiError> {
    let data = store.read(name).await?;

    let content_type = std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ContentType::from_extension)
        .unwrap_or(ContentType::Binary);

    Ok((content_type, data))
}

/// Pull one file part off its transport temp location. The raw,
/// unsanitized name is kept on purpose; the normalizer owns repair and
/// sanitization.
async fn read_upload(cv: &mut TempFile<'_>) -> Result<RawUpload, CvMatchError> {
    let name = cv
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string());
    let content_type = cv.content_type().map(|ct| ct.to_string());

    let staging_path = std::env::temp_dir().join(format!("cv_upload_{}", uuid::Uuid::new_v4()));
    cv.persist_to(&staging_path).await?;

    let data = tokio::fs::read(&staging_path).await?;
    let _ = tokio::fs::remove_file(&staging_path).await;

    Ok(RawUpload {
        name,
        content_type,
        data,
    })
}
