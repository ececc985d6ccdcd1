// src/web/types.rs
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::Responder;

use crate::error::CvMatchError;
use crate::types::EvaluationResultMap;

/// Inbound multipart submission: repeated `cvs` file parts plus repeated
/// `jobUrls` string parts. A single `jobUrls` value and a missing field
/// both coerce cleanly through the `Option<Vec<_>>`.
#[derive(FromForm)]
pub struct CvSubmissionForm<'f> {
    pub cvs: Vec<TempFile<'f>>,
    #[field(name = "jobUrls")]
    pub job_urls: Option<Vec<String>>,
}

/// Successful relay reply: the upstream result map, passed through
/// verbatim.
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RelayResponse {
    pub message: String,
    pub data: EvaluationResultMap,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    fn json(error: impl Into<String>) -> Json<ErrorBody> {
        Json(ErrorBody {
            error: error.into(),
        })
    }
}

/// Error reply with the right status attached. Upstream causes never
/// reach the caller; handlers log them and the mapping below substitutes
/// a generic message.
#[derive(Responder)]
pub enum ApiError {
    #[response(status = 400, content_type = "json")]
    Validation(Json<ErrorBody>),
    #[response(status = 404, content_type = "json")]
    NotFound(Json<ErrorBody>),
    #[response(status = 500, content_type = "json")]
    Internal(Json<ErrorBody>),
}

impl From<CvMatchError> for ApiError {
    fn from(err: CvMatchError) -> Self {
        match err {
            CvMatchError::Validation(message) => ApiError::Validation(ErrorBody::json(message)),
            CvMatchError::DoesNotExist(_) => ApiError::NotFound(ErrorBody::json("File not found")),
            CvMatchError::Upstream(_) | CvMatchError::MalformedResponse(_) => {
                ApiError::Internal(ErrorBody::json("Evaluation service unavailable"))
            }
            CvMatchError::Io(_) => {
                ApiError::Internal(ErrorBody::json("Failed to store uploaded file"))
            }
        }
    }
}
