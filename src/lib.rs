//! Relay backend for CV-to-job matching.
//!
//! Accepts multipart CV submissions, normalizes job references and file
//! names, stages the documents locally, forwards everything to the
//! external evaluation service and serves the aggregated score history.

pub mod environment;
pub mod error;
pub mod normalize;
pub mod service_client;
pub mod storage;
pub mod types;
pub mod web;

pub use environment::EnvironmentConfig;
pub use error::CvMatchError;
pub use normalize::{normalize, CanonicalRequest, NormalizedFile, RawUpload};
pub use service_client::EvaluationClient;
pub use web::{build_rocket, start_web_server};
