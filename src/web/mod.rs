// src/web/mod.rs
//! HTTP surface: one upload relay endpoint, one history read endpoint,
//! static retrieval of staged uploads, and CORS plumbing for the browser
//! client on its own origin.

pub mod handlers;
pub mod types;

pub use types::*;

use crate::environment::EnvironmentConfig;
use crate::service_client::EvaluationClient;
use crate::storage::FsUploadStore;
use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{ContentType, Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[post("/upload-cvs", data = "<submission>")]
pub async fn upload_cvs(
    submission: Form<CvSubmissionForm<'_>>,
    store: &State<FsUploadStore>,
    client: &State<EvaluationClient>,
) -> Result<Json<RelayResponse>, ApiError> {
    handlers::upload_cvs_handler(submission, store, client).await
}

#[get("/results")]
pub async fn fetch_results(
    client: &State<EvaluationClient>,
) -> Result<Json<RelayResponse>, ApiError> {
    handlers::fetch_results_handler(client).await
}

#[get("/health")]
pub async fn health() -> Json<&'static str> {
    Json("OK")
}

#[get("/<name>")]
pub async fn serve_upload(
    name: &str,
    store: &State<FsUploadStore>,
) -> Result<(ContentType, Vec<u8>), ApiError> {
    handlers::serve_upload_handler(name, store).await
}

// Handle OPTIONS requests for CORS preflight
#[options("/<_..>")]
pub async fn preflight() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Invalid request format".to_string(),
    })
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Internal server error".to_string(),
    })
}

/// Assemble the Rocket instance. Split from [`start_web_server`] so tests
/// can drive it with a local client.
pub fn build_rocket(config: &EnvironmentConfig) -> Result<Rocket<Build>> {
    let store = FsUploadStore::new(config.upload_dir.clone());
    let client = EvaluationClient::new(config.eval_service_url.clone())?;

    // 10 MiB per file, sized for the 10-file cap plus form overhead.
    let figment = rocket::Config::figment().merge((
        "limits",
        Limits::default()
            .limit("file", 10.mebibytes())
            .limit("data-form", 120.mebibytes()),
    ));

    Ok(rocket::custom(figment)
        .attach(Cors)
        .manage(store)
        .manage(client)
        .register("/api", catchers![bad_request, internal_error])
        .mount("/api", routes![upload_cvs, fetch_results, health, preflight])
        .mount("/uploads", routes![serve_upload]))
}

// Main server start function
pub async fn start_web_server(config: EnvironmentConfig) -> Result<()> {
    info!("Starting CV match relay API server");
    info!("Relaying submissions to: {}", config.eval_service_url);

    build_rocket(&config)?.launch().await?;

    Ok(())
}
