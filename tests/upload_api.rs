//! End-to-end tests for the HTTP surface: multipart ingress, normalization,
//! staging, relay, and the read paths, with the evaluation service mocked.

use cv_match::{build_rocket, EnvironmentConfig};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "cvmatch-test-boundary";

struct TestApp {
    client: Client,
    mock_server: MockServer,
    upload_dir: TempDir,
}

async fn spawn_app() -> TestApp {
    let mock_server = MockServer::start().await;
    let upload_dir = TempDir::new().expect("tempdir");

    let config = EnvironmentConfig {
        eval_service_url: mock_server.uri(),
        upload_dir: upload_dir.path().to_path_buf(),
    };

    let rocket = build_rocket(&config).expect("rocket build");
    let client = Client::tracked(rocket).await.expect("local client");

    TestApp {
        client,
        mock_server,
        upload_dir,
    }
}

fn multipart(files: &[(&str, &str)], job_urls: &[&str]) -> (ContentType, Vec<u8>) {
    let mut body = String::new();

    for (filename, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"cvs\"; filename=\"{filename}\"\r\n\
             Content-Type: application/pdf\r\n\r\n\
             {content}\r\n"
        ));
    }
    for url in job_urls {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"jobUrls\"\r\n\r\n\
             {url}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    let content_type =
        ContentType::parse_flexible(&format!("multipart/form-data; boundary={BOUNDARY}"))
            .expect("content type");

    (content_type, body.into_bytes())
}

#[tokio::test]
async fn test_upload_relays_and_stages_files() {
    let app = spawn_app().await;

    let result = json!({
        "resume (1).pdf": {
            "12345": { "score": 9, "strengths": ["rust"], "weaknesses": [], "comment": "strong" }
        }
    });

    Mock::given(method("POST"))
        .and(path("/evaluate-cv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(result.clone()))
        .expect(1)
        .mount(&app.mock_server)
        .await;

    let (content_type, body) = multipart(
        &[("resume (1).pdf", "%PDF-1.4 fake")],
        &["https://example.com/job/12345"],
    );

    let response = app
        .client
        .post("/api/upload-cvs")
        .header(content_type)
        .body(body)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);

    let reply: serde_json::Value = response.into_json().await.expect("json body");
    assert_eq!(reply["data"], result);
    assert!(reply["message"].is_string());

    // parentheses and spaces survive sanitization; bytes staged under the safe name
    let staged = app.upload_dir.path().join("resume (1).pdf");
    assert_eq!(std::fs::read(&staged).unwrap(), b"%PDF-1.4 fake");

    // the outbound transmission carries bare job codes, not the full URL
    let requests = app.mock_server.received_requests().await.unwrap();
    let outbound = String::from_utf8_lossy(&requests[0].body);
    assert!(outbound.contains("name=\"job_codes\""));
    assert!(outbound.contains("[\"12345\"]"));
    assert!(outbound.contains("filename=\"resume (1).pdf\""));
}

#[tokio::test]
async fn test_upload_repairs_garbled_file_names() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/evaluate-cv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&app.mock_server)
        .await;

    // the UTF-8 bytes of a Cyrillic name, mis-decoded one byte per char
    let garbled: String = "резюме.pdf".bytes().map(char::from).collect();
    let (content_type, body) = multipart(&[(&garbled, "%PDF-1.4 fake")], &[]);

    let response = app
        .client
        .post("/api/upload-cvs")
        .header(content_type)
        .body(body)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    assert!(app.upload_dir.path().join("резюме.pdf").exists());

    let requests = app.mock_server.received_requests().await.unwrap();
    let outbound = String::from_utf8_lossy(&requests[0].body);
    assert!(outbound.contains("filename=\"резюме.pdf\""));
}

#[tokio::test]
async fn test_upload_without_files_is_rejected_before_relay() {
    let app = spawn_app().await;

    let (content_type, body) = multipart(&[], &["https://example.com/job/12345"]);

    let response = app
        .client
        .post("/api/upload-cvs")
        .header(content_type)
        .body(body)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);

    let reply: serde_json::Value = response.into_json().await.expect("json body");
    assert_eq!(reply["error"], "No files uploaded");

    // zero network calls
    assert!(app.mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_without_job_urls_still_succeeds() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/evaluate-cv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&app.mock_server)
        .await;

    let (content_type, body) = multipart(&[("resume.pdf", "%PDF-1.4 fake")], &[]);

    let response = app
        .client
        .post("/api/upload-cvs")
        .header(content_type)
        .body(body)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);

    let requests = app.mock_server.received_requests().await.unwrap();
    let outbound = String::from_utf8_lossy(&requests[0].body);
    assert!(outbound.contains("\r\n\r\n[]\r\n"));
}

#[tokio::test]
async fn test_upload_file_cap_is_enforced() {
    let app = spawn_app().await;

    let names: Vec<String> = (0..11).map(|i| format!("cv-{i}.pdf")).collect();
    let files: Vec<(&str, &str)> = names.iter().map(|n| (n.as_str(), "%PDF")).collect();
    let (content_type, body) = multipart(&files, &[]);

    let response = app
        .client
        .post("/api/upload-cvs")
        .header(content_type)
        .body(body)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    assert!(app.mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_keeps_staged_files() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/evaluate-cv"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.mock_server)
        .await;

    let (content_type, body) = multipart(
        &[("resume.pdf", "%PDF-1.4 fake")],
        &["https://example.com/job/12345"],
    );

    let response = app
        .client
        .post("/api/upload-cvs")
        .header(content_type)
        .body(body)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::InternalServerError);

    // opaque error, no upstream detail leaked
    let reply: serde_json::Value = response.into_json().await.expect("json body");
    assert_eq!(reply["error"], "Evaluation service unavailable");
    assert!(reply.get("data").is_none());

    // staging is not rolled back on relay failure
    assert!(app.upload_dir.path().join("resume.pdf").exists());
}

#[tokio::test]
async fn test_results_passes_history_through() {
    let app = spawn_app().await;

    let history = json!({
        "resume.pdf": {
            "12345": {
                "score": 7,
                "strengths": "[\"sql\"]",
                "created_at": "2025-11-03T09:15:30.123456",
                "job_details": { "title": "Backend Engineer", "skills": ["rust"] }
            }
        }
    });

    Mock::given(method("GET"))
        .and(path("/evaluations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history.clone()))
        .mount(&app.mock_server)
        .await;

    let response = app.client.get("/api/results").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let reply: serde_json::Value = response.into_json().await.expect("json body");
    // passed through verbatim, string-encoded lists included
    assert_eq!(reply["data"], history);
}

#[tokio::test]
async fn test_results_upstream_failure_is_opaque_500() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/evaluations"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&app.mock_server)
        .await;

    let response = app.client.get("/api/results").dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);
}

#[tokio::test]
async fn test_uploaded_documents_are_served_back() {
    let app = spawn_app().await;

    std::fs::write(app.upload_dir.path().join("resume.pdf"), b"%PDF-1.4 fake").unwrap();

    let response = app.client.get("/uploads/resume.pdf").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::PDF));
    assert_eq!(response.into_bytes().await.unwrap(), b"%PDF-1.4 fake");

    let response = app.client.get("/uploads/missing.pdf").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[tokio::test]
async fn test_health_probe() {
    let app = spawn_app().await;

    let response = app.client.get("/api/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}
