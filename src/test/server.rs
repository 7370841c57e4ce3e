use super::{mock_pin, pinata_client, pinned, ORIGIN, PIN_FILE_PATH, PIN_JSON_PATH};
use crate::config::{ServerConfig, DEFAULT_PORT};
use crate::pinata::PinataClient;
use crate::render::CANVAS_SIZE;
use crate::server::rocket;

use image::GenericImageView;

use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rocket::serde::json::Value;

use std::fs;
use std::path::Path;

use tempfile::{tempdir, TempDir};

use wiremock::{MockServer, ResponseTemplate};

const INDEX_PAGE: &str = "<html><body>tickets</body></html>";
const APP_SCRIPT: &str = "console.log('tickets');";

fn server_config(static_dir: &Path) -> ServerConfig {
    ServerConfig {
        port: DEFAULT_PORT,
        static_dir: static_dir.to_path_buf(),
        origin: ORIGIN.to_string(),
    }
}

/// Directory holding a minimal built front-end
fn front_end() -> TempDir {
    let dir = tempdir().expect("temporary folder");
    fs::write(dir.path().join("index.html"), INDEX_PAGE).unwrap();
    fs::write(dir.path().join("app.js"), APP_SCRIPT).unwrap();
    dir
}

async fn client(static_dir: &Path, pinata: Option<PinataClient>) -> Client {
    Client::tracked(rocket(&server_config(static_dir), pinata))
        .await
        .expect("valid rocket instance")
}

#[tokio::test]
async fn ticket_image_is_served_as_png() {
    let client = client(Path::new("missing-front-end"), None).await;
    let response = client.get("/api/tickets/1/image").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::PNG));
    assert!(response.headers().get_one("ETag").is_some());

    let body = response.into_bytes().await.unwrap();
    let image = image::load_from_memory(&body).unwrap();
    assert_eq!(image.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
}

#[tokio::test]
async fn ticket_image_is_served_as_data_url() {
    let client = client(Path::new("missing-front-end"), None).await;
    let response = client
        .get("/api/tickets/1/image?format=data")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::Plain));
    let body = response.into_string().await.unwrap();
    assert!(body.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn same_ticket_keeps_its_etag() {
    let client = client(Path::new("missing-front-end"), None).await;
    let first = client.get("/api/tickets/7/image").dispatch().await;
    let first = first.headers().get_one("ETag").map(str::to_string);
    let second = client.get("/api/tickets/7/image").dispatch().await;
    let second = second.headers().get_one("ETag").map(str::to_string);
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[tokio::test]
async fn invalid_ticket_id_or_format_is_a_bad_request() {
    let client = client(Path::new("missing-front-end"), None).await;
    let response = client.get("/api/tickets/bad.id/image").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
    let body = response.into_json::<Value>().await.unwrap();
    assert_eq!(body["code"], "invalid_ticket_id");

    let response = client
        .get("/api/tickets/1/image?format=svg")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body = response.into_json::<Value>().await.unwrap();
    assert_eq!(body["code"], "invalid_format");
}

#[tokio::test]
async fn issuing_needs_a_pinning_credential() {
    let client = client(Path::new("missing-front-end"), None).await;
    let response = client.post("/api/tickets/1").dispatch().await;
    assert_eq!(response.status(), Status::ServiceUnavailable);
}

#[tokio::test]
async fn issuing_returns_both_content_identifiers() {
    let pinata = MockServer::start().await;
    mock_pin(&pinata, PIN_FILE_PATH, pinned("bafyimage"), 1).await;
    mock_pin(&pinata, PIN_JSON_PATH, pinned("bafymeta"), 1).await;

    let client = client(Path::new("missing-front-end"), Some(pinata_client(&pinata))).await;
    let response = client.post("/api/tickets/1").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body = response.into_json::<Value>().await.unwrap();
    assert_eq!(body["ticketId"], "1");
    assert_eq!(body["imageCid"], "bafyimage");
    assert_eq!(body["metadataCid"], "bafymeta");
}

#[tokio::test]
async fn rejected_credential_is_reported_as_authentication_failure() {
    let pinata = MockServer::start().await;
    mock_pin(&pinata, PIN_FILE_PATH, ResponseTemplate::new(401), 1).await;
    mock_pin(&pinata, PIN_JSON_PATH, pinned("bafymeta"), 0).await;

    let client = client(Path::new("missing-front-end"), Some(pinata_client(&pinata))).await;
    let response = client.post("/api/tickets/1").dispatch().await;
    assert_eq!(response.status(), Status::BadGateway);
    let body = response.into_json::<Value>().await.unwrap();
    assert_eq!(body["code"], "authentication");
}

#[tokio::test]
async fn front_end_files_are_served() {
    let dir = front_end();
    let client = client(dir.path(), None).await;

    let response = client.get("/app.js").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().await.unwrap(), APP_SCRIPT);

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().await.unwrap(), INDEX_PAGE);
}

#[tokio::test]
async fn ticket_deep_links_fall_back_to_the_index_page() {
    let dir = front_end();
    let client = client(dir.path(), None).await;
    let response = client.get("/ticket_info/1").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().await.unwrap(), INDEX_PAGE);
}

#[tokio::test]
async fn unknown_api_routes_are_not_found() {
    let dir = front_end();
    let client = client(dir.path(), None).await;
    let response = client.get("/api/unknown").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}
