//! Development server.
//!
//! Serves the built front-end, answers unknown page routes (such as the
//! `/ticket_info/<id>` deep links) with `index.html`, and exposes the ticket
//! pipeline under `/api`.

use super::config::ServerConfig;
use super::issue::{IssueError, IssuedTicket, TicketIssuer};
use super::pinata::{FailureKind, PinataClient};
use super::render::{RenderMode, TicketRenderer};
use super::ticket::{TicketId, TicketIdError};

use rocket::fs::{FileServer, NamedFile};
use rocket::http::{ContentType, Header, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::{get, post, routes, Build, Config, Responder, Rocket, State};

use sha2::{Digest, Sha256};

use std::path::PathBuf;

use tracing::{error, info, warn};

/// Address the development server listens on
const LISTEN_ADDRESS: &str = "0.0.0.0";
/// Page served for every route the front-end handles itself
const INDEX_FILE: &str = "index.html";
/// First path segment of the api routes
const API_SEGMENT: &str = "api";

/// Directory the front-end is served from
pub struct StaticDir(pub PathBuf);

/// Body of every api error
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

type ApiError = Custom<Json<ErrorBody>>;

#[doc(hidden)]
fn api_error(status: Status, code: &'static str, message: impl ToString) -> ApiError {
    Custom(
        status,
        Json(ErrorBody {
            code,
            message: message.to_string(),
        }),
    )
}

/// Rendered ticket with its content type and a SHA-256 entity tag
#[derive(Responder)]
pub struct RenderedTicket {
    body: Vec<u8>,
    content_type: ContentType,
    etag: Header<'static>,
}

/// Render a ticket image using:
/// - `id`: The ticket identifier
/// - `format`: `blob` (default) for PNG bytes, `data` for a data URL
#[get("/tickets/<id>/image?<format>")]
pub async fn ticket_image(
    id: Result<TicketId, TicketIdError>,
    format: Option<&str>,
    renderer: &State<TicketRenderer>,
) -> Result<RenderedTicket, ApiError> {
    let id = id.map_err(|err| api_error(Status::BadRequest, "invalid_ticket_id", err))?;
    let mode = match format {
        Some(format) => format
            .parse::<RenderMode>()
            .map_err(|err| api_error(Status::BadRequest, "invalid_format", err))?,
        None => RenderMode::default(),
    };
    let image = renderer.render(&id, mode).map_err(|err| {
        warn!(ticket = %id, %err, "couldn't render ticket");
        api_error(Status::UnprocessableEntity, "encoding", err)
    })?;

    let content_type = match mode {
        RenderMode::Blob => ContentType::PNG,
        RenderMode::DataUrl => ContentType::Plain,
    };
    let body = image.into_bytes();
    let etag = format!("\"{:x}\"", Sha256::digest(&body));
    Ok(RenderedTicket {
        body,
        content_type,
        etag: Header::new("ETag", etag),
    })
}

/// Issue a ticket: pin its image, then its metadata
///
/// Needs a Pinata credential, answers `503 Service Unavailable` without one.
#[post("/tickets/<id>")]
pub async fn issue_ticket(
    id: Result<TicketId, TicketIdError>,
    issuer: &State<Option<TicketIssuer>>,
) -> Result<Json<IssuedTicket>, ApiError> {
    let id = id.map_err(|err| api_error(Status::BadRequest, "invalid_ticket_id", err))?;
    let issuer = issuer.inner().as_ref().ok_or_else(|| {
        api_error(
            Status::ServiceUnavailable,
            "pinning_disabled",
            "no pinning credential is configured",
        )
    })?;
    match issuer.issue(&id).await {
        Ok(issued) => Ok(Json(issued)),
        Err(err) => {
            error!(ticket = %id, kind = ?err.kind(), %err, "ticket issuance failed");
            Err(issue_error(err))
        }
    }
}

#[doc(hidden)]
fn issue_error(err: IssueError) -> ApiError {
    let (status, code) = match err.kind() {
        FailureKind::Encoding => (Status::UnprocessableEntity, "encoding"),
        FailureKind::Authentication => (Status::BadGateway, "authentication"),
        FailureKind::Network => (Status::GatewayTimeout, "network"),
        FailureKind::Service => (Status::BadGateway, "service"),
    };
    api_error(status, code, err)
}

/// Answer page routes with `index.html` so the front-end router can take over.
///
/// Ranked after the file server (rank 10), so existing files win.
#[get("/<path..>", rank = 20)]
pub async fn history_fallback(path: PathBuf, static_dir: &State<StaticDir>) -> Option<NamedFile> {
    if path.starts_with(API_SEGMENT) {
        return None;
    }
    NamedFile::open(static_dir.0.join(INDEX_FILE)).await.ok()
}

/// Build the development server
pub fn rocket(config: &ServerConfig, pinata: Option<PinataClient>) -> Rocket<Build> {
    let figment = Config::figment()
        .merge(("port", config.port))
        .merge(("address", LISTEN_ADDRESS));
    let renderer = TicketRenderer::new(config.origin.clone());
    let issuer = pinata.map(|pinata| TicketIssuer::new(renderer.clone(), pinata));
    if issuer.is_none() {
        info!("no pinning credential, ticket issuance is disabled");
    }

    let rocket = rocket::custom(figment)
        .mount("/api", routes![ticket_image, issue_ticket])
        .mount("/", routes![history_fallback])
        .manage(renderer)
        .manage(issuer)
        .manage(StaticDir(config.static_dir.clone()));

    if config.static_dir.is_dir() {
        rocket.mount("/", FileServer::from(&config.static_dir))
    } else {
        warn!(
            static_dir = %config.static_dir.display(),
            "static directory not found, only the api is served"
        );
        rocket
    }
}
