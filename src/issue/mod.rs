//! Ticket issuance: render the ticket, pin the image, then pin its metadata.
//!
//! The steps run strictly in order. A failed image upload stops the pipeline,
//! so a metadata document only ever references an image that was pinned.

use super::pinata::{ContentId, FailureKind, PinError, PinataClient};
use super::render::{RenderError, RenderMode, TicketRenderer, PNG_MIME};
use super::ticket::TicketId;

use rocket::serde::Serialize;

use std::io::Write;

use thiserror::Error;

use tracing::{error, info, instrument};

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("ticket image couldn't be rendered: {0}")]
    Encoding(#[from] RenderError),
    #[error("ticket image upload failed: {0}")]
    ImageUpload(#[source] PinError),
    #[error("ticket metadata publish failed: {0}")]
    MetadataPublish(#[source] PinError),
}

impl IssueError {
    pub fn kind(&self) -> FailureKind {
        match self {
            IssueError::Encoding(_) => FailureKind::Encoding,
            IssueError::ImageUpload(err) | IssueError::MetadataPublish(err) => err.kind(),
        }
    }
}

/// Document pinned next to each ticket image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TicketMetadata {
    /// Gateway URL of the pinned ticket image
    pub image: String,
}

/// Outcome of a successful issuance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct IssuedTicket {
    pub ticket_id: TicketId,
    pub image_cid: ContentId,
    pub metadata_cid: ContentId,
}

/// Issues tickets by pinning their images and metadata
#[derive(Debug, Clone)]
pub struct TicketIssuer {
    renderer: TicketRenderer,
    pinata: PinataClient,
}

impl TicketIssuer {
    pub fn new(renderer: TicketRenderer, pinata: PinataClient) -> Self {
        TicketIssuer { renderer, pinata }
    }

    /// Renders the ticket image and pins it, returning the image's content identifier
    #[instrument(skip(self, id), fields(ticket = %id))]
    pub async fn upload_image(&self, id: &TicketId) -> Result<ContentId, IssueError> {
        let image = self.renderer.render(id, RenderMode::Blob)?;
        let cid = self
            .pinata
            .pin_file(&image_file_name(id), image.into_bytes(), PNG_MIME)
            .await
            .map_err(IssueError::ImageUpload)?;
        info!(%cid, "ticket image pinned");
        Ok(cid)
    }

    /// Pins the metadata document pointing at an already pinned image
    #[instrument(skip(self, id, image_cid), fields(ticket = %id, image = %image_cid))]
    pub async fn publish_metadata(
        &self,
        id: &TicketId,
        image_cid: &ContentId,
    ) -> Result<ContentId, IssueError> {
        let metadata = self.metadata(image_cid);
        let cid = self
            .pinata
            .pin_json(&metadata_file_name(id), &metadata)
            .await
            .map_err(IssueError::MetadataPublish)?;
        info!(%cid, "ticket metadata pinned");
        Ok(cid)
    }

    /// Runs the whole pipeline for one ticket
    pub async fn issue(&self, id: &TicketId) -> Result<IssuedTicket, IssueError> {
        let image_cid = self.upload_image(id).await?;
        let metadata_cid = self.publish_metadata(id, &image_cid).await?;
        Ok(IssuedTicket {
            ticket_id: id.clone(),
            image_cid,
            metadata_cid,
        })
    }

    /// Metadata document referencing `image_cid`
    pub fn metadata(&self, image_cid: &ContentId) -> TicketMetadata {
        TicketMetadata {
            image: self.pinata.gateway_url(image_cid),
        }
    }
}

/// Issues one ticket and writes the metadata content identifier, and nothing
/// else, as a single line to `out`.
///
/// On failure nothing is written and the classified error is returned, so a
/// missing identifier is never printed.
pub async fn run_issuance<W: Write>(
    issuer: &TicketIssuer,
    id: &TicketId,
    out: &mut W,
) -> anyhow::Result<IssuedTicket> {
    match issuer.issue(id).await {
        Ok(issued) => {
            writeln!(out, "{}", issued.metadata_cid)?;
            Ok(issued)
        }
        Err(err) => {
            error!(ticket = %id, kind = ?err.kind(), %err, "ticket issuance aborted");
            Err(err.into())
        }
    }
}

/// Name the ticket image is pinned under
pub fn image_file_name(id: &TicketId) -> String {
    format!("ticket_{}.png", id)
}

/// Name the metadata document is pinned under
pub fn metadata_file_name(id: &TicketId) -> String {
    format!("ticket{}_metadata.json", id)
}
