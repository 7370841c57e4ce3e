//! Ticket image composition.
//!
//! A ticket image is a 200x200 PNG holding the QR code of the ticket deep link
//! and a centered `Ticket #<id>` label under it.

use super::ticket::{ticket_link, TicketId};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageFormat, Luma, Rgb, RgbImage};

use qrcode::types::QrError;
use qrcode::QrCode;

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use thiserror::Error;

use tracing::debug;

mod label;

/// Width and height of the rendered ticket
pub const CANVAS_SIZE: u32 = 200;
/// Left edge of the QR code on the canvas
pub const QR_X: u32 = 22;
/// Top edge of the QR code on the canvas
pub const QR_Y: u32 = 5;
/// Width and height of the QR code on the canvas
pub const QR_SIZE: u32 = 155;
/// Baseline of the label
pub const LABEL_BASELINE: u32 = 180;
/// Media type of [RenderMode::Blob] output
pub const PNG_MIME: &str = "image/png";

const DATA_URL_PREFIX: &str = "data:image/png;base64,";
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Error)]
pub enum RenderError {
    /// The deep link couldn't be turned into a QR code
    #[error("couldn't encode {payload:?} as a QR code: {reason}")]
    Encoding { payload: String, reason: QrError },
    #[error("couldn't encode ticket image as PNG: {0}")]
    Image(#[from] ImageError),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown render mode {0:?}, expected \"blob\" or \"data\"")]
pub struct UnknownRenderMode(String);

/// How a rendered ticket is handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Raw PNG bytes
    #[default]
    Blob,
    /// A `data:image/png;base64,...` URL
    DataUrl,
}

impl FromStr for RenderMode {
    type Err = UnknownRenderMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(RenderMode::Blob),
            "data" => Ok(RenderMode::DataUrl),
            other => Err(UnknownRenderMode(other.to_string())),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Blob => f.write_str("blob"),
            RenderMode::DataUrl => f.write_str("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
    Blob(Vec<u8>),
    DataUrl(String),
}

/// A rendered ticket together with what was drawn on it
#[derive(Debug, Clone)]
pub struct TicketImage {
    pub ticket_id: TicketId,
    /// Payload of the QR code
    pub deep_link: String,
    pub label: String,
    pub output: RenderOutput,
}

impl TicketImage {
    pub fn mime_type(&self) -> &'static str {
        match self.output {
            RenderOutput::Blob(_) => PNG_MIME,
            RenderOutput::DataUrl(_) => "text/plain",
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self.output {
            RenderOutput::Blob(bytes) => bytes,
            RenderOutput::DataUrl(url) => url.into_bytes(),
        }
    }
}

/// Draws ticket images whose QR codes point at `origin`
#[derive(Debug, Clone)]
pub struct TicketRenderer {
    origin: String,
}

impl TicketRenderer {
    pub fn new(origin: impl Into<String>) -> Self {
        TicketRenderer {
            origin: origin.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The link a scanned ticket opens
    pub fn deep_link(&self, id: &TicketId) -> String {
        ticket_link(&self.origin, id)
    }

    /// Draws the ticket canvas without encoding it
    pub fn compose(&self, id: &TicketId) -> Result<RgbImage, RenderError> {
        let payload = self.deep_link(id);
        let code = QrCode::new(payload.as_bytes()).map_err(|reason| RenderError::Encoding {
            payload: payload.clone(),
            reason,
        })?;

        let modules = code
            .render::<Luma<u8>>()
            .quiet_zone(false)
            .module_dimensions(1, 1)
            .build();
        let scaled = imageops::resize(&modules, QR_SIZE, QR_SIZE, FilterType::Nearest);
        let scaled = DynamicImage::ImageLuma8(scaled).to_rgb8();

        let mut canvas = RgbImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, BACKGROUND);
        label::draw_centered_label(&mut canvas, &id.label(), LABEL_BASELINE, INK);
        imageops::replace(&mut canvas, &scaled, i64::from(QR_X), i64::from(QR_Y));
        Ok(canvas)
    }

    /// Renders the ticket as PNG bytes or as a data URL, depending on `mode`
    pub fn render(&self, id: &TicketId, mode: RenderMode) -> Result<TicketImage, RenderError> {
        let canvas = self.compose(id)?;
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(canvas).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        debug!(ticket = %id, %mode, bytes = png.len(), "rendered ticket image");

        let output = match mode {
            RenderMode::Blob => RenderOutput::Blob(png),
            RenderMode::DataUrl => RenderOutput::DataUrl(to_data_url(&png)),
        };
        Ok(TicketImage {
            ticket_id: id.clone(),
            deep_link: self.deep_link(id),
            label: id.label(),
            output,
        })
    }
}

/// Wraps PNG bytes in a base64 data URL
pub fn to_data_url(png: &[u8]) -> String {
    format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(png))
}

/// Extracts the PNG bytes back out of a data URL built by [to_data_url]
pub fn from_data_url(url: &str) -> Option<Vec<u8>> {
    let encoded = url.strip_prefix(DATA_URL_PREFIX)?;
    STANDARD.decode(encoded).ok()
}
