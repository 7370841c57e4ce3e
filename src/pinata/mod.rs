//! Client for the [Pinata](https://pinata.cloud) pinning API.
//!
//! Only the two pinning endpoints are covered:
//! - `POST /pinning/pinFileToIPFS`: multipart upload of a single file
//! - `POST /pinning/pinJSONToIPFS`: upload of a JSON document
//!
//! Both answer with the content identifier (`IpfsHash`) of what was pinned.

use super::config::PinataConfig;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};

use rocket::serde::json::serde_json;
use rocket::serde::{Deserialize, Serialize};

use std::fmt;

use tracing::{debug, warn};

mod error;

pub use error::{FailureKind, PinError};

const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";
const PIN_JSON_PATH: &str = "/pinning/pinJSONToIPFS";
/// CID version requested for pinned JSON documents
const JSON_CID_VERSION: u8 = 1;

/// Address of pinned content, as returned in `IpfsHash`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(crate = "rocket::serde", transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(cid: impl Into<String>) -> Self {
        ContentId(cid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body Pinata answers both pinning endpoints with
#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "PascalCase")]
pub struct PinResponse {
    pub ipfs_hash: String,
    #[serde(default)]
    pub pin_size: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, rename = "isDuplicate")]
    pub is_duplicate: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
struct PinataOptions {
    cid_version: u8,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
struct PinataMetadata<'a> {
    name: &'a str,
}

/// Envelope wrapping a JSON document sent to `pinJSONToIPFS`
#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
struct PinJsonRequest<'a, T> {
    pinata_options: PinataOptions,
    pinata_metadata: PinataMetadata<'a>,
    pinata_content: &'a T,
}

/// Pinata API client
#[derive(Clone)]
pub struct PinataClient {
    client: Client,
    jwt: String,
    api_url: String,
    gateway_url: String,
}

impl fmt::Debug for PinataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinataClient")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .finish_non_exhaustive()
    }
}

impl PinataClient {
    /// Create a client from its configuration
    ///
    /// # Errors
    ///
    /// Returns `PinError::RequestFailed` if the HTTP client can't be built
    pub fn new(config: &PinataConfig) -> Result<Self, PinError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PinError::RequestFailed(e.to_string()))?;
        Ok(PinataClient {
            client,
            jwt: config.jwt.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
        })
    }

    /// Public gateway address of pinned content: `<gateway>/ipfs/<cid>`
    pub fn gateway_url(&self, cid: &ContentId) -> String {
        format!("{}/ipfs/{}", self.gateway_url, cid)
    }

    /// Pin a single file under `name`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejected credentials, API errors
    /// or unusable responses
    pub async fn pin_file(
        &self,
        name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<ContentId, PinError> {
        let size = bytes.len();
        let file = Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(mime)
            .map_err(|e| PinError::InvalidUpload(e.to_string()))?;
        let metadata = serde_json::to_string(&PinataMetadata { name })
            .map_err(|e| PinError::InvalidUpload(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("pinataMetadata", metadata);

        debug!(name, size, "pinning file");
        let response = self
            .client
            .post(self.endpoint(PIN_FILE_PATH))
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinError::RequestFailed(e.to_string()))?;
        content_id(name, response).await
    }

    /// Pin `content` as a JSON document named `name`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejected credentials, API errors
    /// or unusable responses
    pub async fn pin_json<T: Serialize>(
        &self,
        name: &str,
        content: &T,
    ) -> Result<ContentId, PinError> {
        let request = PinJsonRequest {
            pinata_options: PinataOptions {
                cid_version: JSON_CID_VERSION,
            },
            pinata_metadata: PinataMetadata { name },
            pinata_content: content,
        };

        debug!(name, "pinning json document");
        let response = self
            .client
            .post(self.endpoint(PIN_JSON_PATH))
            .bearer_auth(&self.jwt)
            .json(&request)
            .send()
            .await
            .map_err(|e| PinError::RequestFailed(e.to_string()))?;
        content_id(name, response).await
    }

    #[doc(hidden)]
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

/// Turns a pinning response into the content identifier it carries
async fn content_id(name: &str, response: Response) -> Result<ContentId, PinError> {
    match response.status() {
        StatusCode::OK => {
            let pinned = response
                .json::<PinResponse>()
                .await
                .map_err(|e| PinError::ResponseParseFailed(e.to_string()))?;
            if pinned.ipfs_hash.trim().is_empty() {
                return Err(PinError::ResponseParseFailed(
                    "response carried an empty IpfsHash".to_string(),
                ));
            }
            debug!(
                name,
                cid = %pinned.ipfs_hash,
                pin_size = ?pinned.pin_size,
                duplicate = ?pinned.is_duplicate,
                "pinned"
            );
            Ok(ContentId(pinned.ipfs_hash))
        }
        status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            warn!(name, %status, "pinning service rejected the credential");
            Err(PinError::Unauthorized {
                status: status.as_u16(),
            })
        }
        StatusCode::TOO_MANY_REQUESTS => Err(PinError::RateLimited),
        status => {
            let message = response.text().await.unwrap_or_default();
            Err(PinError::ApiError {
                status: status.as_u16(),
                message,
            })
        }
    }
}
