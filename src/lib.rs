//! # Ticketpin
//!
//! `ticketpin` renders ticket images holding a QR code and pins them to
//! [IPFS](https://ipfs.tech) through [Pinata](https://pinata.cloud), together
//! with a metadata document pointing at the image.
//!
//! # How to use
//!
//! Two binaries are built:
//! - `issue-ticket <id>`: issues one ticket and prints the content identifier
//!   of its metadata document
//! - `ticketpin`: development server for the front-end, with the ticket
//!   pipeline exposed under `/api`
//!
//! Both read the following environment variables:
//! - PINATA_JWT: Pinata API credential, required to pin anything
//! - PINATA_API_URL: Pinata API, defaults to `https://api.pinata.cloud`
//! - PINATA_GATEWAY_URL: gateway used in metadata, defaults to `https://gateway.pinata.cloud`
//! - PINATA_TIMEOUT_SECS: seconds before a pinning request is abandoned, defaults to 60
//! - TICKET_ORIGIN: origin QR codes link to, e.g. `https://tickets.example.com`
//! - TICKET_ID: ticket issued by `issue-ticket` when no argument is given
//! - PORT: port of the development server, defaults to 3000
//! - STATIC_DIR: built front-end served by the development server, defaults to `dist`
//!
//! Log verbosity follows `RUST_LOG`, e.g. `RUST_LOG=ticketpin=debug`.
//!
//! # Useful links
//! - [Pinata pinning API](https://docs.pinata.cloud/api-reference/endpoint/ipfs/pin-file-to-ipfs)

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod issue;
pub mod pinata;
pub mod render;
pub mod server;
pub mod ticket;

/// Default filter when `RUST_LOG` isn't set
const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the `tracing` subscriber used by both binaries.
///
/// Logs go to stderr, leaving stdout for program output.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[doc(hidden)]
#[cfg(test)]
mod test;
