//! Issues a single ticket: pins its image and metadata, then prints the
//! metadata content identifier.
//!
//! Usage: `issue-ticket [ticket-id]`, falling back to `TICKET_ID`.

use anyhow::Result;

use std::env;
use std::io;

use ticketpin::config::{IssueConfig, PinataConfig};
use ticketpin::issue::{run_issuance, TicketIssuer};
use ticketpin::pinata::PinataClient;
use ticketpin::render::TicketRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    ticketpin::init_tracing();

    let config = IssueConfig::from_env(env::args().nth(1))?;
    let pinata = PinataClient::new(&PinataConfig::require_from_env()?)?;
    let issuer = TicketIssuer::new(TicketRenderer::new(config.origin), pinata);

    run_issuance(&issuer, &config.ticket_id, &mut io::stdout().lock()).await?;
    Ok(())
}
