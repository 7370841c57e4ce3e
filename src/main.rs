//! Development server: serves the built front-end and the ticket api.

use anyhow::{anyhow, Result};

use ticketpin::config::{PinataConfig, ServerConfig};
use ticketpin::pinata::PinataClient;
use ticketpin::server;

use tracing::info;

#[rocket::main]
async fn main() -> Result<()> {
    ticketpin::init_tracing();

    let config = ServerConfig::from_env()?;
    let pinata = match PinataConfig::from_env()? {
        Some(pinata) => Some(PinataClient::new(&pinata)?),
        None => None,
    };
    info!(port = config.port, origin = %config.origin, "starting development server");

    // rocket::Error must be inspected before it's dropped, formatting it does that
    server::rocket(&config, pinata)
        .launch()
        .await
        .map_err(|err| anyhow!("{}", err))?;
    Ok(())
}
