//! Interactive PIN authorization.

use std::io::Write;
use std::time::Duration;

use ecobee_client::{ClientError, EcobeeClient, Tokens};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::ExporterResult;

/// Runs the ecobee PIN flow and stores the resulting tokens in the cache.
///
/// Instructions for the user are written to `out`. The authorization endpoint
/// is then polled at the interval ecobee asks for until the PIN is accepted
/// or expires.
///
/// # Errors
///
/// Returns `ClientError::Auth` if the PIN expires or is rejected, or any
/// transport or cache error.
pub async fn authorize<W: Write>(client: &EcobeeClient, out: &mut W) -> ExporterResult<Tokens> {
    let pin = client.request_pin().await?;
    let lifetime = Duration::from_secs(u64::try_from(pin.expires_in).unwrap_or(0).saturating_mul(60));
    let interval = Duration::from_secs(pin.interval.max(1));
    let deadline = Instant::now() + lifetime;

    writeln!(out, "Your ecobee PIN is: {}", pin.ecobee_pin)?;
    writeln!(
        out,
        "Log in to the ecobee portal, open \"My Apps\", choose \"Add Application\" and enter the PIN."
    )?;
    writeln!(out, "The PIN expires in {} minutes.", pin.expires_in)?;
    out.flush()?;

    info!(expires_in_minutes = pin.expires_in, interval_secs = interval.as_secs(), "waiting for PIN entry");

    loop {
        tokio::time::sleep(interval).await;

        match client.exchange_pin(&pin.code).await {
            Ok(tokens) => {
                writeln!(out, "Authorization complete.")?;
                return Ok(tokens);
            }
            Err(ClientError::AuthorizationPending) => {
                debug!("PIN not yet entered");
            }
            Err(e) => return Err(e.into()),
        }

        if Instant::now() >= deadline {
            return Err(ClientError::Auth {
                reason: "PIN expired before it was entered".to_string(),
            }
            .into());
        }
    }
}
