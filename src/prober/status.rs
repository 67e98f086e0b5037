use std::time::Duration;

use reqwest::Url;
use tracing::debug;

use super::{build_client, send_bounded};
use crate::error::ProbeError;

/// GET `url` and report the response status. Non-2xx codes are results, not errors.
pub async fn check_status(url: &Url, timeout: Duration) -> Result<u16, ProbeError> {
    let client = build_client(timeout)?;
    let (resp, elapsed) = send_bounded(&client, url, timeout).await?;
    let status = resp.status().as_u16();
    // body is released unread
    drop(resp);

    debug!("status probe {} returned {} in {:?}", url, status, elapsed);
    Ok(status)
}
