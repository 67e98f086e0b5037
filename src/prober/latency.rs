use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use tracing::debug;

use super::send_bounded;
use super::trace::{PhaseRecorder, TimingResolver};
use crate::error::ProbeError;

/// GET `url` and return the wall-clock time until the response arrived.
///
/// The clock starts right before the request goes out and stops once the
/// response object is back, before its body is released. The client carries a
/// timing resolver so the DNS phase shows up in debug logs.
pub async fn measure_response_time(url: &Url, timeout: Duration) -> Result<Duration, ProbeError> {
    let recorder = Arc::new(PhaseRecorder::default());
    let client = Client::builder()
        .timeout(timeout)
        .dns_resolver(Arc::new(TimingResolver::new(recorder.clone())))
        .build()
        .map_err(ProbeError::Client)?;

    let (resp, elapsed) = send_bounded(&client, url, timeout).await?;
    debug!(
        "timing probe {} answered from {} in {:?} (dns: {:?})",
        url,
        resp.url(),
        elapsed,
        recorder.dns()
    );
    drop(resp);

    Ok(elapsed)
}
