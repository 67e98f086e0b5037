use std::time::{Duration, Instant};

use reqwest::{Client, Response, Url};
use serde::Serialize;

use crate::error::ProbeError;

pub mod latency;
pub mod status;
pub mod trace;

/// Outcome of one check: the status code and how long the timed request took.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ProbeResult {
    status: u16,
    #[serde(rename = "responsetime", serialize_with = "as_millis")]
    response_time: Duration,
}

impl ProbeResult {
    pub fn new(status: u16, response_time: Duration) -> Self {
        Self {
            status,
            response_time,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn response_time(&self) -> Duration {
        self.response_time
    }

    pub fn response_time_ms(&self) -> f64 {
        self.response_time.as_secs_f64() * 1000.0
    }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64() * 1000.0)
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client, ProbeError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ProbeError::Client)
}

/// Send a GET and return the response with the time it took to arrive.
/// Anything at or past `timeout` counts as a timeout.
pub(crate) async fn send_bounded(
    client: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<(Response, Duration), ProbeError> {
    let start = Instant::now();
    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ProbeError::from_reqwest(url.as_str(), timeout, e))?;
    let elapsed = start.elapsed();

    if elapsed >= timeout {
        return Err(ProbeError::Timeout {
            url: url.to_string(),
            timeout,
        });
    }
    Ok((resp, elapsed))
}

#[cfg(test)]
pub(crate) mod test_server {
    use std::io::ErrorKind;
    use std::net::SocketAddr;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Loopback responder answering every request with `status` after `delay`.
    /// Returns None where the sandbox forbids binding.
    pub async fn spawn(status: u16, delay: Duration) -> Option<SocketAddr> {
        let listener = match TcpListener::bind("127.0.0.1:0").await {
            Ok(l) => l,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => return None,
            Err(e) => panic!("Failed to bind test listener: {e}"),
        };
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    continue;
                };
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    tokio::time::sleep(delay).await;
                    let resp = format!(
                        "HTTP/1.1 {status} Test\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
                    );
                    let _ = stream.write_all(resp.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Some(addr)
    }

    /// An address nothing listens on.
    pub async fn refused_addr() -> Option<SocketAddr> {
        let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
        let addr = listener.local_addr().ok()?;
        drop(listener);
        Some(addr)
    }
}
