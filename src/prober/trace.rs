use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Phase timings observed while a request is in flight.
#[derive(Debug, Default)]
pub struct PhaseRecorder {
    dns: Mutex<Option<Duration>>,
}

impl PhaseRecorder {
    fn record_dns(&self, elapsed: Duration) {
        if let Ok(mut dns) = self.dns.lock() {
            *dns = Some(elapsed);
        }
    }

    /// None when the host was an IP literal and no lookup happened.
    pub fn dns(&self) -> Option<Duration> {
        self.dns.lock().ok().and_then(|d| *d)
    }
}

/// DNS resolver that times each lookup into a shared recorder.
pub struct TimingResolver {
    recorder: Arc<PhaseRecorder>,
}

impl TimingResolver {
    pub fn new(recorder: Arc<PhaseRecorder>) -> Self {
        Self { recorder }
    }
}

impl Resolve for TimingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let recorder = self.recorder.clone();
        let host = name.as_str().to_string();
        Box::pin(async move {
            let start = Instant::now();
            let addrs = resolve_host(&host).await.map_err(|e| Box::new(e) as BoxError)?;
            recorder.record_dns(start.elapsed());
            Ok::<Addrs, BoxError>(Box::new(addrs.into_iter()))
        })
    }
}

// port is filled in by the connector
async fn resolve_host(host: &str) -> std::io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, 0)).await?.collect();
    if addrs.is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Could not resolve hostname: {}", host),
        ));
    }
    Ok(addrs)
}
