use tracing::info;

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::metrics::{self, MetricsSink};
use crate::prober::latency::measure_response_time;
use crate::prober::status::check_status;
use crate::prober::ProbeResult;
use crate::target::Target;

/// Run one uptime check against `target`.
///
/// Status and response time come from two separate requests, in that order.
/// Request failures end the check before anything is published; a publish
/// failure is logged and the result is returned regardless.
pub async fn run_check<S>(
    target: &Target,
    config: &ProbeConfig,
    sink: &S,
) -> Result<ProbeResult, ProbeError>
where
    S: MetricsSink + ?Sized,
{
    let url = target.parse()?;
    let timeout = config.timeout();

    let status = check_status(&url, timeout).await?;
    let response_time = measure_response_time(&url, timeout).await?;
    let result = ProbeResult::new(status, response_time);
    info!(
        "uptime check {} status {} in {:.2}ms",
        target.url,
        result.status(),
        result.response_time_ms()
    );

    metrics::publish(sink, &config.namespace, target, &result).await;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::Url;

    use super::*;
    use crate::metrics::testing::{FailingSink, RecordingSink};
    use crate::prober::test_server;

    fn config() -> ProbeConfig {
        ProbeConfig::default()
    }

    #[tokio::test]
    async fn reachable_target_returns_and_publishes() {
        let Some(addr) = test_server::spawn(200, Duration::from_millis(50)).await else {
            return;
        };
        let target = Target::new(format!("http://{addr}/"));
        let sink = RecordingSink::default();

        let result = run_check(&target, &config(), &sink).await.unwrap();
        assert_eq!(result.status(), 200);
        assert!(result.response_time() >= Duration::from_millis(50));
        assert!(result.response_time() < config().timeout());

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        let (namespace, measurements) = &calls[0];
        assert_eq!(namespace, "vmtest");
        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements[0].value, 200.0);
        assert_eq!(measurements[1].value, result.response_time_ms());
        for m in measurements {
            assert_eq!(m.dimension.name, "Site");
            assert_eq!(m.dimension.value, target.url);
        }
    }

    #[tokio::test]
    async fn server_error_still_succeeds() {
        let Some(addr) = test_server::spawn(500, Duration::ZERO).await else {
            return;
        };
        let target = Target::new(format!("http://{addr}/"));
        let sink = RecordingSink::default();

        let result = run_check(&target, &config(), &sink).await.unwrap();
        assert_eq!(result.status(), 500);
        assert_eq!(sink.calls().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_target_fails_without_publishing() {
        let Some(addr) = test_server::refused_addr().await else {
            return;
        };
        let target = Target::new(format!("http://{addr}/"));
        let sink = RecordingSink::default();

        let err = run_check(&target, &config(), &sink).await.unwrap_err();
        assert!(err.is_request_error(), "got {err:?}");
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_target_fails_without_publishing() {
        let target = Target::new("not a url");
        let sink = RecordingSink::default();

        let err = run_check(&target, &config(), &sink).await.unwrap_err();
        assert!(matches!(err, ProbeError::MalformedTarget { .. }));
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn padded_url_fails_without_publishing() {
        let Some(addr) = test_server::spawn(200, Duration::ZERO).await else {
            return;
        };
        let target = Target::new(format!("  http://{addr}/ \n"));
        let sink = RecordingSink::default();

        let err = run_check(&target, &config(), &sink).await.unwrap_err();
        assert!(matches!(err, ProbeError::MalformedTarget { .. }), "got {err:?}");
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn site_dimension_matches_probed_url() {
        let Some(addr) = test_server::spawn(200, Duration::ZERO).await else {
            return;
        };
        let target = Target::new(format!("http://{addr}/health"));
        let sink = RecordingSink::default();

        run_check(&target, &config(), &sink).await.unwrap();

        let calls = sink.calls();
        assert_eq!(calls.len(), 1);
        let probed = target.parse().unwrap();
        for m in &calls[0].1 {
            assert_eq!(m.dimension.value, format!("http://{addr}/health"));
            assert_eq!(Url::parse(&m.dimension.value).unwrap(), probed);
        }
    }

    #[tokio::test]
    async fn publish_failure_keeps_result() {
        let Some(addr) = test_server::spawn(200, Duration::ZERO).await else {
            return;
        };
        let target = Target::new(format!("http://{addr}/"));
        let sink = FailingSink::default();

        let result = run_check(&target, &config(), &sink).await.unwrap();
        assert_eq!(result.status(), 200);
        assert!(result.response_time() > Duration::ZERO);
        assert_eq!(*sink.attempts.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn slow_target_times_out() {
        let Some(addr) = test_server::spawn(200, Duration::from_millis(500)).await else {
            return;
        };
        let target = Target::new(format!("http://{addr}/"));
        let config = ProbeConfig {
            timeout_ms: 100,
            ..ProbeConfig::default()
        };
        let sink = RecordingSink::default();

        let err = run_check(&target, &config, &sink).await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }), "got {err:?}");
        assert!(sink.calls().is_empty());
    }
}
