use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_cloudwatch::Client as CloudWatchClient;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::types::{Dimension as CwDimension, MetricDatum, StandardUnit};
use tracing::{debug, warn};

use crate::error::PublishError;
use crate::prober::ProbeResult;
use crate::target::Target;

pub const STATUS_METRIC: &str = "status";
pub const RESPONSE_TIME_METRIC: &str = "responsetime";
pub const SITE_DIMENSION: &str = "Site";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Count,
    Milliseconds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

/// One named value sent to the metrics backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub name: String,
    pub unit: Unit,
    pub value: f64,
    pub dimension: Dimension,
}

/// The two measurements reported per check, both keyed by the probed url.
pub fn build_measurements(target: &Target, result: &ProbeResult) -> Vec<Measurement> {
    let site = Dimension {
        name: SITE_DIMENSION.to_string(),
        value: target.url.clone(),
    };
    vec![
        Measurement {
            name: STATUS_METRIC.to_string(),
            unit: Unit::Count,
            value: f64::from(result.status()),
            dimension: site.clone(),
        },
        Measurement {
            name: RESPONSE_TIME_METRIC.to_string(),
            unit: Unit::Milliseconds,
            value: result.response_time_ms(),
            dimension: site,
        },
    ]
}

/// Destination for measurements.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn put(&self, namespace: &str, measurements: Vec<Measurement>) -> Result<(), PublishError>;
}

/// Push the check's measurements in a single call. A failed push is logged
/// and dropped so the probe result stands on its own.
pub async fn publish<S>(sink: &S, namespace: &str, target: &Target, result: &ProbeResult)
where
    S: MetricsSink + ?Sized,
{
    let measurements = build_measurements(target, result);
    match sink.put(namespace, measurements).await {
        Ok(()) => debug!("published metrics for {} to {}", target.url, namespace),
        Err(e) => warn!("failed to publish metrics for {}: {}", target.url, e),
    }
}

pub struct CloudWatchSink {
    client: CloudWatchClient,
}

impl CloudWatchSink {
    /// Build a client from the ambient AWS environment.
    pub async fn from_env() -> Self {
        let region_provider = RegionProviderChain::default_provider().or_else("us-east-1");
        let aws_cfg = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;
        Self {
            client: CloudWatchClient::new(&aws_cfg),
        }
    }

    fn to_datum(m: Measurement) -> MetricDatum {
        let unit = match m.unit {
            Unit::Count => StandardUnit::Count,
            Unit::Milliseconds => StandardUnit::Milliseconds,
        };
        let dimension = CwDimension::builder()
            .name(m.dimension.name)
            .value(m.dimension.value)
            .build();
        MetricDatum::builder()
            .metric_name(m.name)
            .unit(unit)
            .value(m.value)
            .dimensions(dimension)
            .build()
    }
}

#[async_trait]
impl MetricsSink for CloudWatchSink {
    async fn put(&self, namespace: &str, measurements: Vec<Measurement>) -> Result<(), PublishError> {
        let data: Vec<MetricDatum> = measurements.into_iter().map(Self::to_datum).collect();

        self.client
            .put_metric_data()
            .namespace(namespace)
            .set_metric_data(Some(data))
            .send()
            .await
            .map_err(|e| PublishError::new(namespace, DisplayErrorContext(e).to_string()))?;
        Ok(())
    }
}

/// Sink for dry runs: logs what would have been sent.
pub struct LogSink;

#[async_trait]
impl MetricsSink for LogSink {
    async fn put(&self, namespace: &str, measurements: Vec<Measurement>) -> Result<(), PublishError> {
        for m in measurements {
            debug!(
                "{}/{} {}={} {:?} {}",
                namespace, m.name, m.dimension.name, m.dimension.value, m.unit, m.value
            );
        }
        Ok(())
    }
}
