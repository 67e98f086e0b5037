mod config;
mod error;
mod metrics;
mod prober;
mod target;
mod uptime;

use config::{LogFormat, ProbeConfig};
use metrics::{CloudWatchSink, LogSink, MetricsSink};
use target::Target;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = ProbeConfig::from_env()?;
    let log_level = config.get_tracing_level()?;

    // stdout is reserved for the invocation result
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("uptime_probe={}", log_level.as_str().to_lowercase()).parse()?);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }

    let mut event = String::new();
    tokio::io::stdin()
        .read_to_string(&mut event)
        .await
        .context("reading invocation event from stdin")?;
    let target: Target = serde_json::from_str(&event).context("parsing invocation event")?;

    let sink: Box<dyn MetricsSink> = if config.publish_metrics {
        Box::new(CloudWatchSink::from_env().await)
    } else {
        info!("metrics publishing disabled");
        Box::new(LogSink)
    };

    match uptime::run_check(&target, &config, sink.as_ref()).await {
        Ok(result) => {
            println!("{}", serde_json::to_string(&result)?);
            Ok(())
        }
        Err(e) => {
            error!(
                request_error = e.is_request_error(),
                "uptime check {} failed: {}", target.url, e
            );
            Err(e.into())
        }
    }
}
