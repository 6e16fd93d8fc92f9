mod adapter;
mod audit;
mod breakpoints;
mod classify;
mod format;
mod handles;
mod location;
mod machine;
mod outbox;
mod protocol;
mod session;
mod settings;
#[cfg(test)]
mod testing;
mod transport;

use std::sync::Arc;
use std::time::Duration;

use adapter::{DebugAdapter, HttpConnector};
use audit::TraceLog;
use outbox::Outbox;
use session::Session;
use settings::AdapterSettings;
use tokio::io::BufReader;

/// How long a launch or attach still in flight gets to release its request on exit.
const LIFECYCLE_TIMEOUT: Duration = Duration::from_secs(10);
/// How long queued responses and events get to reach the frontend on exit.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AdapterSettings::from_env();

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(settings.log_level)
        .init();

    let trace = match &settings.trace_file {
        Some(path) => match TraceLog::open(path.clone()).await {
            Ok(log) => {
                tracing::info!("Tracing frontend messages to {}", log.path().display());
                Some(Arc::new(log))
            }
            Err(e) => {
                tracing::warn!("Failed to open trace file {}: {}", path.display(), e);
                None
            }
        },
        None => None,
    };

    let (outbox, rx) = Outbox::channel();
    let writer = tokio::spawn(transport::write_loop(rx, tokio::io::stdout(), trace.clone()));

    let session = Arc::new(Session::new(
        settings.breakpoint_policy,
        settings.configuration_done_timeout,
    ));
    let adapter = DebugAdapter::new(Arc::new(HttpConnector), session, outbox);

    tracing::info!("Starting jsdbg debug adapter on stdio...");
    let served = adapter.serve(BufReader::new(tokio::io::stdin()), trace).await;

    adapter.finish(LIFECYCLE_TIMEOUT).await;
    drop(adapter);
    match tokio::time::timeout(FLUSH_TIMEOUT, writer).await {
        Ok(Ok(Err(e))) => tracing::warn!("Frontend writer failed: {}", e),
        Ok(Err(e)) => tracing::warn!("Frontend writer panicked: {}", e),
        Ok(Ok(Ok(()))) => {}
        Err(_) => tracing::warn!("Timed out flushing messages to the frontend"),
    }

    served
}
