use anyhow::Result;

use copa_daemon::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = telemetry::init("copa-daemon")?;
    copa_daemon::server::run().await
}
