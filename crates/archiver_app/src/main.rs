mod platform;

use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = platform::config_path_from_args();
    platform::run_app(&config_path)
        .await
        .with_context(|| format!("archiver failed (config {:?})", config_path))
}
