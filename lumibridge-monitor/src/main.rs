use std::process::ExitCode;
use std::sync::Arc;

use lumibridge_core::settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = Arc::new(Settings::new().expect("Failed to load settings."));

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level}").into()
        }))
        .init();

    if let Err(e) = lumibridge_monitor::run(settings).await {
        tracing::error!("monitor failed: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
