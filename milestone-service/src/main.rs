use milestone_service::config::MilestoneConfig;
use milestone_service::startup::Application;
use service_core::observability::init_tracing;

const SERVICE_NAME: &str = "milestone-service";

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = MilestoneConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        SERVICE_NAME,
        &config.common.log_level,
        config.otlp_endpoint.as_deref(),
    );

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
