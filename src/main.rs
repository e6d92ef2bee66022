use chroma_sort::camera::StillImageSource;
use chroma_sort::config::Settings;
use chroma_sort::{AppError, CoordinatorBuilder};
use tracing::Level;

fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = Settings::load()?;
    init_logging(&settings.logging.level);

    let frame_path = settings.camera.frame_path.clone().ok_or_else(|| {
        AppError::Coordinator("camera.frame_path is not configured".to_string())
    })?;
    tracing::info!("Starting color detector on {}", frame_path.display());

    let (mut coordinator, api) = CoordinatorBuilder::new(settings)
        .frame_source(Box::new(StillImageSource::new(frame_path)))
        .build()
        .await?;

    let config = api.config().await;
    tracing::info!(
        selectors = config.selectors.len(),
        notifications = config.notifications_enabled(),
        "Detector running, press Ctrl+C to stop"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }

    tracing::info!(
        "Stopping detector, last color {}",
        api.current_color().await
    );
    coordinator.shutdown().await
}
