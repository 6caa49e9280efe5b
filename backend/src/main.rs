//! Weather Prediction Service - Backend Server
//!
//! Loads the model artifact once in the background and serves predictions
//! as soon as it is ready. Health checks answer from the first moment.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use weather_prediction_backend::{
    config::{Config, LogFormat},
    create_app,
    model::{LoadOutcome, ModelSlot},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    init_tracing(config.logging.format);

    tracing::info!("Starting Weather Prediction Service");
    tracing::info!("Environment: {}", config.environment);

    // Create application state
    let state = AppState::new(config.clone());
    spawn_model_load(Arc::clone(&state.model), &config);

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "wps_server=debug,weather_prediction_backend=debug,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Parse and validate the artifact on a blocking thread. Until it finishes
/// the service reports itself degraded and refuses predictions.
fn spawn_model_load(slot: Arc<ModelSlot>, config: &Config) {
    let path = config.model.artifact_path.clone();
    let expected = config.model.expected_schema_version.clone();

    tokio::task::spawn_blocking(move || {
        tracing::info!("Loading model artifact from {}", path.display());
        match slot.load_once(&path, expected.as_deref()) {
            LoadOutcome::Loaded => {
                if let Some(deployment) = slot.get() {
                    let model = deployment.model();
                    tracing::info!(
                        backend = model.kind(),
                        input_width = model.expected_input_width(),
                        output_width = model.output_width(),
                        schema_version = deployment.schema_version(),
                        "Model loaded"
                    );
                }
            }
            LoadOutcome::Failed(err) => {
                tracing::error!("Model failed to load, serving degraded: {}", err);
            }
            LoadOutcome::AlreadyLoaded | LoadOutcome::AlreadyAttempted => {}
        }
    });
}
