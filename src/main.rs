use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{core_config_from_env, router, AppState};
use pttrack_core::ClinicContext;

/// Main entry point for the patient tracker
///
/// Loads `.env`, opens the clinic store and serves the REST API (with Swagger UI) on port 3000.
///
/// # Environment Variables
/// - `PTTRACK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_DIR`: Directory holding the clinic snapshot (default: "patient_data")
/// - `PTTRACK_REFERENCE_DATA`: Optional YAML file replacing the built-in lookup tables
/// - `PTTRACK_UTC_OFFSET`: Clinic offset from UTC in whole hours (default: 0)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pttrack_run=info".parse()?)
                .add_directive("pttrack_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("PTTRACK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(core_config_from_env()?);
    tracing::info!(
        "++ Patient data in {}",
        cfg.patient_data_dir().display()
    );
    let ctx = ClinicContext::open(cfg)?;

    tracing::info!("++ Starting patient tracker REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(AppState::new(ctx))).await?;

    Ok(())
}
