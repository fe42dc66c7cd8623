use trellis_core::logging::{error, info};
use trellis_tutorials::{AppConfig, apps};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let _guard = config.logging().init()?;

    info!(
        app = config.app.as_str(),
        port = config.port,
        "Loaded tutorial configuration"
    );

    let app = apps::bootstrap(&config).await.inspect_err(|e| {
        error!(error = %e, "Failed to bootstrap tutorial");
    })?;

    println!("Tutorial '{}' running on http://localhost:{}", config.app.as_str(), config.port);
    app.listen(config.port).await?;
    Ok(())
}
