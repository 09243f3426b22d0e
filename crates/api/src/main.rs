use vaxtrack_infra::StoreConfig;

const ENV_BIND_ADDR: &str = "VAXTRACK_BIND_ADDR";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vaxtrack_observability::init();

    let config = StoreConfig::from_env()?;
    let services = vaxtrack_api::app::services::build_services(&config)?;
    let app = vaxtrack_api::app::build_app(services);

    let addr = std::env::var(ENV_BIND_ADDR).unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
