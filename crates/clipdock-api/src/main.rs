use clipdock_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load a local .env if present; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let (_state, router) = clipdock_api::setup::initialize_app(config.clone()).await?;

    clipdock_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
