use catalog_api::logging::setup_tracing;
use catalog_api::platform::report::{StartupReport, log_configuration_failure};
use catalog_api::platform::{EnvironmentContext, PlatformBootstrap, ServiceAccountClientFactory};
use catalog_api::tools::system::install_termination_listener;
use catalog_api::tools::watch::Watch;
use catalog_api::web::health_service::get_health_route;
use catalog_api::web::warp::{ServerConfig, run_webserver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let uptime = Watch::start();
    setup_tracing();

    let context = EnvironmentContext::from_env();
    let server = ServerConfig::from_env(context.mode())?;

    let registry = match PlatformBootstrap::new(ServiceAccountClientFactory).initialize(&context) {
        Ok(registry) => registry,
        Err(err) => {
            log_configuration_failure(&err);
            return Err(err.into());
        }
    };

    install_termination_listener();

    let routes = get_health_route(
        server.api_path(),
        uptime,
        context.mode().as_str().to_string(),
    );

    StartupReport::new(&context, &registry, &server).log();
    run_webserver(routes, &server).await
}
