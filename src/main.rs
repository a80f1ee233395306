use std::sync::Arc;

use farmmap::config::Config;
use farmmap::error::Error;
use farmmap::external::osrm;
use farmmap::resolver::RouteResolver;
use farmmap::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    tracing::info!(
        "routing via {} (timeout {:?}, fallback {} km/h)",
        config.routing.api_base,
        config.routing.timeout,
        config.routing.fallback_speed_kmh
    );

    let router = Arc::new(osrm::Client::new(&config.routing)?);
    let resolver = RouteResolver::new(router, &config.routing);

    serve(config, resolver).await
}
