mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};

use crate::config::{Config, WidgetConfig};
use crate::error::{server_error, Error};
use crate::resolver::RouteResolver;
use crate::server::handlers::{routes, styles};

pub type SharedResolver = Arc<RouteResolver>;
pub type SharedWidgetConfig = Arc<WidgetConfig>;

pub fn router(resolver: RouteResolver, widget: WidgetConfig) -> Router {
    Router::new()
        .route("/routes", get(routes::resolve))
        .route("/styles", get(styles::list))
        .layer(Extension(Arc::new(resolver) as SharedResolver))
        .layer(Extension(Arc::new(widget) as SharedWidgetConfig))
}

pub async fn serve(config: Config, resolver: RouteResolver) -> Result<(), Error> {
    let app = router(resolver, config.widget);
    let addr: SocketAddr = config.listen_addr;

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(server_error)
}
