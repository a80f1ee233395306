use axum::extract::{Extension, Json};

use crate::entities::{MapStyle, TileLayer};
use crate::server::SharedWidgetConfig;

pub async fn list(Extension(config): Extension<SharedWidgetConfig>) -> Json<Vec<TileLayer>> {
    let layers = MapStyle::ALL
        .iter()
        .map(|style| TileLayer::new(*style, &config.tile_api_key))
        .collect::<Vec<_>>();

    layers.into()
}
