use axum::extract::{Extension, Json, Query};
use serde::{Deserialize, Serialize};

use crate::entities::{Coordinates, Route, RouteInfo};
use crate::error::{invalid_input_error, Error};
use crate::server::SharedResolver;

#[derive(Serialize, Deserialize)]
pub struct ResolveParams {
    from_lat: f64,
    from_lng: f64,
    to_lat: f64,
    to_lng: f64,
}

#[derive(Serialize, Deserialize)]
pub struct Summary {
    is_estimate: bool,
    distance_text: String,
    duration_text: String,
    caption: Option<String>,
}

impl From<RouteInfo> for Summary {
    fn from(info: RouteInfo) -> Self {
        Self {
            caption: info.caption().map(String::from),
            is_estimate: info.is_estimate,
            distance_text: info.distance_text,
            duration_text: info.duration_text,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ResolveResponse {
    route: Route,
    info: Summary,
}

pub async fn resolve(
    Extension(resolver): Extension<SharedResolver>,
    Query(params): Query<ResolveParams>,
) -> Result<Json<ResolveResponse>, Error> {
    let origin = Coordinates::new(params.from_lat, params.from_lng);
    let destination = Coordinates::new(params.to_lat, params.to_lng);

    if !(origin.is_valid() && destination.is_valid()) {
        return Err(invalid_input_error());
    }

    let route = resolver.resolve(origin, destination).await;
    let info = route.info().into();

    Ok(ResolveResponse { route, info }.into())
}
