use async_trait::async_trait;
use geo_types::LineString;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    api::RoutingService,
    config::RoutingConfig,
    entities::{Coordinates, RoutedPath},
    error::{invalid_input_error, upstream_error, Error},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response {
    code: Option<String>,
    #[serde(default)]
    routes: Vec<RouteBody>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RouteBody {
    distance: f64,
    duration: f64,
    geometry: Geometry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Geometry {
    coordinates: Vec<[f64; 2]>,
}

/// Driving directions from an OSRM-compatible routing service.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    api_base: String,
}

impl Client {
    pub fn new(config: &RoutingConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn route_url(&self, origin: &Coordinates, destination: &Coordinates) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.api_base,
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude
        )
    }
}

#[async_trait]
impl RoutingService for Client {
    #[tracing::instrument(skip(self))]
    async fn driving_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RoutedPath, Error> {
        let res = self
            .http
            .get(self.route_url(&origin, &destination))
            .query(&[("overview", "full")])
            .query(&[("geometries", "geojson")])
            .send()
            .await?;

        check_status(res.status())?;

        let body = res.text().await?;

        parse_route(&body)
    }
}

/// Client errors mean the request itself was rejected; any other non-2xx
/// status is the service's fault.
fn check_status(status: StatusCode) -> Result<(), Error> {
    if status.is_client_error() {
        return Err(invalid_input_error());
    }

    if !status.is_success() {
        return Err(upstream_error());
    }

    Ok(())
}

/// First route of a routing response, or an upstream error when there is none.
pub fn parse_route(body: &str) -> Result<RoutedPath, Error> {
    let data: Response = serde_json::from_str(body)?;

    if let Some(code) = &data.code {
        if code != "Ok" {
            tracing::warn!("routing service answered with code {}", code);
            return Err(upstream_error());
        }
    }

    let route = data.routes.into_iter().next().ok_or_else(upstream_error)?;

    if !(route.distance.is_finite() && route.duration.is_finite()) {
        return Err(upstream_error());
    }

    Ok(RoutedPath {
        distance: route.distance,
        duration: route.duration,
        path: LineString::from(route.geometry.coordinates),
    })
}
