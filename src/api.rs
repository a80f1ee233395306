use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use geo_types::{LineString, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Coordinates, MapStyle, Position, RoutedPath};
use crate::error::Error;

#[async_trait]
pub trait RoutingService {
    async fn driving_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RoutedPath, Error>;
}

pub type DynRouter = Arc<dyn RoutingService + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub maximum_age: Duration,
    pub timeout: Duration,
}

impl PositionOptions {
    /// Fast, coarse first fix.
    pub fn initial_fix() -> Self {
        Self {
            enable_high_accuracy: false,
            maximum_age: Duration::from_secs(60),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn continuous() -> Self {
        Self {
            enable_high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unsupported,
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::PermissionDenied => "permission denied",
            Self::PositionUnavailable => "position unavailable",
            Self::Timeout => "timeout",
            Self::Unsupported => "geolocation unsupported",
        };

        f.write_str(message)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// A running position subscription; updates stop once the provider clears it.
pub struct Watch {
    pub id: WatchId,
    pub updates: async_channel::Receiver<Result<Position, PositionError>>,
}

#[async_trait]
pub trait GeolocationProvider {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self, options: PositionOptions) -> Result<Position, PositionError>;

    fn watch_position(&self, options: PositionOptions) -> Result<Watch, PositionError>;

    fn clear_watch(&self, id: WatchId);
}

pub type DynGeolocation = Arc<dyn GeolocationProvider + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    User,
    Destination,
}

impl Marker {
    pub fn color(&self) -> &'static str {
        match self {
            Self::User => "#2563eb",
            Self::Destination => "#dc2626",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(pub Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

/// The drawing side of a map widget.
pub trait MapSurface {
    fn set_tile_layer(&mut self, style: MapStyle, url: &str, attribution: &str);

    fn set_view(&mut self, center: Coordinates, zoom: u8);

    fn place_marker(&mut self, marker: Marker, at: Coordinates);

    fn remove_marker(&mut self, marker: Marker);

    fn add_route_line(&mut self, path: &LineString<f64>) -> LayerId;

    fn remove_layer(&mut self, id: LayerId);

    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: u32);
}

pub type DynSurface = Box<dyn MapSurface + Send>;
