use geo_types::{LineString, Rect};
use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;
use crate::format::{format_distance, format_duration};

/// A driving path as returned by the routing service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutedPath {
    pub distance: f64,
    pub duration: f64,
    pub path: LineString<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Route {
    Routed {
        distance: f64,
        duration: f64,
        path: LineString<f64>,
    },
    Estimated {
        distance: f64,
        duration: f64,
    },
}

impl From<RoutedPath> for Route {
    fn from(routed: RoutedPath) -> Self {
        Route::Routed {
            distance: routed.distance,
            duration: routed.duration,
            path: routed.path,
        }
    }
}

impl Route {
    /// Straight-line estimate at `speed_kmh`.
    pub fn estimate(origin: &Coordinates, destination: &Coordinates, speed_kmh: f64) -> Self {
        let distance = origin.haversine_distance(destination);
        let meters_per_second = speed_kmh * 1000.0 / 3600.0;

        Route::Estimated {
            distance,
            duration: distance / meters_per_second,
        }
    }

    pub fn distance(&self) -> f64 {
        match self {
            Self::Routed { distance, .. } | Self::Estimated { distance, .. } => *distance,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Self::Routed { duration, .. } | Self::Estimated { duration, .. } => *duration,
        }
    }

    pub fn is_estimate(&self) -> bool {
        matches!(self, Self::Estimated { .. })
    }

    pub fn path(&self) -> Option<&LineString<f64>> {
        match self {
            Self::Routed { path, .. } => Some(path),
            Self::Estimated { .. } => None,
        }
    }

    /// Viewport covering both endpoints and, when routed, every path point.
    pub fn bounds(&self, origin: &Coordinates, destination: &Coordinates) -> Rect<f64> {
        let mut rect = Rect::new(*origin, *destination);

        if let Some(path) = self.path() {
            for coord in path.coords() {
                let min = rect.min();
                let max = rect.max();
                rect = Rect::new(
                    (min.x.min(coord.x), min.y.min(coord.y)),
                    (max.x.max(coord.x), max.y.max(coord.y)),
                );
            }
        }

        rect
    }

    pub fn info(&self) -> RouteInfo {
        RouteInfo {
            distance_text: format_distance(self.distance()),
            duration_text: format_duration(self.duration()),
            is_estimate: self.is_estimate(),
        }
    }
}

/// Text shown in the summary panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub distance_text: String,
    pub duration_text: String,
    pub is_estimate: bool,
}

impl RouteInfo {
    pub fn caption(&self) -> Option<&'static str> {
        match self.is_estimate {
            true => Some("Estimated straight-line distance; road distance may differ"),
            false => None,
        }
    }
}
