mod destination;
mod location;
mod map_style;
mod route;

pub use destination::{Degrees, Destination};
pub use location::{Coordinates, Position, EARTH_RADIUS_M};
pub use map_style::{MapStyle, StyleSelector, TileLayer, MAPTILER_ATTRIBUTION};
pub use route::{Route, RouteInfo, RoutedPath};
