use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::{
    entities::Coordinates,
    error::{configuration_error, Error},
};

/// Average speed assumed for straight-line estimates on unpaved rural roads.
pub const DEFAULT_FALLBACK_SPEED_KMH: f64 = 40.0;

/// Used only when no position could be acquired at all.
pub const DEFAULT_LOCATION: Coordinates = Coordinates {
    latitude: -6.1659,
    longitude: 39.2026,
};

pub const DEFAULT_ROUTING_API_BASE: &str = "https://router.project-osrm.org";

#[derive(Clone, Debug)]
pub struct RoutingConfig {
    pub api_base: String,
    pub timeout: Duration,
    pub fallback_speed_kmh: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_ROUTING_API_BASE.into(),
            timeout: Duration::from_secs(10),
            fallback_speed_kmh: DEFAULT_FALLBACK_SPEED_KMH,
        }
    }
}

#[derive(Clone, Debug)]
pub struct WidgetConfig {
    pub tile_api_key: String,
    pub default_location: Coordinates,
    pub user_zoom: u8,
    pub fit_padding: u32,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            tile_api_key: String::new(),
            default_location: DEFAULT_LOCATION,
            user_zoom: 13,
            fit_padding: 50,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub routing: RoutingConfig,
    pub widget: WidgetConfig,
    pub listen_addr: SocketAddr,
}

impl RoutingConfig {
    /// Rejects settings that would turn every route into an estimate.
    pub fn validate(&self) -> Result<(), Error> {
        if self.timeout.is_zero() {
            return Err(configuration_error("ROUTING_TIMEOUT_SECS"));
        }

        if !(self.fallback_speed_kmh.is_finite() && self.fallback_speed_kmh > 0.0) {
            return Err(configuration_error("FALLBACK_SPEED_KMH"));
        }

        Ok(())
    }
}

impl Config {
    /// Reads overrides from the environment; unset keys keep their defaults.
    #[tracing::instrument(name = "Config::from_env")]
    pub fn from_env() -> Result<Self, Error> {
        let routing_defaults = RoutingConfig::default();
        let widget_defaults = WidgetConfig::default();

        let routing = RoutingConfig {
            api_base: env::var("ROUTING_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(routing_defaults.api_base),
            timeout: parse_var::<u64>("ROUTING_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(routing_defaults.timeout),
            fallback_speed_kmh: parse_var::<f64>("FALLBACK_SPEED_KMH")?
                .unwrap_or(routing_defaults.fallback_speed_kmh),
        };

        routing.validate()?;

        let default_location = Coordinates::new(
            parse_var::<f64>("DEFAULT_LATITUDE")?
                .unwrap_or(widget_defaults.default_location.latitude),
            parse_var::<f64>("DEFAULT_LONGITUDE")?
                .unwrap_or(widget_defaults.default_location.longitude),
        );

        if !default_location.is_valid() {
            return Err(configuration_error("DEFAULT_LATITUDE/DEFAULT_LONGITUDE"));
        }

        let widget = WidgetConfig {
            tile_api_key: env::var("MAPTILER_API_KEY").unwrap_or_default(),
            default_location,
            ..widget_defaults
        };

        let listen_addr = parse_var::<SocketAddr>("LISTEN_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));

        Ok(Self {
            routing,
            widget,
            listen_addr,
        })
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, Error> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| configuration_error(key)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
