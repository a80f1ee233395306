use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

/// Latitude or longitude as the marketplace sends it: a number or a numeric string.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Degrees {
    Number(f64),
    Text(String),
}

impl Degrees {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// The farm the widget routes to.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default)]
    pub lat: Option<Degrees>,
    #[serde(default)]
    pub lng: Option<Degrees>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Destination {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            lat: Some(Degrees::Number(coordinates.latitude)),
            lng: Some(Degrees::Number(coordinates.longitude)),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `None` when the coordinates are missing, unparsable, out of range or
    /// the bare `(0, 0)` placeholder.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let latitude = self.lat.as_ref()?.value()?;
        let longitude = self.lng.as_ref()?.value()?;
        let coordinates = Coordinates::new(latitude, longitude);

        if !coordinates.is_valid() || (latitude == 0.0 && longitude == 0.0) {
            return None;
        }

        Some(coordinates)
    }

    pub fn label(&self) -> String {
        if self.coordinates().is_none() {
            return "Location unknown".into();
        }

        match (&self.name, &self.location) {
            (Some(name), Some(location)) => format!("{}, {}", name, location),
            (Some(name), None) => name.clone(),
            (None, Some(location)) => location.clone(),
            (None, None) => "Farm".into(),
        }
    }
}
