use serde::{Deserialize, Serialize};

pub const MAPTILER_ATTRIBUTION: &str = "© MapTiler © OpenStreetMap contributors";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStyle {
    Streets,
    Satellite,
    Outdoor,
    Topo,
}

impl MapStyle {
    /// Cycling order.
    pub const ALL: [MapStyle; 4] = [
        MapStyle::Streets,
        MapStyle::Satellite,
        MapStyle::Outdoor,
        MapStyle::Topo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Streets => "Streets",
            Self::Satellite => "Satellite",
            Self::Outdoor => "Outdoor",
            Self::Topo => "Topo",
        }
    }

    /// Tile URL template with `{z}/{x}/{y}` placeholders and a `{key}` slot.
    pub fn url_template(&self) -> &'static str {
        match self {
            Self::Streets => "https://api.maptiler.com/maps/streets-v2/{z}/{x}/{y}.png?key={key}",
            Self::Satellite => "https://api.maptiler.com/maps/satellite/{z}/{x}/{y}.jpg?key={key}",
            Self::Outdoor => "https://api.maptiler.com/maps/outdoor-v2/{z}/{x}/{y}.png?key={key}",
            Self::Topo => "https://api.maptiler.com/maps/topo-v2/{z}/{x}/{y}.png?key={key}",
        }
    }

    pub fn attribution(&self) -> &'static str {
        MAPTILER_ATTRIBUTION
    }

    pub fn tile_url(&self, api_key: &str) -> String {
        self.url_template().replace("{key}", api_key)
    }
}

/// Index into [`MapStyle::ALL`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleSelector {
    index: usize,
}

impl StyleSelector {
    pub fn current(&self) -> MapStyle {
        MapStyle::ALL[self.index]
    }

    pub fn cycle(&mut self) -> MapStyle {
        self.index = (self.index + 1) % MapStyle::ALL.len();
        self.current()
    }
}

/// Entry of the style catalogue served over HTTP.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileLayer {
    pub style: MapStyle,
    pub name: String,
    pub url: String,
    pub attribution: String,
}

impl TileLayer {
    pub fn new(style: MapStyle, api_key: &str) -> Self {
        Self {
            style,
            name: style.name().into(),
            url: style.tile_url(api_key),
            attribution: style.attribution().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_streets() {
        assert_eq!(StyleSelector::default().current(), MapStyle::Streets);
    }

    #[test]
    fn cycling_wraps_after_last_style() {
        let mut selector = StyleSelector::default();
        let original = selector.current();

        let seen: Vec<MapStyle> = (0..MapStyle::ALL.len()).map(|_| selector.cycle()).collect();

        assert_eq!(selector.current(), original);
        assert_eq!(
            seen,
            vec![
                MapStyle::Satellite,
                MapStyle::Outdoor,
                MapStyle::Topo,
                MapStyle::Streets
            ]
        );
    }

    #[test]
    fn tile_url_substitutes_key() {
        let url = MapStyle::Topo.tile_url("abc123");
        assert_eq!(
            url,
            "https://api.maptiler.com/maps/topo-v2/{z}/{x}/{y}.png?key=abc123"
        );
    }
}
