use std::{path::Path, time::Duration};

use serde_derive::Deserialize;

use crate::{data_types::common::Point, error::ConfigError};

pub const CONFIG_FILE: &str = "safemap.toml";
pub const CONFIG_ENV: &str = "SAFEMAP_CONFIG";

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub routing: RoutingConfig,
    pub geocoding: GeocodingConfig,
    pub daylight: DaylightConfig,
    pub map: MapConfig,
    pub sync: SyncConfig,
    pub geolocation: GeolocationConfig,
    pub http: HttpConfig,
    pub summary: SummaryConfig,
    pub logging: LoggingSection,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub api_key: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://catalog.api.2gis.com".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DaylightConfig {
    pub base_url: String,
}

impl Default for DaylightConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sunrise-sunset.org".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub dark_style: String,
    pub light_style: String,
    pub lamp_tiles: String,
    pub center: Point,
    pub zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            dark_style: "https://basemaps.cartocdn.com/gl/dark-matter-gl-style/style.json"
                .to_string(),
            light_style: "https://basemaps.cartocdn.com/gl/positron-gl-style/style.json"
                .to_string(),
            lamp_tiles: "http://localhost:8080/data/light/{z}/{x}/{y}.pbf".to_string(),
            center: Point::new(55.538, 37.55),
            zoom: 12.5,
        }
    }
}

impl MapConfig {
    pub fn style_url(&self, dark: bool) -> &str {
        if dark {
            &self.dark_style
        } else {
            &self.light_style
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SyncConfig {
    pub debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { debounce_ms: 30 }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GeolocationConfig {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub max_age_ms: u64,

    /// Fixed position reported as the user location, for hosts without a
    /// positioning service.
    pub position: Option<Point>,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 10_000,
            max_age_ms: 60_000,
            position: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SummaryConfig {
    pub walking_speed_kmh: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            walking_speed_kmh: 5.0,
        }
    }
}

/// Which components log, and how much.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoggingSection {
    pub enabled: bool,
    pub verbose: bool,
    pub verbose_components: Vec<String>,
    pub muted: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            verbose: false,
            verbose_components: Vec::new(),
            muted: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Config::from_toml(&content)
    }

    /// `$SAFEMAP_CONFIG`, else `./safemap.toml`. A missing default file means
    /// defaults everywhere; an explicitly named one must exist.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Config::load_from_file(path);
        }

        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Config::load_from_file(path)
        } else {
            Ok(Config::default())
        }
    }
}
