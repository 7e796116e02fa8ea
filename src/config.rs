//! Configuration loader - YAML dashboard manifest + .env settings
//!
//! The defaults reproduce the São Paulo placeholder dashboard. A manifest only
//! needs the sections it wants to change.

use crate::backend::{MapView, TileSource};
use crate::error::MapError;
use crate::geo::{Bounds, Coordinate};
use crate::layers::{GreenArea, HeatSet, LayerId, LayerStyles};
use crate::panels::RegionPanels;
use crate::style::{Color, Gradient, HeatStyle, RectStyle};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sampling and styling for one heat layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatLayerConfig {
    pub center: Coordinate,
    pub radius_m: f64,
    pub count: usize,
    pub style: HeatStyle,
}

/// Main configuration loaded from the dashboard manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub view: MapView,
    pub tiles: TileSource,
    pub layers: HeatSet<HeatLayerConfig>,
    pub green: GreenArea,
    /// Layers shown when the dashboard opens
    pub initial_layers: Vec<String>,
    /// Sidebar statistics and critical areas
    pub panels: RegionPanels,
}

/// Settings loaded from the environment / .env
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub log_dir: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let heat = |center: [f64; 2], radius_m, count, radius, blur, stops: &[(f64, &str)]| HeatLayerConfig {
            center: center.into(),
            radius_m,
            count,
            style: HeatStyle {
                radius,
                blur,
                gradient: Gradient::from_pairs(stops).expect("built-in gradient is valid"),
            },
        };

        Self {
            view: MapView {
                center: Coordinate::new(-23.5505, -46.6333),
                zoom: 12.0,
            },
            tiles: TileSource {
                url_template: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png".to_string(),
                attribution: "© OpenStreetMap © CARTO".to_string(),
                max_zoom: 20,
            },
            layers: HeatSet {
                poluicao: heat([-23.5505, -46.6333], 8000.0, 200, 25.0, 15.0, &[(0.4, "blue"), (0.6, "lime"), (1.0, "red")]),
                calor: heat([-23.54, -46.65], 10000.0, 250, 30.0, 20.0, &[(0.4, "cyan"), (0.65, "yellow"), (1.0, "red")]),
                pop: heat([-23.56, -46.63], 12000.0, 300, 20.0, 10.0, &[(0.2, "lightblue"), (0.5, "violet"), (1.0, "purple")]),
            },
            green: GreenArea {
                bounds: Bounds::new(Coordinate::new(-23.4, -46.8), Coordinate::new(-23.7, -46.5)),
                style: RectStyle {
                    color: Color::rgb(0xa5, 0x2a, 0x2a),
                    weight: 0.0,
                    fill_opacity: 0.3,
                },
            },
            initial_layers: vec![LayerId::Poluicao.to_string()],
            panels: RegionPanels::default(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DashboardConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading dashboard config from {:?}", path);
            Self::load(path)
        } else {
            tracing::warn!("Config file not found: {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Reject values the generator or the factory would refuse
    pub fn validate(&self) -> Result<(), MapError> {
        for (id, layer) in self.layers.iter() {
            if !layer.radius_m.is_finite() || layer.radius_m <= 0.0 {
                tracing::error!("Layer '{}' has invalid sampling radius {}", id, layer.radius_m);
                return Err(MapError::InvalidRadius(layer.radius_m));
            }
            layer.style.validate()?;
        }
        self.green.style.validate()?;
        if self.tiles.max_zoom < 1 {
            return Err(MapError::InvalidStyle(format!(
                "tile max zoom {} below 1",
                self.tiles.max_zoom
            )));
        }
        if !(0.0..=self.tiles.max_zoom as f64).contains(&self.view.zoom) {
            return Err(MapError::InvalidStyle(format!(
                "zoom {} outside 0..={}",
                self.view.zoom, self.tiles.max_zoom
            )));
        }
        Ok(())
    }

    pub fn styles(&self) -> LayerStyles {
        LayerStyles {
            heat: HeatSet {
                poluicao: self.layers.poluicao.style.clone(),
                calor: self.layers.calor.style.clone(),
                pop: self.layers.pop.style.clone(),
            },
            green: self.green,
        }
    }
}

impl Settings {
    /// Load settings from .env file
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Settings {
            config_path: std::env::var("URBAN_MAP_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("dashboard.yaml")),
            log_dir: std::env::var("URBAN_MAP_LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        }
    }
}
