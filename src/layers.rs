//! Thematic layers - identifiers, selection, registry and the layer factory

use crate::backend::MapBackend;
use crate::geo::Bounds;
use crate::sampler::ThematicDataset;
use crate::style::{HeatStyle, RectStyle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// The four dashboard layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerId {
    /// Air quality (NO2)
    Poluicao,
    /// Urban heat islands (land surface temperature)
    Calor,
    /// Green deficit (NDVI), static placeholder area
    Verde,
    /// Population density
    Pop,
}

impl LayerId {
    pub const ALL: [LayerId; 4] = [LayerId::Poluicao, LayerId::Calor, LayerId::Verde, LayerId::Pop];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerId::Poluicao => "poluicao",
            LayerId::Calor => "calor",
            LayerId::Verde => "verde",
            LayerId::Pop => "pop",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LayerId::Poluicao => "Qualidade do Ar (NO₂)",
            LayerId::Calor => "Ilhas de Calor (LST)",
            LayerId::Verde => "Déficit Verde (NDVI)",
            LayerId::Pop => "Densidade Populacional",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LayerId::Poluicao => "Sentinel-5P/TROPOMI nitrogen dioxide concentration. Red marks high pollution.",
            LayerId::Calor => "Land surface temperature from Landsat/MODIS. Hotter areas in red and orange.",
            LayerId::Verde => "Normalized vegetation index. Placeholder region pending satellite data.",
            LayerId::Pop => "SEDAC and GHSL population grids. Denser areas weigh more.",
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("unknown layer '{}'", s))
    }
}

/// Layer identifiers the caller wants visible; unknown names are carried and ignored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSelection {
    ids: BTreeSet<String>,
}

impl ActiveSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma separated list, e.g. `poluicao,calor`
    pub fn parse_list(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    pub fn remove(&mut self, id: &str) {
        self.ids.remove(id);
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.ids.contains(id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entries that do not name a known layer
    pub fn unknown(&self) -> impl Iterator<Item = &str> {
        self.ids
            .iter()
            .map(String::as_str)
            .filter(|s| s.parse::<LayerId>().is_err())
    }
}

impl<S: Into<String>> FromIterator<S> for ActiveSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { ids: iter.into_iter().map(Into::into).collect() }
    }
}

impl From<LayerId> for String {
    fn from(id: LayerId) -> Self {
        id.as_str().to_string()
    }
}

/// Per heat layer values; the green layer is not data driven
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatSet<T> {
    pub poluicao: T,
    pub calor: T,
    pub pop: T,
}

impl<T> HeatSet<T> {
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &T)> {
        [
            (LayerId::Poluicao, &self.poluicao),
            (LayerId::Calor, &self.calor),
            (LayerId::Pop, &self.pop),
        ]
        .into_iter()
    }

    pub fn get(&self, id: LayerId) -> Option<&T> {
        match id {
            LayerId::Poluicao => Some(&self.poluicao),
            LayerId::Calor => Some(&self.calor),
            LayerId::Pop => Some(&self.pop),
            LayerId::Verde => None,
        }
    }

    pub fn try_map<U, E>(&self, mut f: impl FnMut(LayerId, &T) -> Result<U, E>) -> Result<HeatSet<U>, E> {
        Ok(HeatSet {
            poluicao: f(LayerId::Poluicao, &self.poluicao)?,
            calor: f(LayerId::Calor, &self.calor)?,
            pop: f(LayerId::Pop, &self.pop)?,
        })
    }
}

/// Fixed rectangle standing in for green coverage data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenArea {
    pub bounds: Bounds,
    pub style: RectStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyles {
    pub heat: HeatSet<HeatStyle>,
    pub green: GreenArea,
}

/// Layer id -> overlay, always holding exactly the four known layers
#[derive(Debug)]
pub struct LayerRegistry<O> {
    overlays: BTreeMap<LayerId, O>,
}

impl<O> LayerRegistry<O> {
    fn from_fn(mut f: impl FnMut(LayerId) -> O) -> Self {
        Self {
            overlays: LayerId::ALL.into_iter().map(|id| (id, f(id))).collect(),
        }
    }

    pub fn get(&self, id: LayerId) -> Option<&O> {
        self.overlays.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &O)> {
        self.overlays.iter().map(|(id, o)| (*id, o))
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }
}

/// Build the overlay for every layer. Heat layers come from their datasets;
/// the green layer is the static rectangle in `styles.green`.
///
/// Gradient stops are handed to the backend as they are.
pub fn build<B: MapBackend>(
    backend: &mut B,
    datasets: &HeatSet<ThematicDataset>,
    styles: &LayerStyles,
) -> LayerRegistry<B::Overlay> {
    LayerRegistry::from_fn(|id| match (datasets.get(id), styles.heat.get(id)) {
        (Some(data), Some(style)) => {
            tracing::debug!("Building heat overlay '{}' from {} samples", id, data.len());
            backend.build_heat_overlay(&data.points, style)
        }
        _ => {
            tracing::debug!("Building static rectangle overlay '{}'", id);
            backend.build_rectangle_overlay(&styles.green.bounds, &styles.green.style)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::memory::{MemoryBackend, OverlayKind};
    use crate::sampler;

    fn datasets(count: usize) -> HeatSet<ThematicDataset> {
        let cfg = DashboardConfig::default();
        cfg.layers
            .try_map(|_, l| sampler::generate(l.center, l.radius_m, count))
            .unwrap()
    }

    #[test]
    fn test_layer_id_roundtrip_names() {
        for id in LayerId::ALL {
            assert_eq!(id.as_str().parse::<LayerId>(), Ok(id));
        }
        assert!("ndvi".parse::<LayerId>().is_err());
    }

    #[test]
    fn test_selection_parse_and_unknown() {
        let sel = ActiveSelection::parse_list("poluicao, calor,,satellite");
        assert!(sel.contains(LayerId::Poluicao));
        assert!(sel.contains(LayerId::Calor));
        assert!(!sel.contains(LayerId::Verde));
        assert_eq!(sel.unknown().collect::<Vec<_>>(), vec!["satellite"]);
        assert!(ActiveSelection::parse_list("").is_empty());
    }

    #[test]
    fn test_build_has_all_four_layers() {
        let mut backend = MemoryBackend::new();
        let styles = DashboardConfig::default().styles();
        let registry = build(&mut backend, &datasets(10), &styles);

        assert_eq!(registry.len(), 4);
        for id in LayerId::ALL {
            assert!(registry.get(id).is_some(), "missing {}", id);
        }
    }

    #[test]
    fn test_green_layer_is_static_rectangle() {
        let mut backend = MemoryBackend::new();
        let styles = DashboardConfig::default().styles();
        let registry = build(&mut backend, &datasets(10), &styles);

        let verde = registry.get(LayerId::Verde).unwrap();
        match backend.overlay(verde) {
            Some(OverlayKind::Rectangle { bounds, style }) => {
                assert_eq!(*bounds, styles.green.bounds);
                assert_eq!(style.weight, 0.0);
                assert!((style.fill_opacity - 0.3).abs() < 1e-6);
            }
            other => panic!("expected rectangle, got {:?}", other),
        }
        for id in [LayerId::Poluicao, LayerId::Calor, LayerId::Pop] {
            assert!(matches!(
                backend.overlay(registry.get(id).unwrap()),
                Some(OverlayKind::Heat { samples: 10, .. })
            ));
        }
    }

    #[test]
    fn test_empty_datasets_still_build() {
        let mut backend = MemoryBackend::new();
        let styles = DashboardConfig::default().styles();
        let registry = build(&mut backend, &datasets(0), &styles);

        assert_eq!(registry.len(), 4);
        let pol = registry.get(LayerId::Poluicao).unwrap();
        assert!(matches!(backend.overlay(pol), Some(OverlayKind::Heat { samples: 0, .. })));
    }

    #[test]
    fn test_gradient_passed_through() {
        let mut backend = MemoryBackend::new();
        let styles = DashboardConfig::default().styles();
        let registry = build(&mut backend, &datasets(3), &styles);

        let calor = registry.get(LayerId::Calor).unwrap();
        match backend.overlay(calor) {
            Some(OverlayKind::Heat { style, .. }) => assert_eq!(style, &styles.heat.calor),
            other => panic!("expected heat overlay, got {:?}", other),
        }
    }
}
