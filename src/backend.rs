//! Rendering backend capability
//!
//! The core never looks inside a canvas or an overlay. It only asks a backend
//! to build, attach, detach and query them, so any renderer implementing
//! [`MapBackend`] can sit behind the dashboard.

use crate::error::MapError;
use crate::geo::{Bounds, Coordinate, WeightedPoint};
use crate::style::{HeatStyle, RectStyle};
use serde::{Deserialize, Serialize};

/// Initial viewport of a freshly created canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: f64,
}

/// Base raster backdrop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

pub trait MapBackend {
    /// Display surface a canvas is bound to
    type Container;
    /// Live map viewport
    type Canvas;
    /// Drawable layer handle
    type Overlay;

    /// `false` while the container is not attached to a display surface yet
    fn container_ready(&self, container: &Self::Container) -> bool;

    fn create_canvas(
        &mut self,
        container: &Self::Container,
        view: &MapView,
    ) -> Result<Self::Canvas, MapError>;

    fn add_tile_backdrop(&mut self, canvas: &mut Self::Canvas, tiles: &TileSource);

    fn build_heat_overlay(&mut self, points: &[WeightedPoint], style: &HeatStyle) -> Self::Overlay;

    fn build_rectangle_overlay(&mut self, bounds: &Bounds, style: &RectStyle) -> Self::Overlay;

    fn attach(&mut self, canvas: &mut Self::Canvas, overlay: &Self::Overlay);

    fn detach(&mut self, canvas: &mut Self::Canvas, overlay: &Self::Overlay);

    fn is_attached(&self, canvas: &Self::Canvas, overlay: &Self::Overlay) -> bool;

    fn destroy_canvas(&mut self, canvas: Self::Canvas);
}
