//! Headless in-memory backend
//!
//! Keeps overlays in an arena and records every call, so lifecycle and
//! reconciliation can be driven and inspected without a window.

use crate::backend::{MapBackend, MapView, TileSource};
use crate::error::MapError;
use crate::geo::{Bounds, WeightedPoint};
use crate::style::{HeatStyle, RectStyle};
use std::collections::BTreeSet;

/// Stand-in for a display container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub name: String,
    pub attached: bool,
}

impl Surface {
    pub fn attached(name: &str) -> Self {
        Self { name: name.to_string(), attached: true }
    }

    #[cfg(test)]
    pub fn detached(name: &str) -> Self {
        Self { name: name.to_string(), attached: false }
    }
}

/// Opaque overlay handle: index into the backend arena of the live canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(usize);

#[derive(Debug, Clone)]
pub enum OverlayKind {
    Heat { samples: usize, style: HeatStyle },
    Rectangle { bounds: Bounds, style: RectStyle },
}

#[derive(Debug)]
pub struct MemoryCanvas {
    pub serial: u64,
    pub surface: String,
    pub view: MapView,
    pub tiles: Vec<TileSource>,
    attached: BTreeSet<OverlayId>,
}

impl MemoryCanvas {
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }
}

/// Call counters, for asserting minimal attach/detach traffic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub canvases_created: u64,
    pub canvases_destroyed: u64,
    pub tile_backdrops: u64,
    pub attaches: u64,
    pub detaches: u64,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    overlays: Vec<OverlayKind>,
    stats: CallStats,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CallStats {
        self.stats
    }

    pub fn live_canvases(&self) -> u64 {
        self.stats.canvases_created - self.stats.canvases_destroyed
    }

    /// Overlay behind `id`; `None` once its canvas has been destroyed
    pub fn overlay(&self, id: &OverlayId) -> Option<&OverlayKind> {
        self.overlays.get(id.0)
    }

    fn push(&mut self, kind: OverlayKind) -> OverlayId {
        self.overlays.push(kind);
        OverlayId(self.overlays.len() - 1)
    }
}

impl MapBackend for MemoryBackend {
    type Container = Surface;
    type Canvas = MemoryCanvas;
    type Overlay = OverlayId;

    fn container_ready(&self, container: &Surface) -> bool {
        container.attached
    }

    fn create_canvas(&mut self, container: &Surface, view: &MapView) -> Result<MemoryCanvas, MapError> {
        self.stats.canvases_created += 1;
        Ok(MemoryCanvas {
            serial: self.stats.canvases_created,
            surface: container.name.clone(),
            view: *view,
            tiles: Vec::new(),
            attached: BTreeSet::new(),
        })
    }

    fn add_tile_backdrop(&mut self, canvas: &mut MemoryCanvas, tiles: &TileSource) {
        self.stats.tile_backdrops += 1;
        canvas.tiles.push(tiles.clone());
    }

    fn build_heat_overlay(&mut self, points: &[WeightedPoint], style: &HeatStyle) -> OverlayId {
        self.push(OverlayKind::Heat { samples: points.len(), style: style.clone() })
    }

    fn build_rectangle_overlay(&mut self, bounds: &Bounds, style: &RectStyle) -> OverlayId {
        self.push(OverlayKind::Rectangle { bounds: *bounds, style: *style })
    }

    fn attach(&mut self, canvas: &mut MemoryCanvas, overlay: &OverlayId) {
        self.stats.attaches += 1;
        canvas.attached.insert(*overlay);
    }

    fn detach(&mut self, canvas: &mut MemoryCanvas, overlay: &OverlayId) {
        self.stats.detaches += 1;
        canvas.attached.remove(overlay);
    }

    fn is_attached(&self, canvas: &MemoryCanvas, overlay: &OverlayId) -> bool {
        canvas.attached.contains(overlay)
    }

    fn destroy_canvas(&mut self, canvas: MemoryCanvas) {
        self.stats.canvases_destroyed += 1;
        self.overlays.clear();
        tracing::debug!("Destroyed in-memory canvas #{} on '{}'", canvas.serial, canvas.surface);
    }
}
