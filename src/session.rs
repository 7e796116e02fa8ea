//! Canvas lifecycle - one canvas and its layer registry per session
//!
//! The canvas and the registry are created together on the first successful
//! mount and dropped together on unmount. Everything else in the session goes
//! through [`MapSession::apply_selection`], which does nothing while no
//! canvas is live.

use crate::backend::MapBackend;
use crate::config::DashboardConfig;
use crate::error::MapError;
use crate::layers::{self, ActiveSelection, LayerId, LayerRegistry};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::sampler;

/// Result of a mount request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// Canvas created, backdrop installed, layers built
    Initialized,
    /// A canvas is already live; nothing was done
    AlreadyMounted,
    /// Container not on a display surface yet; retry later
    Deferred,
}

struct Mounted<B: MapBackend> {
    canvas: B::Canvas,
    registry: LayerRegistry<B::Overlay>,
}

pub struct MapSession<B: MapBackend> {
    backend: B,
    config: DashboardConfig,
    mounted: Option<Mounted<B>>,
}

impl<B: MapBackend> MapSession<B> {
    pub fn new(backend: B, config: DashboardConfig) -> Self {
        Self {
            backend,
            config,
            mounted: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn canvas(&self) -> Option<&B::Canvas> {
        self.mounted.as_ref().map(|m| &m.canvas)
    }

    pub fn canvas_mut(&mut self) -> Option<&mut B::Canvas> {
        self.mounted.as_mut().map(|m| &mut m.canvas)
    }

    pub fn registry(&self) -> Option<&LayerRegistry<B::Overlay>> {
        self.mounted.as_ref().map(|m| &m.registry)
    }

    /// Create the canvas on `container` unless one is already live.
    ///
    /// A missing or not-yet-attached container defers initialization.
    pub fn mount(&mut self, container: Option<&B::Container>) -> Result<MountOutcome, MapError> {
        if self.mounted.is_some() {
            tracing::debug!("Canvas already mounted, skipping initialization");
            return Ok(MountOutcome::AlreadyMounted);
        }
        let Some(container) = container.filter(|c| self.backend.container_ready(c)) else {
            tracing::debug!("Container not ready, deferring mount");
            return Ok(MountOutcome::Deferred);
        };

        // Sample before touching the backend so a bad radius leaves nothing behind
        let datasets = self
            .config
            .layers
            .try_map(|_, l| sampler::generate(l.center, l.radius_m, l.count))?;

        let mut canvas = self.backend.create_canvas(container, &self.config.view)?;
        self.backend.add_tile_backdrop(&mut canvas, &self.config.tiles);
        let registry = layers::build(&mut self.backend, &datasets, &self.config.styles());

        tracing::info!(
            "Canvas mounted at ({:.4}, {:.4}) zoom {} with {} layers",
            self.config.view.center.lat,
            self.config.view.center.lon,
            self.config.view.zoom,
            registry.len()
        );
        self.mounted = Some(Mounted { canvas, registry });
        Ok(MountOutcome::Initialized)
    }

    /// Destroy the canvas and its overlays; safe to call when nothing is mounted
    pub fn unmount(&mut self) {
        if let Some(Mounted { canvas, registry }) = self.mounted.take() {
            drop(registry);
            self.backend.destroy_canvas(canvas);
            tracing::info!("Canvas unmounted");
        }
    }

    /// Reconcile the attached overlays with `selection`
    pub fn apply_selection(&mut self, selection: &ActiveSelection) -> ReconcileReport {
        match self.mounted.as_mut() {
            Some(m) => reconcile(&mut self.backend, &m.registry, Some(&mut m.canvas), selection),
            None => {
                tracing::debug!("No canvas mounted, selection change dropped");
                ReconcileReport::default()
            }
        }
    }

    /// Whether the overlay for `id` is on the live canvas
    pub fn is_attached(&self, id: LayerId) -> bool {
        self.mounted.as_ref().is_some_and(|m| {
            m.registry
                .get(id)
                .is_some_and(|o| self.backend.is_attached(&m.canvas, o))
        })
    }

    /// Currently attached layers, in registry order
    pub fn attached_layers(&self) -> Vec<LayerId> {
        LayerId::ALL
            .into_iter()
            .filter(|id| self.is_attached(*id))
            .collect()
    }
}

impl<B: MapBackend> Drop for MapSession<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}
