//! Active-layer reconciliation
//!
//! Brings the set of overlays attached to a canvas in line with the caller's
//! selection, touching only the layers whose presence has to change.

use crate::backend::MapBackend;
use crate::layers::{ActiveSelection, LayerId, LayerRegistry};

/// What a reconcile pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub attached: Vec<LayerId>,
    pub detached: Vec<LayerId>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

/// Attach selected overlays that are missing and detach unselected ones
/// that are present. Without a canvas this does nothing; the selection is not
/// remembered.
pub fn reconcile<B: MapBackend>(
    backend: &mut B,
    registry: &LayerRegistry<B::Overlay>,
    canvas: Option<&mut B::Canvas>,
    selection: &ActiveSelection,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let Some(canvas) = canvas else {
        tracing::debug!("No canvas mounted, selection change dropped");
        return report;
    };

    for unknown in selection.unknown() {
        tracing::warn!("Ignoring unknown layer '{}' in selection", unknown);
    }

    for (id, overlay) in registry.iter() {
        let present = backend.is_attached(canvas, overlay);
        if selection.contains(id) {
            if !present {
                backend.attach(canvas, overlay);
                report.attached.push(id);
            }
        } else if present {
            backend.detach(canvas, overlay);
            report.detached.push(id);
        }
    }

    if !report.is_noop() {
        tracing::debug!(
            "Reconciled layers: attached {:?}, detached {:?}",
            report.attached,
            report.detached
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MapView;
    use crate::config::DashboardConfig;
    use crate::layers::{self, HeatSet};
    use crate::memory::{MemoryBackend, MemoryCanvas, OverlayId, Surface};
    use crate::sampler::{self, ThematicDataset};

    fn setup() -> (MemoryBackend, LayerRegistry<OverlayId>, MemoryCanvas) {
        let cfg = DashboardConfig::default();
        let mut backend = MemoryBackend::new();
        let canvas = backend
            .create_canvas(&Surface::attached("map"), &cfg.view)
            .unwrap();
        let datasets: HeatSet<ThematicDataset> = cfg
            .layers
            .try_map(|_, l| sampler::generate(l.center, l.radius_m, 5))
            .unwrap();
        let registry = layers::build(&mut backend, &datasets, &cfg.styles());
        (backend, registry, canvas)
    }

    fn attached(backend: &MemoryBackend, registry: &LayerRegistry<OverlayId>, canvas: &MemoryCanvas) -> Vec<LayerId> {
        registry
            .iter()
            .filter(|(_, o)| backend.is_attached(canvas, o))
            .map(|(id, _)| id)
            .collect()
    }

    #[test]
    fn test_selection_matches_attached_state() {
        let (mut backend, registry, mut canvas) = setup();
        let sel = ActiveSelection::parse_list("poluicao,calor");
        reconcile(&mut backend, &registry, Some(&mut canvas), &sel);

        for (id, overlay) in registry.iter() {
            assert_eq!(backend.is_attached(&canvas, overlay), sel.contains(id), "{}", id);
        }
        assert_eq!(attached(&backend, &registry, &canvas), vec![LayerId::Poluicao, LayerId::Calor]);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let (mut backend, registry, mut canvas) = setup();
        let sel = ActiveSelection::parse_list("verde,pop");
        let first = reconcile(&mut backend, &registry, Some(&mut canvas), &sel);
        assert_eq!(first.attached.len(), 2);

        let before = backend.stats();
        let second = reconcile(&mut backend, &registry, Some(&mut canvas), &sel);
        assert!(second.is_noop());
        assert_eq!(backend.stats(), before);
    }

    #[test]
    fn test_switching_selection_is_minimal() {
        let (mut backend, registry, mut canvas) = setup();
        reconcile(&mut backend, &registry, Some(&mut canvas), &ActiveSelection::parse_list("poluicao,calor"));
        let report = reconcile(&mut backend, &registry, Some(&mut canvas), &ActiveSelection::parse_list("calor,pop"));

        assert_eq!(report.attached, vec![LayerId::Pop]);
        assert_eq!(report.detached, vec![LayerId::Poluicao]);
        assert_eq!(backend.stats().attaches, 3);
        assert_eq!(backend.stats().detaches, 1);
    }

    #[test]
    fn test_empty_selection_hides_everything() {
        let (mut backend, registry, mut canvas) = setup();
        reconcile(&mut backend, &registry, Some(&mut canvas), &ActiveSelection::parse_list("poluicao,calor,verde,pop"));
        assert_eq!(canvas.attached_count(), 4);

        let report = reconcile(&mut backend, &registry, Some(&mut canvas), &ActiveSelection::new());
        assert_eq!(report.detached.len(), 4);
        assert_eq!(canvas.attached_count(), 0);
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let (mut backend, registry, mut canvas) = setup();
        let sel = ActiveSelection::parse_list("satellite,calor");
        let report = reconcile(&mut backend, &registry, Some(&mut canvas), &sel);

        assert_eq!(report.attached, vec![LayerId::Calor]);
        assert!(report.detached.is_empty());
        assert_eq!(canvas.attached_count(), 1);
    }

    #[test]
    fn test_no_canvas_is_noop() {
        let (mut backend, registry, _canvas) = setup();
        let before = backend.stats();
        let report = reconcile(&mut backend, &registry, None, &ActiveSelection::parse_list("calor"));

        assert!(report.is_noop());
        assert_eq!(backend.stats(), before);
    }

    #[test]
    fn test_view_is_untouched() {
        let (mut backend, registry, mut canvas) = setup();
        let view: MapView = canvas.view;
        reconcile(&mut backend, &registry, Some(&mut canvas), &ActiveSelection::parse_list("pop"));
        assert_eq!(canvas.view, view);
    }
}
