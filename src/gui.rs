//! Native dashboard using egui
//!
//! Map canvas in the central panel; layer toggles, region statistics and
//! critical areas in a side panel. The canvas
//! is drawn by [`EguiBackend`], an immediate-mode implementation of the
//! backend capability: overlays live in an arena and each frame paints the
//! ones attached to the live canvas.

use eframe::egui;
use tracing::{debug, info, warn};

use crate::backend::{MapBackend, MapView, TileSource};
use crate::config::DashboardConfig;
use crate::error::MapError;
use crate::geo::{self, Bounds, Coordinate, WeightedPoint};
use crate::layers::{ActiveSelection, LayerId};
use crate::session::{MapSession, MountOutcome};
use crate::style::{Color, HeatStyle, RectStyle};

/// Run the native dashboard
pub fn run_viewer(config: DashboardConfig, selection: ActiveSelection) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Urban Map"),
        ..Default::default()
    };

    eframe::run_native(
        "Urban Map",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config, selection)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

/// Screen area the canvas is laid out in; empty until the panel has a size
#[derive(Debug, Clone, Copy)]
pub struct PanelRect(pub egui::Rect);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayId(usize);

enum Drawable {
    Heat { points: Vec<WeightedPoint>, style: HeatStyle },
    Rectangle { bounds: Bounds, style: RectStyle },
}

pub struct EguiCanvas {
    home: MapView,
    view: MapView,
    tiles: Option<TileSource>,
    attached: Vec<OverlayId>,
}

impl EguiCanvas {
    fn max_zoom(&self) -> f64 {
        self.tiles.as_ref().map(|t| t.max_zoom as f64).unwrap_or(20.0)
    }

    fn zoom_by(&mut self, steps: f64) {
        let max = self.max_zoom().max(1.0);
        self.view.zoom = (self.view.zoom + steps).clamp(1.0, max);
    }

    /// Move the view center by a screen-space delta
    fn pan(&mut self, delta: egui::Vec2) {
        let c = geo::project(&self.view.center, self.view.zoom);
        self.view.center = geo::unproject([c[0] - delta.x as f64, c[1] - delta.y as f64], self.view.zoom);
    }

    fn reset(&mut self) {
        self.view = self.home;
    }

    fn to_screen(&self, rect: egui::Rect, c: &Coordinate) -> egui::Pos2 {
        let origin = geo::project(&self.view.center, self.view.zoom);
        let p = geo::project(c, self.view.zoom);
        rect.center() + egui::vec2((p[0] - origin[0]) as f32, (p[1] - origin[1]) as f32)
    }
}

#[derive(Default)]
pub struct EguiBackend {
    overlays: Vec<Drawable>,
}

impl EguiBackend {
    fn push(&mut self, d: Drawable) -> OverlayId {
        self.overlays.push(d);
        OverlayId(self.overlays.len() - 1)
    }

    /// Paint backdrop and attached overlays, in attach order
    pub fn paint(&self, canvas: &EguiCanvas, painter: &egui::Painter, rect: egui::Rect) {
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(242, 240, 236));

        for id in &canvas.attached {
            match self.overlays.get(id.0) {
                Some(Drawable::Heat { points, style }) => paint_heat(canvas, painter, rect, points, style),
                Some(Drawable::Rectangle { bounds, style }) => paint_rect(canvas, painter, rect, bounds, style),
                None => warn!("Attached overlay {:?} missing from arena", id),
            }
        }

        if let Some(tiles) = &canvas.tiles {
            painter.text(
                rect.right_bottom() - egui::vec2(6.0, 4.0),
                egui::Align2::RIGHT_BOTTOM,
                &tiles.attribution,
                egui::FontId::proportional(11.0),
                egui::Color32::from_gray(90),
            );
        }
    }
}

fn color32(c: Color, alpha: f32) -> egui::Color32 {
    let a = (c.a as f32 * alpha.clamp(0.0, 1.0)).round() as u8;
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, a)
}

fn paint_heat(canvas: &EguiCanvas, painter: &egui::Painter, rect: egui::Rect, points: &[WeightedPoint], style: &HeatStyle) {
    for p in points {
        let pos = canvas.to_screen(rect, &p.coordinate());
        let outer = style.radius + style.blur;
        if !rect.expand(outer).contains(pos) {
            continue;
        }
        let color = style.gradient.sample(p.weight);
        let w = p.weight as f32;
        // Blur halo first, then the core
        painter.circle_filled(pos, outer, color32(color, 0.08 * w));
        painter.circle_filled(pos, style.radius, color32(color, 0.18 * w));
    }
}

fn paint_rect(canvas: &EguiCanvas, painter: &egui::Painter, rect: egui::Rect, bounds: &Bounds, style: &RectStyle) {
    let a = canvas.to_screen(rect, &bounds.south_west());
    let b = canvas.to_screen(rect, &bounds.north_east());
    let area = egui::Rect::from_two_pos(a, b);
    painter.rect_filled(area, 0.0, color32(style.color, style.fill_opacity));
    if style.weight > 0.0 {
        painter.rect_stroke(area, 0.0, egui::Stroke::new(style.weight, color32(style.color, 1.0)));
    }
}

impl MapBackend for EguiBackend {
    type Container = PanelRect;
    type Canvas = EguiCanvas;
    type Overlay = OverlayId;

    fn container_ready(&self, container: &PanelRect) -> bool {
        container.0.width() > 0.0 && container.0.height() > 0.0
    }

    fn create_canvas(&mut self, container: &PanelRect, view: &MapView) -> Result<EguiCanvas, MapError> {
        debug!("Creating canvas in {:?}", container.0);
        Ok(EguiCanvas {
            home: *view,
            view: *view,
            tiles: None,
            attached: Vec::new(),
        })
    }

    fn add_tile_backdrop(&mut self, canvas: &mut EguiCanvas, tiles: &TileSource) {
        debug!("Tile backdrop {} (max zoom {})", tiles.url_template, tiles.max_zoom);
        canvas.tiles = Some(tiles.clone());
    }

    fn build_heat_overlay(&mut self, points: &[WeightedPoint], style: &HeatStyle) -> OverlayId {
        self.push(Drawable::Heat { points: points.to_vec(), style: style.clone() })
    }

    fn build_rectangle_overlay(&mut self, bounds: &Bounds, style: &RectStyle) -> OverlayId {
        self.push(Drawable::Rectangle { bounds: *bounds, style: *style })
    }

    fn attach(&mut self, canvas: &mut EguiCanvas, overlay: &OverlayId) {
        canvas.attached.push(*overlay);
    }

    fn detach(&mut self, canvas: &mut EguiCanvas, overlay: &OverlayId) {
        canvas.attached.retain(|o| o != overlay);
    }

    fn is_attached(&self, canvas: &EguiCanvas, overlay: &OverlayId) -> bool {
        canvas.attached.contains(overlay)
    }

    fn destroy_canvas(&mut self, canvas: EguiCanvas) {
        // Overlays belong to the registry of this canvas only
        self.overlays.clear();
        debug!("Canvas destroyed with {} overlays attached", canvas.attached.len());
    }
}

struct DashboardApp {
    session: MapSession<EguiBackend>,
    selection: ActiveSelection,
}

impl DashboardApp {
    fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig, selection: ActiveSelection) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Self {
            session: MapSession::new(EguiBackend::default(), config),
            selection,
        }
    }

    fn layer_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Camadas de Dados");
        ui.separator();

        let mut changed = false;
        for id in LayerId::ALL {
            let mut checked = self.selection.contains(id);
            ui.horizontal(|ui| {
                ui.colored_label(self.swatch(id), "●");
                if ui.checkbox(&mut checked, id.title()).changed() {
                    if checked {
                        self.selection.insert(id);
                    } else {
                        self.selection.remove(id.as_str());
                    }
                    changed = true;
                }
            });
            ui.label(egui::RichText::new(id.description()).small().weak());
            ui.add_space(6.0);
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Show all").clicked() {
                self.selection = LayerId::ALL.into_iter().collect();
                changed = true;
            }
            if ui.button("Hide all").clicked() {
                self.selection = ActiveSelection::new();
                changed = true;
            }
        });
        if ui.button("Reset view").clicked() {
            if let Some(canvas) = self.session.canvas_mut() {
                canvas.reset();
            }
        }

        if changed {
            let report = self.session.apply_selection(&self.selection);
            info!("Selection changed: +{:?} -{:?}", report.attached, report.detached);
        }

        ui.separator();
        ui.label(format!("{} layers visible", self.session.attached_layers().len()));
    }

    /// "Estatísticas da Região" cards and the critical areas list
    fn region_panel(&self, ui: &mut egui::Ui) {
        let panels = &self.session.config().panels;

        ui.heading("Estatísticas da Região");
        ui.label(egui::RichText::new(&panels.region).weak());
        for card in &panels.stats {
            let lit = card.highlighted(&self.selection);
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.colored_label(color32(card.color, 1.0), "■");
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new(&card.label).small().weak());
                        let value = egui::RichText::new(&card.value).strong();
                        ui.label(if lit { value.color(color32(card.color, 1.0)) } else { value });
                    });
                });
            });
        }

        ui.add_space(8.0);
        ui.heading("Áreas Críticas");
        for area in panels.areas_by_priority() {
            egui::Frame::group(ui.style())
                .stroke(egui::Stroke::new(2.0, color32(area.accent, 1.0)))
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(egui::RichText::new(&area.name).strong());
                    ui.label(egui::RichText::new(&area.summary).small().weak());
                    ui.colored_label(color32(area.accent, 1.0), area.priority.label());
                });
        }
    }

    /// Legend color: top gradient stop for heat layers, fill for the green area
    fn swatch(&self, id: LayerId) -> egui::Color32 {
        let config = self.session.config();
        let color = match config.layers.get(id) {
            Some(layer) => layer.style.gradient.stops().last().map(|s| s.color),
            None => Some(config.green.style.color),
        };
        color.map(|c| color32(c, 1.0)).unwrap_or(egui::Color32::GRAY)
    }

    fn map_panel(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        // Mount is retried every frame until the panel has a size
        match self.session.mount(Some(&PanelRect(rect))) {
            Ok(MountOutcome::Initialized) => {
                self.session.apply_selection(&self.selection);
            }
            Ok(_) => {}
            Err(e) => {
                crate::log_map_error!("mount", e);
                return;
            }
        }

        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if let Some(canvas) = self.session.canvas_mut() {
            if response.dragged() {
                canvas.pan(response.drag_delta());
            }
            if response.hovered() && scroll != 0.0 {
                canvas.zoom_by(if scroll > 0.0 { 0.25 } else { -0.25 });
            }
            if response.double_clicked() {
                canvas.reset();
            }
        }

        if let Some(canvas) = self.session.canvas() {
            let painter = ui.painter_at(rect);
            self.session.backend().paint(canvas, &painter, rect);
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::right("layers_panel").min_width(280.0).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.layer_panel(ui);
                ui.separator();
                self.region_panel(ui);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Drag: pan | Scroll: zoom | Double-click: reset");
                if let Some(canvas) = self.session.canvas() {
                    ui.label(format!(
                        "| ({:.4}, {:.4}) z{:.2}",
                        canvas.view.center.lat, canvas.view.center.lon, canvas.view.zoom
                    ));
                }
            });
            self.map_panel(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MapView {
        DashboardConfig::default().view
    }

    #[test]
    fn test_empty_panel_is_not_ready() {
        let backend = EguiBackend::default();
        assert!(!backend.container_ready(&PanelRect(egui::Rect::NOTHING)));
        let r = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0));
        assert!(backend.container_ready(&PanelRect(r)));
    }

    #[test]
    fn test_center_projects_to_panel_center() {
        let mut backend = EguiBackend::default();
        let r = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(800.0, 600.0));
        let canvas = backend.create_canvas(&PanelRect(r), &view()).unwrap();
        let p = canvas.to_screen(r, &view().center);
        assert!((p - r.center()).length() < 1e-3);
    }

    #[test]
    fn test_pan_and_reset() {
        let mut backend = EguiBackend::default();
        let r = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(400.0, 400.0));
        let mut canvas = backend.create_canvas(&PanelRect(r), &view()).unwrap();
        canvas.pan(egui::vec2(100.0, 0.0));
        assert!(canvas.view.center.lon < view().center.lon);
        canvas.zoom_by(100.0);
        assert_eq!(canvas.view.zoom, 20.0);
        canvas.reset();
        assert_eq!(canvas.view, view());
    }

    #[test]
    fn test_zoom_with_single_level_tiles() {
        let mut backend = EguiBackend::default();
        let r = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(400.0, 400.0));
        let home = MapView { zoom: 0.0, ..view() };
        let mut canvas = backend.create_canvas(&PanelRect(r), &home).unwrap();
        let mut tiles = DashboardConfig::default().tiles;
        tiles.max_zoom = 0;
        backend.add_tile_backdrop(&mut canvas, &tiles);

        canvas.zoom_by(0.25);
        assert_eq!(canvas.view.zoom, 1.0);
        canvas.zoom_by(-3.0);
        assert_eq!(canvas.view.zoom, 1.0);
    }

    #[test]
    fn test_destroy_releases_overlays() {
        let mut session = MapSession::new(EguiBackend::default(), DashboardConfig::default());
        let r = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(400.0, 400.0));
        session.mount(Some(&PanelRect(r))).unwrap();
        assert_eq!(session.backend().overlays.len(), 4);
        session.apply_selection(&ActiveSelection::parse_list("calor,verde"));
        assert_eq!(session.attached_layers(), vec![LayerId::Calor, LayerId::Verde]);

        session.unmount();
        assert!(session.backend().overlays.is_empty());
    }
}
