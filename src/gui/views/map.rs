use chrono::{DateTime, Utc};
use egui::{Color32, Response, Stroke, Ui};
use walkers::{
    lat_lon, sources::OpenStreetMap, HttpOptions, HttpTiles, Map, MapMemory, Plugin, Position,
    Projector,
};

use crate::gui::app::ViewerApp;
use crate::models::Location;
use crate::state::Store;
use crate::utils::{format_time_ago, format_timestamp};

// Fallback viewport before any data arrives (Lima)
const DEFAULT_LAT: f64 = -12.0464;
const DEFAULT_LON: f64 = -77.0428;
const DEFAULT_ZOOM: f64 = 10.0;

// Zoom applied when centering tightly on a selected location
const SELECT_ZOOM: f64 = 15.0;

const MARKER_RADIUS: f32 = 6.0;
const SELECTED_RADIUS: f32 = 9.0;
const HIT_SLOP: f32 = 4.0;

/// Tile pipeline plus the viewport bookkeeping for the map widget
pub struct MapState {
    pub tiles: HttpTiles,
    pub memory: MapMemory,
    last_focus: Option<Focus>,
}

/// Fingerprint of what the viewport was last fitted to. The viewport is
/// only re-applied when this changes, so user panning is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Focus {
    Selected(i64),
    Fit(usize, i64, i64),
}

impl MapState {
    pub fn new(ctx: &egui::Context) -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| std::path::PathBuf::from(".cache"))
            .join("locview")
            .join("tiles");

        let http_options = HttpOptions {
            cache: Some(cache_dir),
            ..Default::default()
        };

        let tiles = HttpTiles::with_options(OpenStreetMap, http_options, ctx.clone());
        let mut memory = MapMemory::default();
        memory.center_at(lat_lon(DEFAULT_LAT, DEFAULT_LON));
        if let Err(e) = memory.set_zoom(DEFAULT_ZOOM) {
            tracing::warn!("failed to set default zoom: {e:?}");
        }

        Self {
            tiles,
            memory,
            last_focus: None,
        }
    }

    /// Center on the selection, or fit the whole working set. An empty set
    /// leaves the viewport exactly where it was.
    pub fn apply_viewport(&mut self, locations: &[Location], selected: Option<&Location>) {
        let focus = if let Some(sel) = selected {
            Focus::Selected(sel.id)
        } else if let (Some(first), Some(last)) = (locations.first(), locations.last()) {
            Focus::Fit(locations.len(), first.id, last.id)
        } else {
            return;
        };

        if self.last_focus.as_ref() == Some(&focus) {
            return;
        }

        match (&focus, selected) {
            (Focus::Selected(_), Some(sel)) => {
                self.memory.center_at(lat_lon(sel.latitude, sel.longitude));
                let _ = self.memory.set_zoom(SELECT_ZOOM);
            }
            _ => {
                if let Some((min_lat, max_lat, min_lon, max_lon)) = bounds(locations) {
                    let center =
                        lat_lon((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0);
                    self.memory.center_at(center);
                    let zoom = zoom_for_span(max_lat - min_lat, max_lon - min_lon);
                    let _ = self.memory.set_zoom(zoom);
                }
            }
        }
        self.last_focus = Some(focus);
    }
}

/// Bounding box over all finite coordinates
fn bounds(locations: &[Location]) -> Option<(f64, f64, f64, f64)> {
    let mut bbox: Option<(f64, f64, f64, f64)> = None;
    for loc in locations {
        if !loc.latitude.is_finite() || !loc.longitude.is_finite() {
            continue;
        }
        bbox = Some(match bbox {
            None => (loc.latitude, loc.latitude, loc.longitude, loc.longitude),
            Some((min_lat, max_lat, min_lon, max_lon)) => (
                min_lat.min(loc.latitude),
                max_lat.max(loc.latitude),
                min_lon.min(loc.longitude),
                max_lon.max(loc.longitude),
            ),
        });
    }
    bbox
}

/// Zoom level that contains the given span with fixed padding
fn zoom_for_span(lat_span: f64, lon_span: f64) -> f64 {
    const PADDING: f64 = 1.3;
    let span = lat_span.max(lon_span).max(0.0005) * PADDING;
    (360.0 / span).log2().clamp(2.0, 17.0)
}

impl ViewerApp {
    pub fn render_map_view(&mut self, ui: &mut Ui) {
        let now = Utc::now();
        let panel_rect = ui.max_rect();

        if !self.store.loading {
            self.map
                .apply_viewport(&self.store.locations, self.store.selected_location.as_ref());
        }

        let store = &self.store;
        let map = &mut self.map;
        let mut hovered: Option<Location> = None;
        let mut clicked: Option<Location> = None;
        let fallback: Position = lat_lon(DEFAULT_LAT, DEFAULT_LON);

        ui.add(
            Map::new(Some(&mut map.tiles), &mut map.memory, fallback).with_plugin(MarkerPlugin {
                store,
                now,
                hovered: &mut hovered,
                clicked: &mut clicked,
            }),
        );

        if let Some(loc) = hovered {
            if let Some(hover_pos) = ui.input(|i| i.pointer.hover_pos()) {
                // Offset so the popup does not sit on top of the marker
                egui::Area::new("location_popup".into())
                    .fixed_pos(hover_pos + egui::vec2(15.0, 10.0))
                    .order(egui::Order::Tooltip)
                    .show(ui.ctx(), |ui| {
                        egui::Frame::popup(ui.style()).show(ui, |ui| {
                            render_location_popup(ui, &loc);
                        });
                    });
            }
        }

        if let Some(loc) = clicked {
            self.store.select_location(loc);
        }

        if self.store.loading {
            ui.put(
                egui::Rect::from_center_size(panel_rect.center(), egui::vec2(48.0, 48.0)),
                egui::Spinner::new().size(48.0),
            );
        } else if self.store.locations.is_empty() {
            egui::Window::new("map_empty_state")
                .title_bar(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ui.ctx(), |ui| {
                    ui.label("No locations to show. Select a machine or widen the filters.");
                });
        }
    }
}

/// Draws the location markers on top of the map tiles and reports which
/// marker, if any, is hovered or clicked this frame.
struct MarkerPlugin<'a> {
    store: &'a Store,
    now: DateTime<Utc>,
    hovered: &'a mut Option<Location>,
    clicked: &'a mut Option<Location>,
}

impl Plugin for MarkerPlugin<'_> {
    fn run(self: Box<Self>, ui: &mut Ui, _response: &Response, projector: &Projector) {
        let store = self.store;
        let now = self.now;

        // While loading the markers are suppressed entirely
        if store.loading {
            return;
        }

        let painter = ui.painter();
        let rect = ui.max_rect();
        let hover_pos = ui.input(|i| i.pointer.hover_pos());
        let click_pos = ui.input(|i| {
            if i.pointer.primary_clicked() {
                i.pointer.interact_pos()
            } else {
                None
            }
        });

        let to_screen = |lat: f64, lon: f64| -> egui::Pos2 {
            let projected = projector.project(lat_lon(lat, lon));
            egui::pos2(projected.x, projected.y)
        };

        // Selected marker pulses; keep repainting while one exists
        let pulse = if store.selected_location.is_some() {
            ui.ctx().request_repaint();
            let t = ui.input(|i| i.time);
            ((t * 4.0).sin() as f32) * 1.5
        } else {
            0.0
        };

        for loc in &store.locations {
            if !loc.latitude.is_finite() || !loc.longitude.is_finite() {
                continue;
            }
            let pos = to_screen(loc.latitude, loc.longitude);
            if !rect.contains(pos) {
                continue;
            }

            let is_selected = store
                .selected_location
                .as_ref()
                .is_some_and(|s| s.id == loc.id);
            let radius = if is_selected {
                SELECTED_RADIUS + pulse
            } else {
                MARKER_RADIUS
            };
            let (r, g, b) = loc.age_tier(now).rgb();

            painter.circle_filled(pos, radius, Color32::from_rgb(r, g, b));
            painter.circle_stroke(pos, radius, Stroke::new(2.0, Color32::WHITE));

            let hit_radius = radius + HIT_SLOP;
            if hover_pos.is_some_and(|h| h.distance(pos) <= hit_radius) {
                *self.hovered = Some(loc.clone());
            }
            if click_pos.is_some_and(|c| c.distance(pos) <= hit_radius) {
                *self.clicked = Some(loc.clone());
            }
        }
    }
}

/// Hover popup binding every field of the record, absent ones as "unknown"
fn render_location_popup(ui: &mut Ui, loc: &Location) {
    ui.set_min_width(220.0);

    ui.label(
        egui::RichText::new(&loc.machine_name)
            .color(Color32::from_rgb(100, 180, 255))
            .size(14.0)
            .strong(),
    );
    ui.add_space(2.0);

    let unknown = || "unknown".to_string();
    let now = Utc::now();
    let recorded = loc.recorded_at();

    ui.label(format!(
        "User: {}",
        loc.user_name.clone().unwrap_or_else(unknown)
    ));
    ui.label(format!(
        "Time: {} ({})",
        format_timestamp(recorded),
        format_time_ago(recorded, now)
    ));
    ui.label(format!(
        "Place: {}, {}",
        loc.city.clone().unwrap_or_else(unknown),
        loc.country.clone().unwrap_or_else(unknown)
    ));
    ui.label(format!(
        "Accuracy: {}",
        loc.accuracy
            .map(|a| format!("{a}m"))
            .unwrap_or_else(|| "N/A".to_string())
    ));
    ui.label(format!(
        "Source: {}",
        loc.location_source.clone().unwrap_or_else(unknown)
    ));
    if let Some(ip) = &loc.public_ip {
        ui.label(format!("Public IP: {ip}"));
    }
    ui.label(
        egui::RichText::new(format!("{:.6}, {:.6}", loc.latitude, loc.longitude))
            .color(Color32::GRAY)
            .size(10.0),
    );
}
