use std::sync::mpsc::Receiver;
use std::time::Instant;

use eframe::egui;

use crate::api::ApiClient;
use crate::gui::jobs::{Event, Jobs};
use crate::gui::views::MapState;
use crate::state::{AdminState, DeleteTarget, Filters, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Map,
    Admin,
}

/// Top-level application. Owns the shared store, the admin state and the
/// background job fan-out; `update` is the only place events are applied.
pub struct ViewerApp {
    api: ApiClient,
    jobs: Jobs,
    events: Receiver<Event>,

    pub store: Store,
    pub admin: AdminState,
    pub view: View,

    // Raw text of the filter inputs; committed through Filters::coerce_*
    pub limit_input: String,
    pub hours_input: String,

    pub map: MapState,
    admin_visited: bool,
}

impl ViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        api: ApiClient,
        handle: tokio::runtime::Handle,
    ) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let (jobs, events) = Jobs::new(handle);
        let filters = Filters::default();
        let mut app = Self {
            api,
            jobs,
            events,
            store: Store::new(),
            admin: AdminState::new(),
            view: View::Map,
            limit_input: filters.limit.to_string(),
            hours_input: filters.hours.to_string(),
            map: MapState::new(&cc.egui_ctx),
            admin_visited: false,
        };
        app.refresh(&cc.egui_ctx);
        app
    }

    /// Re-fetch everything the map view depends on
    pub fn refresh(&mut self, ctx: &egui::Context) {
        self.load_locations(ctx);
        self.load_machines(ctx);
        self.load_stats(ctx);
    }

    pub fn load_locations(&mut self, ctx: &egui::Context) {
        let (seq, query) = self.store.begin_location_load();
        let api = self.api.clone();
        self.jobs.spawn(ctx, async move {
            let result = api.locations(&query).await.map_err(|e| e.to_string());
            Event::Locations { seq, result }
        });
    }

    pub fn load_machines(&mut self, ctx: &egui::Context) {
        let seq = self.store.begin_machines_load();
        let api = self.api.clone();
        self.jobs.spawn(ctx, async move {
            let result = api.list_machines().await.map_err(|e| e.to_string());
            Event::Machines { seq, result }
        });
    }

    pub fn load_stats(&mut self, ctx: &egui::Context) {
        let seq = self.store.begin_stats_load();
        let api = self.api.clone();
        self.jobs.spawn(ctx, async move {
            let result = api.stats().await.map_err(|e| e.to_string());
            Event::Stats { seq, result }
        });
    }

    pub fn load_admin_machines(&mut self, ctx: &egui::Context) {
        let seq = self.admin.begin_machines_load();
        let api = self.api.clone();
        self.jobs.spawn(ctx, async move {
            let result = api.list_machines().await.map_err(|e| e.to_string());
            Event::AdminMachines { seq, result }
        });
    }

    pub fn load_database_info(&mut self, ctx: &egui::Context) {
        let seq = self.admin.begin_info_load();
        let api = self.api.clone();
        self.jobs.spawn(ctx, async move {
            let result = api.database_info().await.map_err(|e| e.to_string());
            Event::DatabaseInfo { seq, result }
        });
    }

    pub fn start_delete(&mut self, ctx: &egui::Context, target: DeleteTarget) {
        let api = self.api.clone();
        self.jobs.spawn(ctx, async move {
            let result = match &target {
                DeleteTarget::All => api.clear_all().await,
                DeleteTarget::Machine(name) => api.clear_machine(name).await,
            }
            .map_err(|e| e.to_string());
            Event::Cleared { result }
        });
    }

    fn apply_event(&mut self, ctx: &egui::Context, event: Event) {
        match event {
            Event::Locations { seq, result } => self.store.finish_location_load(seq, result),
            Event::Machines { seq, result } => self.store.finish_machines_load(seq, result),
            Event::Stats { seq, result } => self.store.finish_stats_load(seq, result),
            Event::AdminMachines { seq, result } => {
                self.admin.finish_machines_load(seq, result)
            }
            Event::DatabaseInfo { seq, result } => self.admin.finish_info_load(seq, result),
            Event::Cleared { result } => {
                if self.admin.finish_delete(result) {
                    // The working set changed underneath both views
                    self.load_admin_machines(ctx);
                    self.load_database_info(ctx);
                    self.refresh(ctx);
                }
            }
        }
    }

    fn switch_to(&mut self, ctx: &egui::Context, view: View) {
        self.view = view;
        if view == View::Admin && !self.admin_visited {
            self.admin_visited = true;
            self.load_admin_machines(ctx);
            self.load_database_info(ctx);
        }
    }

    fn render_nav_button(&mut self, ui: &mut egui::Ui, icon: &str, view: View, tooltip: &str) {
        let active = self.view == view;
        let text = egui::RichText::new(icon).size(22.0);
        let text = if active {
            text.color(egui::Color32::from_rgb(100, 180, 255))
        } else {
            text
        };
        if ui
            .add(egui::Button::new(text).frame(false))
            .on_hover_text(tooltip)
            .clicked()
        {
            let ctx = ui.ctx().clone();
            self.switch_to(&ctx, view);
        }
        ui.add_space(8.0);
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(ctx, event);
        }

        self.admin.expire_notice(Instant::now());
        if self.admin.notice.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(500));
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "{} Location Tracker",
                        egui_phosphor::regular::MAP_TRIFOLD
                    ))
                    .size(16.0)
                    .strong(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let scope = if self.store.selected_machine.is_empty() {
                        format!("All machines · {} shown", self.store.locations.len())
                    } else {
                        format!(
                            "{} · {} shown",
                            self.store.selected_machine,
                            self.store.locations.len()
                        )
                    };
                    ui.label(egui::RichText::new(scope).size(12.0).weak());
                });
            });
        });

        egui::SidePanel::left("nav_panel")
            .exact_width(44.0)
            .resizable(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(10.0);
                    self.render_nav_button(
                        ui,
                        egui_phosphor::regular::MAP_TRIFOLD,
                        View::Map,
                        "Map",
                    );
                    self.render_nav_button(
                        ui,
                        egui_phosphor::regular::DATABASE,
                        View::Admin,
                        "Administration",
                    );
                });
            });

        match self.view {
            View::Map => {
                egui::SidePanel::left("sidebar")
                    .default_width(300.0)
                    .show(ctx, |ui| self.render_sidebar(ctx, ui));
                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE)
                    .show(ctx, |ui| self.render_map_view(ui));
            }
            View::Admin => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        self.render_admin_view(ctx, ui);
                    });
                });
            }
        }
    }
}
