use chrono::Utc;
use egui::{Color32, RichText, ScrollArea, TextEdit, Ui};

use crate::gui::app::ViewerApp;
use crate::models::{AgeTier, Location};
use crate::state::{FilterPatch, Filters};
use crate::utils::{format_time_ago, format_timestamp};

const ERROR_RED: Color32 = Color32::from_rgb(244, 67, 54);
const ACCENT_BLUE: Color32 = Color32::from_rgb(100, 180, 255);

impl ViewerApp {
    pub fn render_sidebar(&mut self, ctx: &egui::Context, ui: &mut Ui) {
        let now = Utc::now();
        let mut refresh = false;
        let mut reload = false;
        let mut pick_machine: Option<String> = None;
        let mut pick_location: Option<Location> = None;

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.heading("Locations");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .button(egui_phosphor::regular::ARROWS_CLOCKWISE)
                    .on_hover_text("Refresh locations, machines and stats")
                    .clicked()
                {
                    refresh = true;
                }
                if self.store.loading {
                    ui.add(egui::Spinner::new().size(14.0));
                }
            });
        });

        if let Some(error) = &self.store.error {
            ui.colored_label(ERROR_RED, format!("{} {error}", egui_phosphor::regular::WARNING));
        }

        ui.separator();

        // Filter inputs commit on Enter or focus loss, never per keystroke
        ui.horizontal(|ui| {
            ui.label("Limit");
            let resp = ui.add(TextEdit::singleline(&mut self.limit_input).desired_width(56.0));
            if resp.lost_focus() {
                let value = Filters::coerce_limit(&self.limit_input, self.store.filters.limit);
                self.limit_input = value.to_string();
                if self.store.apply_filters(FilterPatch {
                    limit: Some(value),
                    hours: None,
                }) {
                    reload = true;
                }
            }

            ui.label("Hours");
            let resp = ui.add(TextEdit::singleline(&mut self.hours_input).desired_width(48.0));
            if resp.lost_focus() {
                let value = Filters::coerce_hours(&self.hours_input, self.store.filters.hours);
                self.hours_input = value.to_string();
                if self.store.apply_filters(FilterPatch {
                    limit: None,
                    hours: Some(value),
                }) {
                    reload = true;
                }
            }
        });
        if self.store.selected_machine.is_empty() {
            ui.label(
                RichText::new("Hours apply once a machine is selected")
                    .size(10.0)
                    .color(Color32::GRAY),
            );
        }

        if let Some(stats) = &self.store.stats {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!(
                        "{} {} locations",
                        egui_phosphor::regular::MAP_PIN,
                        stats.total_locations
                    ))
                    .size(11.0),
                );
                ui.label(
                    RichText::new(format!(
                        "{} {} machines",
                        egui_phosphor::regular::DESKTOP,
                        stats.unique_machines
                    ))
                    .size(11.0),
                );
            });
        }

        ui.separator();

        ui.horizontal(|ui| {
            ui.label(RichText::new("MACHINES").size(11.0).strong());
            if !self.store.selected_machine.is_empty() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("View all").clicked() {
                        pick_machine = Some(String::new());
                    }
                });
            }
        });

        ScrollArea::vertical()
            .id_salt("machine_list")
            .max_height(180.0)
            .show(ui, |ui| {
                if self.store.machines.is_empty() {
                    ui.label(RichText::new("No machines reported yet").color(Color32::GRAY));
                }
                for machine in &self.store.machines {
                    let selected = self.store.selected_machine == machine.machine_name;
                    ui.horizontal(|ui| {
                        let label = ui.selectable_label(
                            selected,
                            RichText::new(&machine.machine_name).monospace(),
                        );
                        let tier = machine
                            .last_seen_at()
                            .map(|t| AgeTier::classify(t, now))
                            .unwrap_or(AgeTier::Stale);
                        let (r, g, b) = tier.rgb();
                        ui.label(
                            RichText::new(format!("{}", machine.count))
                                .size(10.0)
                                .color(Color32::from_rgb(r, g, b)),
                        );
                        ui.label(
                            RichText::new(format_time_ago(machine.last_seen_at(), now))
                                .size(10.0)
                                .color(Color32::GRAY),
                        );
                        if label.clicked() {
                            // Clicking the selected machine again deselects it
                            pick_machine = Some(if selected {
                                String::new()
                            } else {
                                machine.machine_name.clone()
                            });
                        }
                    });
                }
            });

        ui.separator();
        let scope = if self.store.selected_machine.is_empty() {
            "RECENT LOCATIONS".to_string()
        } else {
            format!("LOCATIONS · {}", self.store.selected_machine)
        };
        ui.label(RichText::new(scope).size(11.0).strong());

        ScrollArea::vertical()
            .id_salt("location_list")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                if self.store.locations.is_empty() && !self.store.loading {
                    let empty = if self.store.selected_machine.is_empty() {
                        "No locations reported yet".to_string()
                    } else {
                        format!(
                            "No locations for {} in the last {}h",
                            self.store.selected_machine, self.store.filters.hours
                        )
                    };
                    ui.label(RichText::new(empty).color(Color32::GRAY));
                }
                for loc in &self.store.locations {
                    let selected = self
                        .store
                        .selected_location
                        .as_ref()
                        .is_some_and(|s| s.id == loc.id);
                    let (r, g, b) = loc.age_tier(now).rgb();
                    let place = match (&loc.city, &loc.country) {
                        (Some(city), Some(country)) => format!("{city}, {country}"),
                        (Some(city), None) => city.clone(),
                        (None, Some(country)) => country.clone(),
                        (None, None) => "unknown place".to_string(),
                    };

                    let response = ui.selectable_label(
                        selected,
                        format!(
                            "{} {}  ·  {}\n{}  ·  {:.4}, {:.4}",
                            egui_phosphor::regular::MAP_PIN,
                            loc.machine_name,
                            format_time_ago(loc.recorded_at(), now),
                            place,
                            loc.latitude,
                            loc.longitude
                        ),
                    );
                    let painter = ui.painter();
                    let dot = egui::pos2(
                        response.rect.right() - 8.0,
                        response.rect.center().y,
                    );
                    painter.circle_filled(dot, 4.0, Color32::from_rgb(r, g, b));

                    if response.clicked() {
                        pick_location = Some(loc.clone());
                    }
                }
            });

        if let Some(selected) = &self.store.selected_location {
            ui.separator();
            render_location_detail(ui, selected);
        }

        if let Some(name) = pick_machine {
            if self.store.select_machine(name) {
                reload = true;
            }
        }
        if let Some(loc) = pick_location {
            self.store.select_location(loc);
        }
        if refresh {
            self.refresh(ctx);
        } else if reload {
            self.load_locations(ctx);
        }
    }
}

fn render_location_detail(ui: &mut Ui, loc: &Location) {
    let now = Utc::now();
    let recorded = loc.recorded_at();

    ui.label(RichText::new("SELECTED").size(11.0).strong());
    ui.label(
        RichText::new(&loc.machine_name)
            .color(ACCENT_BLUE)
            .strong(),
    );
    if let Some(user) = &loc.user_name {
        ui.label(format!("User: {user}"));
    }
    ui.label(format!(
        "{} ({})",
        format_timestamp(recorded),
        format_time_ago(recorded, now)
    ));
    ui.label(format!("{:.6}, {:.6}", loc.latitude, loc.longitude));
    if let Some(accuracy) = loc.accuracy {
        ui.label(format!("Accuracy: {accuracy}m"));
    }
    if let Some(source) = &loc.location_source {
        ui.label(format!("Source: {source}"));
    }
    if let Some(ip) = &loc.public_ip {
        ui.label(format!("Public IP: {ip}"));
    }
}
