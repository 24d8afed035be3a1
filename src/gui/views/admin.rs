use chrono::Utc;
use egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::gui::app::ViewerApp;
use crate::state::Severity;
use crate::utils::format_time_ago;

const DANGER_RED: Color32 = Color32::from_rgb(244, 67, 54);
const DANGER_FILL: Color32 = Color32::from_rgb(176, 0, 32);
const SUCCESS_GREEN: Color32 = Color32::from_rgb(76, 175, 80);

impl ViewerApp {
    pub fn render_admin_view(&mut self, ctx: &egui::Context, ui: &mut Ui) {
        let now = Utc::now();
        let mut refresh_machines = false;
        let mut refresh_info = false;
        let mut open_clear_all = false;
        let mut open_clear_machine: Option<String> = None;

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.heading(format!("{} Administration", egui_phosphor::regular::DATABASE));
            if self.admin.loading {
                ui.add(egui::Spinner::new().size(14.0));
            }
        });
        ui.colored_label(
            DANGER_RED,
            format!(
                "{} Deletes on this page are permanent",
                egui_phosphor::regular::WARNING
            ),
        );
        ui.separator();

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("DATABASE").size(11.0).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .button(egui_phosphor::regular::ARROWS_CLOCKWISE)
                        .on_hover_text("Refresh database info")
                        .clicked()
                    {
                        refresh_info = true;
                    }
                });
            });
            match &self.admin.database_info {
                Some(info) => {
                    egui::Grid::new("database_info_grid")
                        .num_columns(2)
                        .spacing([24.0, 4.0])
                        .show(ui, |ui| {
                            ui.label("File size");
                            ui.label(format!(
                                "{} ({:.2} MB)",
                                info.file.size_human, info.file.size_mb
                            ));
                            ui.end_row();

                            ui.label("Last modified");
                            ui.label(info.file.last_modified.as_deref().unwrap_or("unknown"));
                            ui.end_row();

                            ui.label("Records");
                            ui.label(info.statistics.total_records.to_string());
                            ui.end_row();

                            ui.label("Pages");
                            ui.label(format!(
                                "{} × {} bytes",
                                info.sqlite.page_count, info.sqlite.page_size
                            ));
                            ui.end_row();
                        });
                }
                None => {
                    ui.label(RichText::new("No snapshot loaded yet").color(Color32::GRAY));
                }
            }
        });

        ui.add_space(8.0);

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("MACHINES").size(11.0).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .button(egui_phosphor::regular::ARROWS_CLOCKWISE)
                        .on_hover_text("Refresh machine list")
                        .clicked()
                    {
                        refresh_machines = true;
                    }
                });
            });

            if self.admin.machines.is_empty() {
                ui.label(RichText::new("No machines reported yet").color(Color32::GRAY));
            } else {
                TableBuilder::new(ui)
                    .striped(true)
                    .column(Column::remainder().at_least(140.0))
                    .column(Column::auto().at_least(70.0))
                    .column(Column::auto().at_least(90.0))
                    .column(Column::auto().at_least(40.0))
                    .header(20.0, |mut header| {
                        header.col(|ui| {
                            ui.strong("Machine");
                        });
                        header.col(|ui| {
                            ui.strong("Locations");
                        });
                        header.col(|ui| {
                            ui.strong("Last seen");
                        });
                        header.col(|_ui| {});
                    })
                    .body(|mut body| {
                        for machine in &self.admin.machines {
                            body.row(22.0, |mut row| {
                                row.col(|ui| {
                                    ui.label(RichText::new(&machine.machine_name).monospace());
                                });
                                row.col(|ui| {
                                    ui.label(machine.count.to_string());
                                });
                                row.col(|ui| {
                                    ui.label(format_time_ago(machine.last_seen_at(), now));
                                });
                                row.col(|ui| {
                                    if ui
                                        .button(
                                            RichText::new(egui_phosphor::regular::TRASH)
                                                .color(DANGER_RED),
                                        )
                                        .on_hover_text("Delete this machine's locations")
                                        .clicked()
                                    {
                                        open_clear_machine =
                                            Some(machine.machine_name.clone());
                                    }
                                });
                            });
                        }
                    });
            }
        });

        ui.add_space(8.0);

        ui.group(|ui| {
            ui.label(RichText::new("DANGER ZONE").size(11.0).color(DANGER_RED).strong());
            ui.label("Remove every location record from the database.");
            if ui
                .button(
                    RichText::new(format!(
                        "{} Clear entire database",
                        egui_phosphor::regular::TRASH
                    ))
                    .color(Color32::WHITE),
                )
                .clicked()
            {
                open_clear_all = true;
            }
        });

        if refresh_machines {
            self.load_admin_machines(ctx);
        }
        if refresh_info {
            self.load_database_info(ctx);
        }
        if open_clear_all {
            self.admin.open_clear_all();
        }
        if let Some(name) = open_clear_machine {
            self.admin.open_clear_machine(name);
        }

        self.render_confirm_dialog(ctx);
        self.render_notice(ctx);
    }

    fn render_confirm_dialog(&mut self, ctx: &egui::Context) {
        let mut should_cancel = false;
        let mut should_submit = false;

        if let Some(dialog) = &mut self.admin.dialog {
            egui::Modal::new(egui::Id::new("confirm_delete_modal")).show(ctx, |ui| {
                ui.set_width(380.0);
                ui.heading(format!(
                    "{} Confirm delete",
                    egui_phosphor::regular::WARNING
                ));
                ui.add_space(4.0);
                ui.colored_label(DANGER_RED, dialog.target.describe());
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("Type");
                    ui.label(RichText::new(dialog.target.phrase()).monospace().strong());
                    ui.label("to confirm:");
                });
                let edit = ui.add_enabled(
                    !dialog.in_flight,
                    egui::TextEdit::singleline(&mut dialog.typed)
                        .hint_text(dialog.target.phrase()),
                );
                if dialog.typed.is_empty() && !dialog.in_flight {
                    edit.request_focus();
                }
                if !dialog.typed.is_empty() && !dialog.is_armed() {
                    ui.colored_label(DANGER_RED, "Text does not match");
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!dialog.in_flight, egui::Button::new("Cancel"))
                        .clicked()
                    {
                        should_cancel = true;
                    }
                    let armed = dialog.is_armed() && !dialog.in_flight;
                    let label = if dialog.in_flight {
                        "Deleting…"
                    } else {
                        "Delete"
                    };
                    if ui
                        .add_enabled(
                            armed,
                            egui::Button::new(RichText::new(label).color(Color32::WHITE))
                                .fill(DANGER_FILL),
                        )
                        .clicked()
                    {
                        should_submit = true;
                    }
                });
            });
        }

        if should_cancel {
            self.admin.cancel_dialog();
        }
        if should_submit {
            if let Some(target) = self.admin.submit_dialog() {
                self.start_delete(ctx, target);
            }
        }
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let mut dismissed = false;

        if let Some(notice) = &self.admin.notice {
            let color = match notice.severity {
                Severity::Success => SUCCESS_GREEN,
                Severity::Error => DANGER_RED,
            };
            egui::Window::new("admin_notice")
                .title_bar(false)
                .resizable(false)
                .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(color, &notice.message);
                        if ui.small_button(egui_phosphor::regular::X).clicked() {
                            dismissed = true;
                        }
                    });
                });
        }

        if dismissed {
            self.admin.notice = None;
        }
    }
}
