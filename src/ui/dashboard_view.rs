use std::time::Instant;

use egui::{Align, Button, Color32, Layout, RichText, Sense, Stroke, StrokeKind, Ui, vec2};
use log::warn;

use vts_dashboard::session::{format_time, parse_energy_input};
use vts_dashboard::telemetry::producer::BAUD_RATES;

use super::{
    ConnectionState, LiveDashboardApp, PALETTE_BLUE, PALETTE_GREEN, PALETTE_ORANGE,
    PALETTE_PURPLE, PALETTE_RED, timer_color,
};

const WARNING_LAMP_SIZE: f32 = 40.;
const READING_TEXT_SIZE: f32 = 18.;
const TIMER_TEXT_SIZE: f32 = 48.;

fn colored_button(text: &str, fill: Color32) -> Button<'static> {
    Button::new(RichText::new(text.to_string()).strong().color(Color32::WHITE))
        .fill(fill)
        .min_size(vec2(120., 32.))
}

fn reading_label(ui: &mut Ui, text: String) {
    ui.label(RichText::new(text).size(READING_TEXT_SIZE).strong());
}

impl LiveDashboardApp {
    pub(crate) fn dashboard_view(&mut self, ctx: &egui::Context, now: Instant) {
        egui::TopBottomPanel::top("title").show(ctx, |ui| {
            ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                ui.heading(RichText::new("⚡ VTS Dashboard").size(28.).strong());
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    let icon = if self.app_config.dark_mode { "🌙" } else { "☀" };
                    if ui.button(RichText::new(icon).size(20.)).clicked() {
                        self.toggle_theme(ctx);
                    }
                });
            });
            self.serial_controls(ui);
            ui.add_space(4.);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(format_time(self.session.heat_remaining_s()))
                        .size(TIMER_TEXT_SIZE)
                        .strong()
                        .color(timer_color(self.app_config.dark_mode)),
                );
            });
            ui.separator();

            ui.horizontal(|ui| {
                reading_label(ui, format!("Motor: {:.1}°C", self.session.motor_temp_c()));
                ui.add_space(20.);
                reading_label(
                    ui,
                    format!("Battery: {:.1}°C", self.session.battery_temp_c()),
                );
            });

            egui::Grid::new("telemetry")
                .num_columns(2)
                .spacing([15., 15.])
                .show(ui, |ui| {
                    reading_label(ui, format!("Vibration Level: {:.1}", self.session.vibration()));
                    reading_label(
                        ui,
                        format!(
                            "Remaining Energy: {:.2} Ah",
                            self.session.remaining_energy_ah()
                        ),
                    );
                    ui.end_row();

                    ui.add(
                        egui::TextEdit::singleline(&mut self.energy_input)
                            .hint_text("Enter Remaining Energy (Ah)"),
                    );
                    self.warning_lamp(ui, now);
                    ui.end_row();

                    reading_label(ui, format!("Lap Count: {}", self.session.lap_count()));
                    ui.end_row();
                });

            if let Some(input_error) = &self.input_error {
                ui.colored_label(PALETTE_RED, input_error.as_str());
            }
            ui.add_space(8.);

            self.heat_controls(ui, now);
            ui.add_space(8.);

            if ui
                .add(colored_button(
                    if self.show_graphs { "Hide Graphs" } else { "Show Graphs" },
                    PALETTE_PURPLE,
                ))
                .clicked()
            {
                self.show_graphs = !self.show_graphs;
            }
            ui.separator();

            self.lap_table(ui);
        });
    }

    fn serial_controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.strong("Port:");
            egui::ComboBox::from_id_salt("port")
                .selected_text(self.selected_port.clone())
                .show_ui(ui, |ui| {
                    for port in &self.available_ports {
                        ui.selectable_value(&mut self.selected_port, port.clone(), port.as_str());
                    }
                });
            if ui.small_button("⟳").on_hover_text("Refresh ports").clicked() {
                self.refresh_ports();
            }

            ui.strong("Baud:");
            egui::ComboBox::from_id_salt("baud")
                .selected_text(self.selected_baud.to_string())
                .show_ui(ui, |ui| {
                    for baud in BAUD_RATES {
                        ui.selectable_value(&mut self.selected_baud, baud, baud.to_string());
                    }
                });

            let (text, fill) = match &self.connection {
                ConnectionState::Idle | ConnectionState::Closed => {
                    ("Connect Serial".to_string(), PALETTE_BLUE)
                }
                ConnectionState::Connected(port) => (format!("Connected to {}", port), PALETTE_GREEN),
                ConnectionState::Reconnecting => ("Reconnecting...".to_string(), PALETTE_ORANGE),
                ConnectionState::Failed => ("Connection Failed".to_string(), PALETTE_RED),
            };
            if ui.add(colored_button(&text, fill)).clicked() {
                self.connect_serial();
            }
        });
    }

    fn heat_controls(&mut self, ui: &mut Ui, now: Instant) {
        ui.horizontal(|ui| {
            if ui.add(colored_button("Start Timer", PALETTE_GREEN)).clicked() {
                self.session.start_timer(now);
            }
            if ui.add(colored_button("Pause Timer", PALETTE_ORANGE)).clicked() {
                self.session.pause_timer();
            }
            if ui.add(colored_button("Record Lap", PALETTE_BLUE)).clicked() {
                self.record_lap();
            }
            let (pit_text, pit_fill) = if self.session.in_pit_stop() {
                ("Exit Pit Stop", PALETTE_GREEN)
            } else {
                ("Pit Stop", PALETTE_RED)
            };
            if ui.add(colored_button(pit_text, pit_fill)).clicked() {
                self.session.toggle_pit_stop();
            }
        });
    }

    fn record_lap(&mut self) {
        match parse_energy_input(&self.energy_input) {
            Ok(new_energy) => {
                self.session.record_lap(new_energy);
                self.energy_input.clear();
                self.input_error = None;
            }
            Err(e) => {
                warn!("{}", e);
                self.input_error = Some(e.to_string());
            }
        }
    }

    fn warning_lamp(&mut self, ui: &mut Ui, now: Instant) {
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let (rect, response) =
                ui.allocate_exact_size(vec2(WARNING_LAMP_SIZE, WARNING_LAMP_SIZE), Sense::click());
            if self.session.warning_lamp_lit(now) {
                ui.painter().rect_filled(rect, 4., Color32::RED);
            }
            ui.painter()
                .rect_stroke(rect, 4., Stroke::new(3., Color32::RED), StrokeKind::Inside);

            if self.session.warning_active()
                && response
                    .on_hover_text("Click to acknowledge the warning")
                    .clicked()
            {
                self.session.clear_warning();
            }
        });
    }
}
