use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use super::LiveDashboardApp;

const MOTOR_TEMP_COLOR: Color32 = Color32::from_rgb(255, 85, 85);
const BATTERY_TEMP_COLOR: Color32 = Color32::from_rgb(85, 170, 255);
const ENERGY_COLOR: Color32 = Color32::from_rgb(0, 204, 102);
const LINE_WIDTH: f32 = 2.;
const TEMP_MARGIN_C: f32 = 5.;

impl LiveDashboardApp {
    pub(crate) fn graphs_view(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let history = self.session.history();
            let plot_height = (ui.available_height() - ui.spacing().item_spacing.y) / 2.;

            let mut temperature_plot = Plot::new("temperature")
                .legend(Legend::default())
                .height(plot_height)
                .x_axis_label("Time (s)")
                .y_axis_label("Temperature (°C)")
                .allow_scroll(false);
            if let Some((min, max)) = history.temperature_bounds() {
                temperature_plot = temperature_plot
                    .include_y((min - TEMP_MARGIN_C) as f64)
                    .include_y((max + TEMP_MARGIN_C) as f64);
            }
            ui.label(egui::RichText::new("Temperature vs Time").strong());
            temperature_plot.show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new("Motor Temp", PlotPoints::new(history.motor_temp_series()))
                        .color(MOTOR_TEMP_COLOR)
                        .width(LINE_WIDTH),
                );
                plot_ui.line(
                    Line::new("Battery Temp", PlotPoints::new(history.battery_temp_series()))
                        .color(BATTERY_TEMP_COLOR)
                        .width(LINE_WIDTH),
                );
            });

            ui.label(egui::RichText::new("Remaining Energy vs Time").strong());
            Plot::new("energy")
                .height(plot_height)
                .x_axis_label("Time (s)")
                .y_axis_label("Remaining Energy (Ah)")
                .include_y(0.)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new("Energy", PlotPoints::new(history.energy_series()))
                            .color(ENERGY_COLOR)
                            .width(LINE_WIDTH)
                            .fill(0.),
                    );
                });
        });
    }
}
