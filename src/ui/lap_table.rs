use egui::{Button, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use super::{LiveDashboardApp, PALETTE_RED};

const ROW_HEIGHT: f32 = 26.;
const TABLE_MIN_HEIGHT: f32 = 200.;

impl LiveDashboardApp {
    pub(crate) fn lap_table(&mut self, ui: &mut Ui) {
        let mut delete_requested = None;

        TableBuilder::new(ui)
            .striped(true)
            .stick_to_bottom(true)
            .min_scrolled_height(TABLE_MIN_HEIGHT)
            .column(Column::remainder())
            .column(Column::remainder())
            .column(Column::remainder())
            .column(Column::remainder())
            .header(ROW_HEIGHT, |mut header| {
                for title in ["Lap #", "Time Taken", "Energy Used", "Actions"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for entry in self.session.laps().entries() {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.label(entry.lap_column());
                        });
                        row.col(|ui| {
                            ui.label(entry.time_column());
                        });
                        row.col(|ui| {
                            ui.label(entry.energy_column());
                        });
                        row.col(|ui| {
                            if entry.is_deletable()
                                && ui
                                    .add(
                                        Button::new(
                                            RichText::new("Delete").strong().color(Color32::WHITE),
                                        )
                                        .fill(PALETTE_RED),
                                    )
                                    .clicked()
                            {
                                delete_requested = Some(entry.id);
                            }
                        });
                    });
                }
            });

        if let Some(id) = delete_requested {
            self.session.delete_lap(id);
        }
    }
}
