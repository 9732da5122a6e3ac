//! Header bar with status badges and the clear button

use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Color32, RichText};

pub struct StatusPanel<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> StatusPanel<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let status = self.state.status();

        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Aria")
                    .size(20.0)
                    .strong()
                    .color(self.theme.primary),
            );
            ui.label(
                RichText::new("Voice Assistant")
                    .size(14.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(self.theme.spacing);

            let status_color = if status.is_listening() {
                self.theme.listening
            } else if status.is_processing() {
                self.theme.primary
            } else {
                self.theme.success
            };
            badge(ui, self.theme, status.label(), status_color, "Status");

            if self.state.voice_available {
                let text = if status.is_listening() {
                    "Listening..."
                } else {
                    "Voice Ready"
                };
                badge(ui, self.theme, text, self.theme.secondary, "Voice status");
            }

            if self.state.audio_available {
                badge(ui, self.theme, "Audio Ready", self.theme.success, "Audio status");
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let can_clear = self.state.can_clear();
                let response = ui
                    .add_enabled(can_clear, egui::Button::new("🗑"))
                    .on_hover_text("Clear conversation");
                response.widget_info(|| {
                    egui::WidgetInfo::labeled(
                        egui::WidgetType::Button,
                        can_clear,
                        "Clear conversation",
                    )
                });
                if response.clicked() {
                    self.state.clear_conversation();
                }
            });
        });
    }
}

/// Small rounded pill with text
fn badge(ui: &mut egui::Ui, theme: &Theme, text: &str, color: Color32, name: &str) {
    let response = egui::Frame::none()
        .fill(color.gamma_multiply(0.15))
        .stroke(egui::Stroke::new(1.0, color))
        .rounding(theme.button_rounding)
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(RichText::new(text).size(12.0).color(color));
        })
        .response;

    let label = format!("{}: {}", name, text);
    response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label));
}
