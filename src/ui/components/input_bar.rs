//! Input bar component
//!
//! Provides the mic toggle, text input, and send controls.

use crate::conversation::ConversationStatus;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

/// Input bar component for text and voice input
pub struct InputBar<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    self.show_mic_button(ui);
                    ui.add_space(self.theme.spacing_sm);
                    self.show_text_input(ui);
                    ui.add_space(self.theme.spacing_sm);
                    self.show_send_button(ui);
                });
            });
    }

    fn show_mic_button(&mut self, ui: &mut egui::Ui) {
        let status = self.state.status();
        let listening = status.is_listening();
        let enabled = self.state.voice_available && !status.is_processing();

        let (icon, tooltip, color) = match status {
            _ if !self.state.voice_available => {
                ("🎤", "Voice input is unavailable", self.theme.text_muted)
            }
            ConversationStatus::Listening => ("⏹", "Stop listening", self.theme.listening),
            ConversationStatus::Processing => ("⏳", "Processing...", self.theme.text_muted),
            ConversationStatus::Idle => ("🎤", "Start voice input", self.theme.text_secondary),
        };

        let mut button = egui::Button::new(RichText::new(icon).size(20.0).color(color))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding);
        if listening {
            button = button.fill(self.theme.listening.gamma_multiply(0.2));
        }

        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, "Voice input")
        });
        let button_rect = response.rect;

        if response.clicked() {
            self.state.toggle_listening();
        }
        response.on_hover_text(tooltip);

        if listening {
            let t = ui.ctx().input(|i| i.time);
            let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;
            let radius = button_rect.width() / 2.0 + 2.0 + pulse * 3.0;

            ui.painter().circle_stroke(
                button_rect.center(),
                radius,
                egui::Stroke::new(
                    2.0 * pulse,
                    self.theme.listening.gamma_multiply(1.0 - pulse * 0.5),
                ),
            );

            ui.ctx().request_repaint();
        }
    }

    fn show_text_input(&mut self, ui: &mut egui::Ui) {
        let idle = self.state.status().is_idle();

        // Leave room for the send button
        let available_width = ui.available_width() - 60.0;

        let text_edit = egui::TextEdit::singleline(&mut self.state.input_text)
            .hint_text("Type a message...")
            .desired_width(available_width)
            .font(egui::TextStyle::Body)
            .margin(egui::Margin::symmetric(12.0, 8.0))
            .id(egui::Id::new("message_input"));

        let response = ui.add(text_edit);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Message input")
        });

        if idle && response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
            self.state.send_message();
            response.request_focus();
        }
    }

    fn show_send_button(&mut self, ui: &mut egui::Ui) {
        let can_send = self.state.can_send();

        let fill = if can_send {
            self.theme.primary
        } else {
            self.theme.text_muted
        };

        let button = egui::Button::new(RichText::new("➤").size(18.0).color(self.theme.bg_primary))
            .min_size(Vec2::splat(44.0))
            .rounding(self.theme.button_rounding)
            .fill(fill);

        let response = ui.add_enabled(can_send, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, can_send, "Send message")
        });

        if response.clicked() {
            self.state.send_message();
        }

        response.on_hover_text("Send message (Enter)");
    }
}
