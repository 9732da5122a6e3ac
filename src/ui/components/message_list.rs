//! Message list component
//!
//! Displays the conversation log, or a welcome panel when it is empty.

use crate::commands::replies::EXAMPLE_COMMANDS;
use crate::messages::Message;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Align, Color32, RichText};

/// Message list component
pub struct MessageList<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let messages = self.state.messages.get_all();
        let processing = self.state.status().is_processing();

        egui::ScrollArea::vertical()
            .id_salt("messages")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.add_space(self.theme.spacing);

                    if messages.is_empty() && !processing {
                        self.show_welcome(ui);
                    } else {
                        for message in &messages {
                            self.show_message(ui, message);
                            ui.add_space(self.theme.spacing_sm);
                        }

                        if processing {
                            self.show_typing_indicator(ui);
                        }
                    }

                    ui.add_space(self.theme.spacing);
                });
            });
    }

    fn show_welcome(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);

            ui.label(
                RichText::new("Welcome to Aria")
                    .size(24.0)
                    .color(self.theme.text_primary),
            );

            ui.add_space(self.theme.spacing_sm);

            ui.label(
                RichText::new("Type a message or use the microphone. Try saying:")
                    .size(14.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(self.theme.spacing);

            for example in EXAMPLE_COMMANDS {
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .rounding(self.theme.card_rounding)
                    .inner_margin(egui::Margin::symmetric(self.theme.spacing, 6.0))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(format!("\"{}\"", example))
                                .size(13.0)
                                .color(self.theme.primary),
                        );
                    });
                ui.add_space(4.0);
            }
        });
    }

    fn show_message(&self, ui: &mut egui::Ui, message: &Message) {
        let is_user = message.is_user();
        let bubble_color = if is_user {
            self.theme.user_bubble
        } else {
            self.theme.assistant_bubble
        };
        let text_color = if is_user {
            Color32::WHITE
        } else {
            self.theme.text_primary
        };
        let align = if is_user { Align::RIGHT } else { Align::LEFT };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            ui.label(
                RichText::new(if is_user { "You" } else { "Aria" })
                    .size(12.0)
                    .color(self.theme.text_muted),
            );

            ui.add_space(2.0);

            let max_width = ui.available_width() * 0.75;

            egui::Frame::none()
                .fill(bubble_color)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);

                    let response = ui.label(RichText::new(&message.text).color(text_color));
                    let label = if is_user {
                        format!("User message: {}", message.text)
                    } else {
                        format!("Assistant response: {}", message.text)
                    };
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label)
                    });
                });

            let mut meta = message.timestamp.format("%H:%M").to_string();
            if message.metadata.is_speech {
                meta.push_str(" 🎤");
            }
            ui.label(RichText::new(meta).size(10.0).color(self.theme.text_muted));
        });
    }

    fn show_typing_indicator(&self, ui: &mut egui::Ui) {
        ui.with_layout(egui::Layout::top_down(Align::LEFT), |ui| {
            egui::Frame::none()
                .fill(self.theme.assistant_bubble)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    let t = ui.ctx().input(|i| i.time);
                    let response = ui
                        .horizontal(|ui| {
                            for i in 0..3 {
                                let alpha = ((t * 3.0 + i as f64 * 0.5).sin() * 0.5 + 0.5) as f32;
                                ui.label(
                                    RichText::new("●")
                                        .size(10.0)
                                        .color(self.theme.primary.gamma_multiply(alpha)),
                                );
                            }
                        })
                        .response;
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(
                            egui::WidgetType::Label,
                            true,
                            "Assistant is typing",
                        )
                    });
                });
        });

        ui.ctx().request_repaint();
    }
}
