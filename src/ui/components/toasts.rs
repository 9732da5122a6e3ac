//! Transient notifications in the bottom-right corner

use crate::conversation::NotificationLevel;
use crate::ui::state::{AppState, TOAST_LIFETIME};
use crate::ui::theme::Theme;
use egui::{self, Align2, RichText, Vec2};
use std::time::Instant;

pub struct Toasts<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> Toasts<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ctx: &egui::Context) {
        if self.state.toasts.is_empty() {
            return;
        }

        let now = Instant::now();

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(Align2::RIGHT_BOTTOM, Vec2::new(-self.theme.spacing, -96.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                ui.set_max_width(320.0);

                for toast in &self.state.toasts {
                    let accent = match toast.notification.level {
                        NotificationLevel::Error => self.theme.error,
                        NotificationLevel::Info => self.theme.primary,
                    };

                    // Fade out over the last second
                    let remaining = TOAST_LIFETIME
                        .saturating_sub(now.duration_since(toast.shown_at))
                        .as_secs_f32();
                    let alpha = remaining.clamp(0.0, 1.0);

                    let response = egui::Frame::none()
                        .fill(self.theme.bg_secondary.gamma_multiply(alpha.max(0.2)))
                        .stroke(egui::Stroke::new(1.0, accent.gamma_multiply(alpha)))
                        .rounding(self.theme.card_rounding)
                        .inner_margin(self.theme.spacing_sm)
                        .show(ui, |ui| {
                            ui.label(
                                RichText::new(&toast.notification.title)
                                    .strong()
                                    .color(accent.gamma_multiply(alpha)),
                            );
                            if !toast.notification.description.is_empty() {
                                ui.label(
                                    RichText::new(&toast.notification.description)
                                        .size(12.0)
                                        .color(self.theme.text_secondary.gamma_multiply(alpha)),
                                );
                            }
                        })
                        .response;

                    let label = format!("Notification: {}", toast.notification.title);
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, &label)
                    });
                }
            });

        ctx.request_repaint();
    }
}
