//! Main application struct and eframe integration

use crate::ui::components::{AvatarView, InputBar, MessageList, StatusPanel, Toasts};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, SidePanel, TopBottomPanel};
use tracing::info;

/// Main Aria application
pub struct AriaApp {
    state: AppState,
    theme: Theme,
}

impl AriaApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState) -> Self {
        let app = Self::from_state(state);
        app.theme.apply(&cc.egui_ctx);
        app
    }

    /// Build without an eframe context; the theme is not applied
    pub fn from_state(state: AppState) -> Self {
        Self {
            state,
            theme: Theme::neon(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Draw one frame. Shared by eframe and the UI tests.
    pub fn show(&mut self, ctx: &egui::Context) {
        self.state.poll_events();

        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                StatusPanel::new(&mut self.state, &self.theme).show(ui);
            });

        SidePanel::left("avatar")
            .resizable(false)
            .exact_width(260.0)
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                ui.add_space(self.theme.spacing_lg);
                let frame = self.state.avatar_frame();
                AvatarView::new(&frame, &self.theme).show(ui);
            });

        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                InputBar::new(&mut self.state, &self.theme).show(ui);
            });

        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                MessageList::new(&self.state, &self.theme).show(ui);
            });

        Toasts::new(&self.state, &self.theme).show(ctx);

        // The avatar animates in every status
        ctx.request_repaint();
    }
}

impl eframe::App for AriaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Aria shutting down");
        self.state.shutdown();
    }
}
