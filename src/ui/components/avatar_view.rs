//! Avatar view
//!
//! Paints an [`AvatarFrame`] with a simple perspective projection: the body
//! is a glowing disc, eyes and particles are projected points.

use crate::avatar::AvatarFrame;
use crate::ui::theme::Theme;
use egui::{self, Pos2, RichText, Sense, Vec2};

/// Distance from the camera to the avatar centre, in avatar radii
const CAMERA_DISTANCE: f32 = 5.0;

pub struct AvatarView<'a> {
    frame: &'a AvatarFrame,
    theme: &'a Theme,
    size: f32,
}

impl<'a> AvatarView<'a> {
    pub fn new(frame: &'a AvatarFrame, theme: &'a Theme) -> Self {
        Self {
            frame,
            theme,
            size: 220.0,
        }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let frame = self.frame;

        ui.vertical_centered(|ui| {
            let (rect, response) = ui.allocate_exact_size(Vec2::splat(self.size), Sense::hover());
            response.widget_info(|| {
                egui::WidgetInfo::labeled(egui::WidgetType::Label, true, "Assistant avatar")
            });

            let painter = ui.painter_at(rect);
            let unit = self.size / 5.0;
            let origin = rect.center();

            let project = |p: [f32; 3]| -> (Pos2, f32) {
                let depth = CAMERA_DISTANCE / (CAMERA_DISTANCE - p[2]).max(0.5);
                let x = origin.x + p[0] * unit * depth;
                let y = origin.y - (p[1] + frame.position_y) * unit * depth;
                (Pos2::new(x, y), depth)
            };

            // Particles float behind and in front of the body alike
            for particle in &frame.particles {
                let (pos, depth) = project(particle.position);
                painter.circle_filled(pos, (particle.radius * unit * depth).max(1.0), particle.color);
            }

            let (center, _) = project([0.0, 0.0, 0.0]);
            let radius = unit * frame.scale;
            let glow = frame.emissive.gamma_multiply(frame.emissive_intensity);
            painter.circle_filled(center, radius * 1.15, glow);
            painter.circle_filled(center, radius, frame.body_color.gamma_multiply(frame.opacity));

            let (sin, cos) = frame.rotation_y.sin_cos();
            for eye in &frame.eyes {
                let [x, y, z] = eye.position;
                // Yaw about the vertical axis, then scale with the body
                let rotated = [
                    (x * cos + z * sin) * frame.scale,
                    y * frame.scale,
                    (-x * sin + z * cos) * frame.scale,
                ];
                // Eyes on the far side are hidden by the body
                if rotated[2] < 0.0 {
                    continue;
                }
                let (pos, depth) = project(rotated);
                painter.circle_filled(pos, eye.radius * unit * depth, eye.color);
            }

            ui.label(
                RichText::new(frame.caption)
                    .size(16.0)
                    .strong()
                    .color(frame.caption_color),
            );
            ui.add_space(self.theme.spacing_sm);
        });
    }
}
