//! Per-frame avatar animation state

use crate::conversation::ConversationStatus;
use egui::Color32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const PARTICLE_COUNT: usize = 20;

const MAGENTA: Color32 = Color32::from_rgb(0xff, 0x00, 0xff);
const CYAN: Color32 = Color32::from_rgb(0x00, 0xff, 0xff);
const VIOLET: Color32 = Color32::from_rgb(0x80, 0x00, 0xff);
const DEEP_VIOLET: Color32 = Color32::from_rgb(0x40, 0x00, 0xff);

const EMISSIVE_INTENSITY: f32 = 0.3;
const BODY_OPACITY: f32 = 0.8;
const BOB_AMPLITUDE: f32 = 0.1;
/// Yaw rate while processing, radians per second
const SPIN_RATE: f32 = 0.5;
const PULSE_FREQUENCY: f32 = 4.0;
const PULSE_AMPLITUDE: f32 = 0.1;

/// Particles are scattered inside a cube of this edge length
const PARTICLE_SPREAD: f32 = 4.0;
const PARTICLE_RADIUS: f32 = 0.02;
const PARTICLE_FLOAT: f32 = 0.8;

const EYE_RADIUS: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in avatar space, body centred at the origin with radius 1
    pub position: [f32; 3],
    pub radius: f32,
    pub speed: f32,
    pub color: Color32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eye {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: Color32,
}

/// Everything needed to draw one frame of the avatar
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarFrame {
    pub body_color: Color32,
    pub emissive: Color32,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub position_y: f32,
    /// Accumulated yaw in radians
    pub rotation_y: f32,
    pub scale: f32,
    pub caption: &'static str,
    pub caption_color: Color32,
    /// Empty while idle
    pub particles: Vec<Particle>,
    pub eyes: [Eye; 2],
}

pub struct AvatarDriver {
    rng: StdRng,
    rotation_y: f32,
    last_time: Option<f64>,
    /// Particle anchors, scattered afresh each time the particles appear
    anchors: Option<Vec<[f32; 3]>>,
}

impl AvatarDriver {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic particle layout
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            rotation_y: 0.0,
            last_time: None,
            anchors: None,
        }
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Advance to `time_secs` (seconds since the avatar was first shown)
    /// and describe the frame for `status`.
    pub fn frame(&mut self, status: ConversationStatus, time_secs: f64) -> AvatarFrame {
        let delta = self
            .last_time
            .map(|last| (time_secs - last).max(0.0))
            .unwrap_or(0.0);
        self.last_time = Some(time_secs);

        if status.is_processing() {
            self.rotation_y += delta as f32 * SPIN_RATE;
        }

        let t = time_secs as f32;
        let (body_color, emissive) = body_colors(status);

        let scale = if status.is_listening() {
            1.0 + (t * PULSE_FREQUENCY).sin() * PULSE_AMPLITUDE
        } else {
            1.0
        };

        AvatarFrame {
            body_color,
            emissive,
            emissive_intensity: EMISSIVE_INTENSITY,
            opacity: BODY_OPACITY,
            position_y: t.sin() * BOB_AMPLITUDE,
            rotation_y: self.rotation_y,
            scale,
            caption: status.label(),
            caption_color: caption_color(status),
            particles: self.particles(status, t),
            eyes: eyes(),
        }
    }

    fn particles(&mut self, status: ConversationStatus, t: f32) -> Vec<Particle> {
        let color = match status {
            ConversationStatus::Listening => MAGENTA,
            ConversationStatus::Processing => CYAN,
            ConversationStatus::Idle => {
                self.anchors = None;
                return Vec::new();
            }
        };

        let rng = &mut self.rng;
        let anchors = self.anchors.get_or_insert_with(|| {
            (0..PARTICLE_COUNT)
                .map(|_| {
                    let mut coord = || (rng.gen::<f32>() - 0.5) * PARTICLE_SPREAD;
                    [coord(), coord(), coord()]
                })
                .collect()
        });

        anchors
            .iter()
            .enumerate()
            .map(|(i, anchor)| {
                let speed = 2.0 + i as f32 * 0.1;
                let drift = ((t / 4.0) * speed).sin() / 10.0 * PARTICLE_FLOAT;
                Particle {
                    position: [anchor[0], anchor[1] + drift, anchor[2]],
                    radius: PARTICLE_RADIUS,
                    speed,
                    color,
                }
            })
            .collect()
    }
}

impl Default for AvatarDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn body_colors(status: ConversationStatus) -> (Color32, Color32) {
    match status {
        ConversationStatus::Listening => (MAGENTA, MAGENTA),
        ConversationStatus::Processing => (CYAN, CYAN),
        ConversationStatus::Idle => (VIOLET, DEEP_VIOLET),
    }
}

fn caption_color(status: ConversationStatus) -> Color32 {
    match status {
        ConversationStatus::Listening => MAGENTA,
        ConversationStatus::Processing => CYAN,
        ConversationStatus::Idle => Color32::WHITE,
    }
}

fn eyes() -> [Eye; 2] {
    [
        Eye {
            position: [-0.3, 0.2, 0.8],
            radius: EYE_RADIUS,
            color: CYAN,
        },
        Eye {
            position: [0.3, 0.2, 0.8],
            radius: EYE_RADIUS,
            color: CYAN,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_idle_frame() {
        let mut driver = AvatarDriver::with_seed(7);
        let frame = driver.frame(ConversationStatus::Idle, 0.0);

        assert_eq!(frame.body_color, Color32::from_rgb(0x80, 0x00, 0xff));
        assert_eq!(frame.emissive, Color32::from_rgb(0x40, 0x00, 0xff));
        assert_eq!(frame.caption, "Ready");
        assert_eq!(frame.caption_color, Color32::WHITE);
        assert_eq!(frame.scale, 1.0);
        assert!(frame.particles.is_empty());
        assert!((frame.emissive_intensity - 0.3).abs() < EPS);
        assert!((frame.opacity - 0.8).abs() < EPS);
    }

    #[test]
    fn test_listening_pulses_with_particles() {
        let mut driver = AvatarDriver::with_seed(7);
        let t = std::f64::consts::FRAC_PI_8; // sin(4t) == 1
        let frame = driver.frame(ConversationStatus::Listening, t);

        assert_eq!(frame.body_color, MAGENTA);
        assert_eq!(frame.caption, "Listening...");
        assert_eq!(frame.caption_color, MAGENTA);
        assert!((frame.scale - 1.1).abs() < EPS);
        assert_eq!(frame.particles.len(), PARTICLE_COUNT);
        assert!(frame.particles.iter().all(|p| p.color == MAGENTA));
    }

    #[test]
    fn test_processing_spins_only_while_processing() {
        let mut driver = AvatarDriver::with_seed(7);
        driver.frame(ConversationStatus::Processing, 0.0);
        let frame = driver.frame(ConversationStatus::Processing, 2.0);
        assert!((frame.rotation_y - 1.0).abs() < EPS);
        assert_eq!(frame.body_color, CYAN);
        assert_eq!(frame.caption, "Processing...");
        assert!(frame.particles.iter().all(|p| p.color == CYAN));

        // yaw is kept, not reset, once idle
        let frame = driver.frame(ConversationStatus::Idle, 5.0);
        assert!((frame.rotation_y - 1.0).abs() < EPS);
        assert_eq!(frame.scale, 1.0);
    }

    #[test]
    fn test_bob() {
        let mut driver = AvatarDriver::with_seed(1);
        let t = std::f64::consts::FRAC_PI_2;
        let frame = driver.frame(ConversationStatus::Idle, t);
        assert!((frame.position_y - 0.1).abs() < EPS);
    }

    #[test]
    fn test_particles_stay_in_cube() {
        let mut driver = AvatarDriver::with_seed(42);
        let frame = driver.frame(ConversationStatus::Processing, 3.0);
        // anchors lie within +/-2, float drift adds at most 0.08
        for p in &frame.particles {
            assert!(p.position[0].abs() <= 2.0);
            assert!(p.position[1].abs() <= 2.08 + EPS);
            assert!(p.position[2].abs() <= 2.0);
        }
        let speeds: Vec<f32> = frame.particles.iter().map(|p| p.speed).collect();
        assert!((speeds[0] - 2.0).abs() < EPS);
        assert!((speeds[19] - 3.9).abs() < EPS);
    }

    #[test]
    fn test_particle_layout_stable_while_active() {
        let mut driver = AvatarDriver::with_seed(3);
        let a = driver.frame(ConversationStatus::Listening, 0.0);
        let b = driver.frame(ConversationStatus::Processing, 0.0);
        let xs = |f: &AvatarFrame| f.particles.iter().map(|p| p.position[0]).collect::<Vec<_>>();
        assert_eq!(xs(&a), xs(&b));
    }

    #[test]
    fn test_eyes_are_fixed() {
        let mut driver = AvatarDriver::with_seed(0);
        for status in [
            ConversationStatus::Idle,
            ConversationStatus::Listening,
            ConversationStatus::Processing,
        ] {
            let frame = driver.frame(status, 1.0);
            assert_eq!(frame.eyes[0].position, [-0.3, 0.2, 0.8]);
            assert_eq!(frame.eyes[1].position, [0.3, 0.2, 0.8]);
            assert!(frame.eyes.iter().all(|e| e.color == CYAN));
        }
    }
}
