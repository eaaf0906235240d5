//! Pointer state machine: drag-to-rotate, hover and click picking.
//!
//! Mouse and touch input both arrive here as press / move / release with a
//! client-space position and a picking ray. Whatever the page has to do in
//! response (play a sound, change the cursor, scroll to a section) comes back
//! as a list of [`InteractionEffect`]s.

use crate::audio::SoundEffect;
use crate::camera::Ray;
use crate::config::InteractionConfig;
use crate::points::PointField;
use crate::rotation::RotationState;
use glam::Vec2;
use rand::prelude::*;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerPhase {
    Idle,
    /// Down, not yet moved past the threshold.
    Pressed { last: Vec2, since_ms: f64 },
    Dragging { last: Vec2, since_ms: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorStyle {
    Grab,
    Pointer,
    Grabbing,
}

impl CursorStyle {
    pub fn as_css(&self) -> &'static str {
        match self {
            CursorStyle::Grab => "grab",
            CursorStyle::Pointer => "pointer",
            CursorStyle::Grabbing => "grabbing",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEffect {
    /// First gesture: the audio engine may now start.
    InitAudio,
    /// Audio came up on this gesture; the page may retire its audio notice.
    AudioStarted,
    Sound(SoundEffect),
    Cursor(CursorStyle),
    /// Smooth-scroll the page to the element with this id and pulse it.
    ScrollTo(String),
}

pub type Effects = SmallVec<[InteractionEffect; 3]>;

pub struct InteractionController {
    cfg: InteractionConfig,
    phase: PointerPhase,
    hovered: Option<usize>,
    rng: StdRng,
}

impl InteractionController {
    pub fn new(cfg: InteractionConfig, seed: u64) -> Self {
        Self {
            cfg,
            phase: PointerPhase::Idle,
            hovered: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn phase(&self) -> PointerPhase {
        self.phase
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Damping is held off while the pointer is down.
    pub fn suspends_damping(&self) -> bool {
        !matches!(self.phase, PointerPhase::Idle)
    }

    /// Forget the hovered marker; its index is meaningless after a rebuild.
    pub fn reset_hover(&mut self) {
        self.hovered = None;
    }

    /// Make `index` the hovered marker without a sound, as a focus request does.
    pub fn sync_hover(&mut self, index: Option<usize>) {
        self.hovered = index;
    }

    pub fn press(&mut self, client: Vec2, now_ms: f64, audio_ready: bool) -> Effects {
        let mut fx = Effects::new();
        if !audio_ready {
            fx.push(InteractionEffect::InitAudio);
        }
        self.phase = PointerPhase::Pressed {
            last: client,
            since_ms: now_ms,
        };
        fx.push(InteractionEffect::Cursor(CursorStyle::Grabbing));
        fx
    }

    pub fn moved(
        &mut self,
        client: Vec2,
        ray: &Ray,
        now_ms: f64,
        field: &mut PointField,
        rotation: &mut RotationState,
    ) -> Effects {
        let mut fx = Effects::new();
        match self.phase {
            PointerPhase::Pressed { last, since_ms } | PointerPhase::Dragging { last, since_ms } => {
                let delta = client - last;
                let threshold = self.cfg.drag_threshold_px;
                if delta.x.abs() > threshold || delta.y.abs() > threshold {
                    self.phase = PointerPhase::Dragging {
                        last: client,
                        since_ms,
                    };
                    if self.rng.gen::<f32>() < self.cfg.drag_sound_probability {
                        fx.push(InteractionEffect::Sound(SoundEffect::Drag));
                    }
                    rotation.apply_drag(delta.x, delta.y, self.cfg.rotation_speed);
                }
            }
            PointerPhase::Idle => {
                let hit = field.pick(ray, rotation.combined(now_ms).matrix());
                match hit {
                    Some(i) => {
                        let clicked = field.markers()[i].is_clicked;
                        if self.hovered != Some(i) && !clicked {
                            if let Some(prev) = self.hovered {
                                if let Some(m) = field.markers_mut().get_mut(prev) {
                                    m.set_hovered(false);
                                }
                            }
                            self.hovered = Some(i);
                            field.markers_mut()[i].set_hovered(true);
                            if self.rng.gen::<f32>() < self.cfg.hover_sound_probability {
                                fx.push(InteractionEffect::Sound(SoundEffect::Hover));
                            }
                        }
                    }
                    None => {
                        if let Some(prev) = self.hovered.take() {
                            if let Some(m) = field.markers_mut().get_mut(prev) {
                                m.set_hovered(false);
                            }
                        }
                    }
                }
                let cursor = if hit.is_some() {
                    CursorStyle::Pointer
                } else {
                    CursorStyle::Grab
                };
                fx.push(InteractionEffect::Cursor(cursor));
            }
        }
        fx
    }

    /// Pointer up. `ray` is the picking ray at the release position; `None`
    /// when the platform could not supply one.
    pub fn release(
        &mut self,
        ray: Option<&Ray>,
        now_ms: f64,
        field: &mut PointField,
        rotation: &RotationState,
    ) -> Effects {
        let mut fx = Effects::new();
        let phase = std::mem::replace(&mut self.phase, PointerPhase::Idle);
        fx.push(InteractionEffect::Cursor(CursorStyle::Grab));

        let since_ms = match phase {
            PointerPhase::Pressed { since_ms, .. } => since_ms,
            PointerPhase::Dragging { .. } | PointerPhase::Idle => return fx,
        };
        if now_ms - since_ms > self.cfg.drag_hold_ms {
            return fx;
        }
        let Some(ray) = ray else {
            return fx;
        };
        let Some(i) = field.pick(ray, rotation.combined(now_ms).matrix()) else {
            return fx;
        };

        fx.push(InteractionEffect::Sound(SoundEffect::Click));
        let marker = &mut field.markers_mut()[i];
        if marker.mark_clicked() {
            log::info!("[input] project clicked: {}", marker.id);
        }
        if self.hovered == Some(i) {
            self.hovered = None;
        }
        fx.push(InteractionEffect::ScrollTo(marker.id.clone()));
        fx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldConfig, MotionConfig};
    use crate::project::ProjectDescriptor;
    use glam::Vec3;

    fn field_with_one() -> PointField {
        let mut field = PointField::new(FieldConfig::default(), 5);
        let t = field.rebuild(vec![ProjectDescriptor::titled("solo")], vec![]);
        field.build_batch(t);
        field
    }

    // A single marker sits at (0, 0, 1.6); with no rotation it faces the camera.
    fn ray_at_marker() -> Ray {
        Ray {
            origin: Vec3::new(0.0, 0.0, 2.2),
            dir: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    fn ray_missing() -> Ray {
        Ray {
            origin: Vec3::new(0.0, 0.0, 2.2),
            dir: Vec3::new(0.6, 0.0, -0.8),
        }
    }

    fn controller() -> InteractionController {
        let mut cfg = InteractionConfig::default();
        cfg.hover_sound_probability = 1.0;
        cfg.drag_sound_probability = 1.0;
        InteractionController::new(cfg, 9)
    }

    #[test]
    fn first_press_requests_audio() {
        let mut c = controller();
        let fx = c.press(Vec2::ZERO, 0.0, false);
        assert_eq!(fx[0], InteractionEffect::InitAudio);
        let fx = c.press(Vec2::ZERO, 0.0, true);
        assert_eq!(fx[..], [InteractionEffect::Cursor(CursorStyle::Grabbing)]);
    }

    #[test]
    fn small_moves_do_not_start_a_drag() {
        let mut c = controller();
        let mut field = field_with_one();
        let mut rot = RotationState::new(MotionConfig::default());
        c.press(Vec2::new(10.0, 10.0), 0.0, true);
        let fx = c.moved(Vec2::new(11.0, 9.0), &ray_missing(), 5.0, &mut field, &mut rot);
        assert!(fx.is_empty());
        assert!(matches!(c.phase(), PointerPhase::Pressed { .. }));
        c.moved(Vec2::new(14.0, 10.0), &ray_missing(), 6.0, &mut field, &mut rot);
        assert!(matches!(c.phase(), PointerPhase::Dragging { .. }));
        assert!((rot.target.y - 4.0 * 0.002).abs() < 1e-6);
    }

    #[test]
    fn hover_enter_and_exit() {
        let mut c = controller();
        let mut field = field_with_one();
        let mut rot = RotationState::new(MotionConfig::default());
        let fx = c.moved(Vec2::ZERO, &ray_at_marker(), 0.0, &mut field, &mut rot);
        assert_eq!(c.hovered(), Some(0));
        assert!(field.markers()[0].is_hovered);
        assert!(fx.contains(&InteractionEffect::Sound(SoundEffect::Hover)));
        assert!(fx.contains(&InteractionEffect::Cursor(CursorStyle::Pointer)));

        // staying on the same marker is not a new transition
        let fx = c.moved(Vec2::ZERO, &ray_at_marker(), 0.0, &mut field, &mut rot);
        assert!(!fx.contains(&InteractionEffect::Sound(SoundEffect::Hover)));

        let fx = c.moved(Vec2::ZERO, &ray_missing(), 0.0, &mut field, &mut rot);
        assert_eq!(c.hovered(), None);
        assert!(!field.markers()[0].is_hovered);
        assert_eq!(fx[..], [InteractionEffect::Cursor(CursorStyle::Grab)]);
    }

    #[test]
    fn quick_release_on_marker_clicks_it() {
        let mut c = controller();
        let mut field = field_with_one();
        let rot = RotationState::new(MotionConfig::default());
        c.press(Vec2::ZERO, 0.0, true);
        let fx = c.release(Some(&ray_at_marker()), 50.0, &mut field, &rot);
        assert!(fx.contains(&InteractionEffect::Sound(SoundEffect::Click)));
        assert!(fx.contains(&InteractionEffect::ScrollTo("music-0".into())));
        assert!(field.markers()[0].is_clicked);
        assert_eq!(c.phase(), PointerPhase::Idle);
    }

    #[test]
    fn long_hold_is_not_a_click() {
        let mut c = controller();
        let mut field = field_with_one();
        let rot = RotationState::new(MotionConfig::default());
        c.press(Vec2::ZERO, 0.0, true);
        let fx = c.release(Some(&ray_at_marker()), 150.0, &mut field, &rot);
        assert_eq!(fx[..], [InteractionEffect::Cursor(CursorStyle::Grab)]);
        assert!(!field.markers()[0].is_clicked);
    }

    #[test]
    fn clicked_marker_is_never_hovered_again() {
        let mut c = controller();
        let mut field = field_with_one();
        let mut rot = RotationState::new(MotionConfig::default());
        c.press(Vec2::ZERO, 0.0, true);
        c.release(Some(&ray_at_marker()), 10.0, &mut field, &rot);
        for _ in 0..3 {
            c.moved(Vec2::ZERO, &ray_at_marker(), 20.0, &mut field, &mut rot);
            assert!(!field.markers()[0].is_hovered);
            c.moved(Vec2::ZERO, &ray_missing(), 20.0, &mut field, &mut rot);
        }
    }
}
