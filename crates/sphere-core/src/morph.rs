//! Cross-fade scheduling between sphere textures.

use crate::config::MorphConfig;
use crate::constants::INITIAL_LAST_MORPH_MS;

#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Speed multiplier for a page scrolled `scroll_px` down.
pub fn scroll_multiplier(scroll_px: f32, cfg: &MorphConfig) -> f32 {
    let m = 1.0 + (scroll_px.max(0.0) / cfg.scroll_distance_px) * 2.0;
    m.min(cfg.scroll_speed_cap)
}

/// A morph that just began: bind `slot1 -> slot2` and fade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MorphStart {
    pub slot1: usize,
    pub slot2: usize,
    /// Morph factor shown when the cycle began; fed to the morph sound.
    pub sound: Option<f32>,
}

#[derive(Clone, Debug)]
pub struct MorphEngine {
    cfg: MorphConfig,
    texture_count: usize,
    current: usize,
    slot1: usize,
    slot2: usize,
    morphing: bool,
    progress: f32,
    factor: f32,
    last_morph_ms: f64,
    last_sound_ms: f64,
    multiplier: f32,
}

impl MorphEngine {
    pub fn new(cfg: MorphConfig, texture_count: usize) -> Self {
        let texture_count = texture_count.max(1);
        Self {
            factor: cfg.initial_factor,
            cfg,
            texture_count,
            current: 0,
            slot1: 0,
            slot2: 1 % texture_count,
            morphing: false,
            progress: 0.0,
            last_morph_ms: INITIAL_LAST_MORPH_MS,
            last_sound_ms: 0.0,
            multiplier: 1.0,
        }
    }

    pub fn set_scroll(&mut self, scroll_px: f32) {
        self.multiplier = scroll_multiplier(scroll_px, &self.cfg);
    }

    pub fn speed(&self) -> f32 {
        self.cfg.base_speed * self.multiplier
    }

    /// Delay before the next morph. A playing video holds the slot for its
    /// duration; otherwise the base delay shrinks with the scroll multiplier.
    pub fn delay_ms(&self, video_duration_ms: Option<f64>) -> f64 {
        match video_duration_ms {
            Some(d) if d > 0.0 => d - self.cfg.video_lead_ms,
            _ => self.cfg.delay_ms / self.multiplier as f64,
        }
    }

    /// Advance one frame. `video_duration_ms` is the duration of the texture
    /// at [`Self::current_index`] when it is a loaded video.
    pub fn tick(&mut self, now_ms: f64, video_duration_ms: Option<f64>) -> Option<MorphStart> {
        let delay = self.delay_ms(video_duration_ms);
        let mut started = None;
        if !self.morphing && now_ms - self.last_morph_ms > delay {
            let (slot1, slot2) = self.begin(now_ms);
            let sound = if now_ms - self.last_sound_ms > delay {
                self.last_sound_ms = now_ms;
                Some(self.factor)
            } else {
                None
            };
            started = Some(MorphStart { slot1, slot2, sound });
        }

        if self.morphing {
            self.progress += self.speed() * self.cfg.progress_scale;
            if self.progress >= 1.0 {
                self.progress = 1.0;
                self.morphing = false;
            }
            self.factor = smoothstep(self.progress);
        }
        started
    }

    /// Morph requested by a focus action; silent, rate-limited by the cooldown.
    pub fn focus_start(&mut self, now_ms: f64) -> Option<MorphStart> {
        if self.morphing && now_ms - self.last_morph_ms <= self.cfg.focus_cooldown_ms {
            return None;
        }
        let (slot1, slot2) = self.begin(now_ms);
        Some(MorphStart {
            slot1,
            slot2,
            sound: None,
        })
    }

    fn begin(&mut self, now_ms: f64) -> (usize, usize) {
        self.morphing = true;
        self.progress = 0.0;
        self.last_morph_ms = now_ms;
        self.slot1 = self.current;
        self.current = (self.current + 1) % self.texture_count;
        self.slot2 = self.current;
        (self.slot1, self.slot2)
    }

    pub fn is_morphing(&self) -> bool {
        self.morphing
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn slots(&self) -> (usize, usize) {
        (self.slot1, self.slot2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(2.0), 1.0);
    }

    #[test]
    fn scroll_multiplier_caps_at_five() {
        let cfg = MorphConfig::default();
        assert_eq!(scroll_multiplier(0.0, &cfg), 1.0);
        assert_eq!(scroll_multiplier(500.0, &cfg), 2.0);
        assert_eq!(scroll_multiplier(50_000.0, &cfg), 5.0);
    }

    #[test]
    fn first_morph_waits_for_delay() {
        let mut m = MorphEngine::new(MorphConfig::default(), 3);
        assert_eq!(m.slots(), (0, 1));
        assert_eq!(m.factor(), 0.2);
        assert!(m.tick(4000.0, None).is_none());
        let start = m.tick(4021.0, None).unwrap();
        assert_eq!((start.slot1, start.slot2), (0, 1));
        assert_eq!(start.sound, Some(0.2));
        assert!(m.is_morphing());
    }

    #[test]
    fn indices_cycle_circularly() {
        let mut m = MorphEngine::new(MorphConfig::default(), 2);
        let a = m.focus_start(0.0).unwrap();
        let mut now = 2000.0;
        let b = m.focus_start(now).unwrap();
        now += 2000.0;
        let c = m.focus_start(now).unwrap();
        assert_eq!((a.slot1, a.slot2), (0, 1));
        assert_eq!((b.slot1, b.slot2), (1, 0));
        assert_eq!((c.slot1, c.slot2), (0, 1));
    }

    #[test]
    fn focus_respects_cooldown_while_morphing() {
        let mut m = MorphEngine::new(MorphConfig::default(), 4);
        assert!(m.focus_start(100.0).is_some());
        assert!(m.focus_start(600.0).is_none());
        assert!(m.focus_start(1200.0).is_some());
    }

    #[test]
    fn video_duration_overrides_delay() {
        let mut m = MorphEngine::new(MorphConfig::default(), 2);
        assert_eq!(m.delay_ms(Some(10_000.0)), 9000.0);
        m.set_scroll(1000.0);
        assert_eq!(m.delay_ms(None), 4000.0 / 3.0);
        assert_eq!(m.delay_ms(Some(10_000.0)), 9000.0);
    }
}
