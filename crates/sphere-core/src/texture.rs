//! Ordered texture slots with placeholder substitution.
//!
//! `H` is whatever handle the renderer hands back for an uploaded image. Every
//! slot resolves to a usable handle from the start: until its load lands, the
//! placeholder stands in.

use crate::config::TextureKind;
use crate::error::{Result, SceneError};

#[derive(Clone, Debug, PartialEq)]
enum Slot<H> {
    Placeholder,
    Loaded { handle: H, duration_ms: Option<f64> },
    Failed,
}

#[derive(Clone, Debug)]
pub struct TextureSet<H: Clone> {
    placeholder: H,
    kinds: Vec<TextureKind>,
    slots: Vec<Slot<H>>,
}

impl<H: Clone> TextureSet<H> {
    pub fn new(placeholder: H, kinds: Vec<TextureKind>) -> Self {
        let slots = vec![Slot::Placeholder; kinds.len()];
        Self {
            placeholder,
            kinds,
            slots,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn kind(&self, index: usize) -> Option<TextureKind> {
        self.kinds.get(index).copied()
    }

    /// Handle to bind for `index`; the placeholder unless a load completed.
    pub fn handle(&self, index: usize) -> H {
        match self.slots.get(index) {
            Some(Slot::Loaded { handle, .. }) => handle.clone(),
            _ => self.placeholder.clone(),
        }
    }

    pub fn install(&mut self, index: usize, handle: H) -> Result<()> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SceneError::TextureIndex(index))?;
        let duration_ms = match slot {
            Slot::Loaded { duration_ms, .. } => *duration_ms,
            _ => None,
        };
        *slot = Slot::Loaded {
            handle,
            duration_ms,
        };
        Ok(())
    }

    /// Record a failed load. The placeholder keeps standing in; there is no retry.
    pub fn mark_failed(&mut self, index: usize) -> Result<()> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SceneError::TextureIndex(index))?;
        if !matches!(slot, Slot::Loaded { .. }) {
            *slot = Slot::Failed;
        }
        Ok(())
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Loaded { .. }))
    }

    pub fn is_failed(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Slot::Failed))
    }

    pub fn set_video_duration(&mut self, index: usize, seconds: f64) -> Result<()> {
        match self.slots.get_mut(index) {
            Some(Slot::Loaded { duration_ms, .. }) => {
                *duration_ms = (seconds.is_finite() && seconds > 0.0).then(|| seconds * 1000.0);
                Ok(())
            }
            Some(_) => Err(SceneError::TextureLoad {
                index,
                reason: "video duration reported before the texture loaded".into(),
            }),
            None => Err(SceneError::TextureIndex(index)),
        }
    }

    /// Duration of a loaded video texture at `index`, if it is one.
    pub fn video_duration_ms(&self, index: usize) -> Option<f64> {
        if self.kind(index) != Some(TextureKind::Video) {
            return None;
        }
        match self.slots.get(index) {
            Some(Slot::Loaded { duration_ms, .. }) => *duration_ms,
            _ => None,
        }
    }

    /// Slots fetched in the background once the first texture is up.
    pub fn lazy_indices(&self) -> std::ops::Range<usize> {
        1usize.min(self.len())..self.len()
    }
}
