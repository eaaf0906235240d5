use glam::Vec2;

/// Client-space position to normalized device coordinates of the box at
/// `origin` with `size` (x right, y up).
#[inline]
pub fn client_ndc(client: Vec2, origin: Vec2, size: Vec2) -> Vec2 {
    let local = client - origin;
    let w = size.x.max(1.0);
    let h = size.y.max(1.0);
    Vec2::new((local.x / w) * 2.0 - 1.0, 1.0 - (local.y / h) * 2.0)
}

/// A sideways gesture rotates the sphere; anything else scrolls the page.
#[inline]
pub fn primarily_horizontal(delta: Vec2) -> bool {
    delta.x.abs() > delta.y.abs()
}

/// One-finger touch bookkeeping between touchstart and touchend.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchGesture {
    start: Vec2,
    last: Vec2,
    active: bool,
}

impl TouchGesture {
    pub fn begin(&mut self, at: Vec2) {
        self.start = at;
        self.last = at;
        self.active = true;
    }

    /// Record a move. Returns true when the page should not scroll.
    pub fn update(&mut self, at: Vec2) -> bool {
        self.last = at;
        self.active && primarily_horizontal(at - self.start)
    }

    /// touchend carries no coordinates; release where the finger was last seen.
    pub fn end(&mut self) -> Option<Vec2> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(self.last)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
