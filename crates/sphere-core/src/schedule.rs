use std::cell::Cell;
use std::rc::Rc;

/// Cancellation flag shared between a self-rescheduling task and its owner.
///
/// The task checks [`LoopHandle::is_cancelled`] before posting its next tick;
/// clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct LoopHandle(Rc<Cell<bool>>);

impl LoopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_cancellation() {
        let h = LoopHandle::new();
        let task_side = h.clone();
        assert!(!task_side.is_cancelled());
        h.cancel();
        assert!(task_side.is_cancelled());
    }
}
