use std::time::Instant;

use gpui::{Pixels, px};
use gpui_outline_core::DragTick;

/// Turns pointer positions during a drag into [`DragTick`]s: translation
/// from where the drag started, velocity from the previous sample.
pub(crate) struct GestureTracker {
    origin_y: Pixels,
    last_y: Pixels,
    last_at: Instant,
}

impl GestureTracker {
    pub(crate) fn new(origin_y: Pixels) -> Self {
        Self {
            origin_y,
            last_y: origin_y,
            last_at: Instant::now(),
        }
    }

    pub(crate) fn tick(&mut self, y: Pixels) -> DragTick {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_at).as_secs_f32();
        let delta = (y - self.last_y) / px(1.);
        // Two samples within the same instant still carry a direction.
        let velocity = if elapsed > 0. { delta / elapsed } else { delta };

        self.last_y = y;
        self.last_at = now;
        DragTick::new(velocity, (y - self.origin_y) / px(1.))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_is_measured_from_origin() {
        let mut tracker = GestureTracker::new(px(100.));
        let first = tracker.tick(px(120.));
        assert_eq!(first.translation, 20.);
        assert!(first.velocity > 0.);

        let second = tracker.tick(px(110.));
        assert_eq!(second.translation, 10.);
        assert!(second.velocity < 0.);

        let still = tracker.tick(px(110.));
        assert_eq!(still.velocity, 0.);
    }
}
