//! Scroll-position observer that asks for the next page when the user gets
//! close to the bottom of the scroll container.

use eframe::egui;

/// Distance from the bottom (in points) that counts as "reached the end"
pub const BOTTOM_OFFSET: f32 = 200.0;
/// Minimum time between two load requests, in seconds
pub const DEBOUNCE_SECS: f64 = 0.5;

/// Geometry of a scroll container for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSnapshot {
    pub offset: f32,
    pub viewport: f32,
    pub content: f32,
}

impl ScrollSnapshot {
    pub fn from_output<R>(output: &egui::scroll_area::ScrollAreaOutput<R>) -> Self {
        Self {
            offset: output.state.offset.y,
            viewport: output.inner_rect.height(),
            content: output.content_size.y,
        }
    }

    /// Content that doesn't fill the viewport can't be scrolled, so it
    /// counts as being at the bottom.
    pub fn is_near_bottom(&self, threshold: f32) -> bool {
        self.content <= self.viewport || self.offset + self.viewport >= self.content - threshold
    }
}

/// Per-container trigger state, kept in egui temp memory
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InfiniteScroll {
    last_fired: Option<f64>,
}

impl InfiniteScroll {
    pub fn load(ctx: &egui::Context, id: egui::Id) -> Self {
        ctx.data(|d| d.get_temp::<Self>(id)).unwrap_or_default()
    }

    pub fn store(self, ctx: &egui::Context, id: egui::Id) {
        ctx.data_mut(|d| d.insert_temp(id, self));
    }

    /// Returns true when a load should fire at `now` and records it.
    pub fn poll(&mut self, snapshot: ScrollSnapshot, should_scroll: bool, now: f64) -> bool {
        if !should_scroll || !snapshot.is_near_bottom(BOTTOM_OFFSET) {
            return false;
        }
        if let Some(last) = self.last_fired {
            if now - last < DEBOUNCE_SECS {
                return false;
            }
        }
        self.last_fired = Some(now);
        true
    }
}

/// Runs the trigger for the container `id` and calls `on_load` when it fires.
pub fn use_infinite_scroll(
    ctx: &egui::Context,
    id: egui::Id,
    snapshot: ScrollSnapshot,
    should_scroll: bool,
    on_load: impl FnOnce(),
) -> bool {
    let now = ctx.input(|i| i.time);
    let mut state = InfiniteScroll::load(ctx, id);
    let fired = state.poll(snapshot, should_scroll, now);
    state.store(ctx, id);
    if fired {
        on_load();
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: f32) -> ScrollSnapshot {
        ScrollSnapshot { offset, viewport: 600.0, content: 3000.0 }
    }

    #[test]
    fn near_bottom_uses_offset_threshold() {
        assert!(!at(0.0).is_near_bottom(BOTTOM_OFFSET));
        assert!(!at(2199.0).is_near_bottom(BOTTOM_OFFSET));
        assert!(at(2200.0).is_near_bottom(BOTTOM_OFFSET));
        assert!(at(2400.0).is_near_bottom(BOTTOM_OFFSET));
    }

    #[test]
    fn short_content_counts_as_bottom() {
        let s = ScrollSnapshot { offset: 0.0, viewport: 800.0, content: 400.0 };
        assert!(s.is_near_bottom(BOTTOM_OFFSET));
    }

    #[test]
    fn fires_only_when_allowed() {
        let mut trigger = InfiniteScroll::default();
        assert!(!trigger.poll(at(2400.0), false, 0.0));
        assert!(!trigger.poll(at(0.0), true, 0.0));
        assert!(trigger.poll(at(2400.0), true, 0.0));
    }

    #[test]
    fn debounce_blocks_repeated_requests() {
        let mut trigger = InfiniteScroll::default();
        assert!(trigger.poll(at(2400.0), true, 10.0));
        assert!(!trigger.poll(at(2400.0), true, 10.2));
        assert!(!trigger.poll(at(2400.0), true, 10.49));
        assert!(trigger.poll(at(2400.0), true, 10.5));
    }

    #[test]
    fn state_survives_in_context_memory() {
        let ctx = egui::Context::default();
        let id = egui::Id::new("grid_scroll_test");
        let mut calls = 0;
        assert!(use_infinite_scroll(&ctx, id, at(2400.0), true, || calls += 1));
        assert!(!use_infinite_scroll(&ctx, id, at(2400.0), true, || calls += 1));
        assert_eq!(calls, 1);
        assert!(InfiniteScroll::load(&ctx, id).last_fired.is_some());
    }
}
