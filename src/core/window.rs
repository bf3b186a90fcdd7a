//! Virtual-scroll windowing.
//!
//! Computes which rows of a fixed-size list need to exist for a given
//! scroll position. Everything here is pure and cheap enough to run on every
//! scroll or resize event.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Inclusive index range of rows to render.
///
/// Always satisfies `start_index <= end_index < total_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibleWindow {
    /// First row to render.
    pub start_index: usize,
    /// Last row to render.
    pub end_index: usize,
}

impl VisibleWindow {
    /// Number of rows in the window.
    pub const fn len(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// Always `false`: a window exists only for a non-empty list and holds at
    /// least one row. Kept so `len` has its usual companion.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `index` falls inside the window.
    pub const fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index
    }

    /// Row indices to render.
    pub const fn indices(&self) -> RangeInclusive<usize> {
        self.start_index..=self.end_index
    }

    /// Height of the spacer above the first rendered row.
    #[allow(clippy::cast_precision_loss)]
    pub fn leading_offset(&self, item_size: f64) -> f64 {
        self.start_index as f64 * sanitize_item_size(item_size)
    }

    /// Height of the spacer below the last rendered row.
    #[allow(clippy::cast_precision_loss)]
    pub fn trailing_offset(&self, item_size: f64, total_items: usize) -> f64 {
        total_items.saturating_sub(self.end_index + 1) as f64 * sanitize_item_size(item_size)
    }
}

fn sanitize_item_size(item_size: f64) -> f64 {
    if item_size.is_finite() && item_size >= 1.0 {
        item_size
    } else {
        1.0
    }
}

fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Visible row range for a virtualized list.
///
/// `start = max(0, floor(scroll_offset / item_size) - overscan)`, then every
/// row overlapping `[scroll_offset, scroll_offset + container_size)` (a
/// partly visible bottom row included) plus `overscan` rows on each side,
/// clamped to the list. Returns `None` for an empty list.
///
/// Negative or non-finite offsets and sizes are treated as zero, item sizes
/// below one are treated as one, and scrolling past the end pins the window
/// to the last row.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn compute_visible_range(
    scroll_offset: f64,
    container_size: f64,
    item_size: f64,
    total_items: usize,
    overscan: usize,
) -> Option<VisibleWindow> {
    if total_items == 0 {
        return None;
    }
    let item_size = sanitize_item_size(item_size);
    let scroll_offset = sanitize_extent(scroll_offset);
    let container_size = sanitize_extent(container_size);
    let last = total_items - 1;

    let first_visible = (scroll_offset / item_size).floor() as usize;
    let start = first_visible.saturating_sub(overscan);
    let last_visible_end = ((scroll_offset + container_size) / item_size).ceil() as usize;
    let visible_count = last_visible_end.saturating_sub(first_visible);
    let span = visible_count
        .saturating_add(overscan.saturating_mul(2))
        .saturating_sub(1);
    let end = start.saturating_add(span).min(last);

    Some(VisibleWindow {
        start_index: start.min(end),
        end_index: end,
    })
}

/// Window computation bound to a fixed row size and overscan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowCalculator {
    /// Row size in pixels.
    pub item_size: f64,
    /// Extra rows rendered on each side.
    pub overscan: usize,
}

impl WindowCalculator {
    /// Create a calculator.
    pub const fn new(item_size: f64, overscan: usize) -> Self {
        Self {
            item_size,
            overscan,
        }
    }

    /// Visible range for the current scroll state.
    pub fn visible_range(
        &self,
        scroll_offset: f64,
        container_size: f64,
        total_items: usize,
    ) -> Option<VisibleWindow> {
        compute_visible_range(
            scroll_offset,
            container_size,
            self.item_size,
            total_items,
            self.overscan,
        )
    }

    /// Total scrollable extent of the list.
    #[allow(clippy::cast_precision_loss)]
    pub fn content_size(&self, total_items: usize) -> f64 {
        total_items as f64 * sanitize_item_size(self.item_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_case() {
        let w = compute_visible_range(0.0, 500.0, 50.0, 100, 0).unwrap();
        assert_eq!(w, VisibleWindow { start_index: 0, end_index: 9 });
        assert_eq!(w.len(), 10);
        assert_eq!(w.len(), w.indices().count());
        assert!(!w.is_empty());
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(compute_visible_range(0.0, 500.0, 50.0, 0, 3), None);
        assert_eq!(compute_visible_range(1e9, 500.0, 50.0, 0, 0), None);
    }

    #[test]
    fn test_overscan_both_sides() {
        // Row 20 is first visible; 10 visible rows; 2 rows overscan each side.
        let w = compute_visible_range(1000.0, 500.0, 50.0, 100, 2).unwrap();
        assert_eq!(w.start_index, 18);
        assert_eq!(w.end_index, 18 + 10 + 4 - 1);
    }

    #[test]
    fn test_clamped_at_end() {
        let w = compute_visible_range(4800.0, 500.0, 50.0, 100, 2).unwrap();
        assert_eq!(w.end_index, 99);
        assert!(w.start_index <= w.end_index);

        let past = compute_visible_range(1e7, 500.0, 50.0, 100, 2).unwrap();
        assert_eq!(past, VisibleWindow { start_index: 99, end_index: 99 });
    }

    #[test]
    fn test_degenerate_inputs() {
        let w = compute_visible_range(-30.0, f64::NAN, 0.0, 5, 0).unwrap();
        assert_eq!(w, VisibleWindow { start_index: 0, end_index: 0 });
        let w = compute_visible_range(0.0, 500.0, 50.0, 3, 0).unwrap();
        assert_eq!(w.end_index, 2);
    }

    #[test]
    fn test_partly_visible_bottom_row_included() {
        // Viewport covers pixels 20..520, so row 10 (500..550) is on screen.
        let w = compute_visible_range(20.0, 500.0, 50.0, 100, 0).unwrap();
        assert_eq!(w, VisibleWindow { start_index: 0, end_index: 10 });

        let w = compute_visible_range(1025.0, 500.0, 50.0, 100, 0).unwrap();
        assert_eq!(w, VisibleWindow { start_index: 20, end_index: 30 });
        assert!(w.contains(30));
    }

    #[test]
    fn test_spacers() {
        let calc = WindowCalculator::new(50.0, 0);
        let w = calc.visible_range(1000.0, 500.0, 100).unwrap();
        assert!((w.leading_offset(50.0) - 1000.0).abs() < f64::EPSILON);
        assert!((w.trailing_offset(50.0, 100) - 3500.0).abs() < f64::EPSILON);
        assert!((calc.content_size(100) - 5000.0).abs() < f64::EPSILON);
    }
}
