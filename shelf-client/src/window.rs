//! Fixed-size list virtualization
//!
//! Computes which indices of a long list need rendering for a given scroll
//! offset, so the rendered set stays bounded no matter how long the list is.
//! All item sizes are equal; variable sizes are not supported.

use serde::Serialize;

/// Items shown when the container or item size is unusable (zero or negative)
pub const DEFAULT_WINDOW_ITEMS: usize = 10;

/// Default overscan on each side of the visible area
pub const DEFAULT_OVERSCAN: usize = 3;

/// Inputs to the window calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowParams {
    pub scroll_offset: f64,
    pub item_size: f64,
    pub container_size: f64,
    pub overscan: usize,
    pub item_count: usize,
}

/// Inclusive range of indices to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
    pub indices: Vec<usize>,
}

impl VisibleRange {
    fn empty() -> Self {
        Self {
            start: 0,
            end: 0,
            indices: Vec::new(),
        }
    }

    fn span(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            indices: (start..=end).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

/// Compute the render window for `params`
pub fn visible_range(params: &WindowParams) -> VisibleRange {
    if params.item_count == 0 {
        return VisibleRange::empty();
    }
    let last = params.item_count - 1;

    if !(params.item_size > 0.0) || !(params.container_size > 0.0) {
        return VisibleRange::span(0, last.min(DEFAULT_WINDOW_ITEMS - 1));
    }

    let offset = params.scroll_offset.max(0.0);
    let first_visible = (offset / params.item_size).floor() as usize;
    let last_visible = ((offset + params.container_size) / params.item_size).ceil() as usize;

    let start = first_visible.saturating_sub(params.overscan).min(last);
    let end = last_visible.saturating_add(params.overscan).min(last);

    VisibleRange::span(start, end)
}

/// Scroll state of one virtualized list
///
/// Holds only the last scroll offset and container size; every query
/// recomputes from those.
#[derive(Debug, Clone)]
pub struct VirtualList {
    item_count: usize,
    item_size: f64,
    overscan: usize,
    scroll_offset: f64,
    container_size: f64,
}

impl VirtualList {
    pub fn new(item_count: usize, item_size: f64, container_size: f64) -> Self {
        Self {
            item_count,
            item_size,
            overscan: DEFAULT_OVERSCAN,
            scroll_offset: 0.0,
            container_size,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Record a scroll event and return the new window
    pub fn on_scroll(&mut self, offset: f64) -> VisibleRange {
        self.scroll_offset = offset.max(0.0);
        self.range()
    }

    /// Record a container resize and return the new window
    pub fn resize(&mut self, container_size: f64) -> VisibleRange {
        self.container_size = container_size;
        self.range()
    }

    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
    }

    /// Jump so that `index` is the first item, clamped to the scrollable range
    pub fn scroll_to_index(&mut self, index: usize) -> VisibleRange {
        let target = self.offset_of(index.min(self.item_count.saturating_sub(1)));
        self.scroll_offset = target.min(self.max_scroll_offset());
        self.range()
    }

    pub fn range(&self) -> VisibleRange {
        visible_range(&self.params())
    }

    pub fn params(&self) -> WindowParams {
        WindowParams {
            scroll_offset: self.scroll_offset,
            item_size: self.item_size,
            container_size: self.container_size,
            overscan: self.overscan,
            item_count: self.item_count,
        }
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Size of the whole list
    pub fn total_size(&self) -> f64 {
        self.item_count as f64 * self.item_size.max(0.0)
    }

    /// Leading edge of item `index`
    pub fn offset_of(&self, index: usize) -> f64 {
        index as f64 * self.item_size.max(0.0)
    }

    fn max_scroll_offset(&self) -> f64 {
        (self.total_size() - self.container_size.max(0.0)).max(0.0)
    }
}
