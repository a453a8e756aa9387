//! Grid measurement.
//!
//! How many photos share a row depends on the rendered layout, not on
//! configuration, so the gallery asks a [`LayoutProbe`] for item positions
//! and counts the first row itself.

/// Used when there is nothing to measure.
pub const DEFAULT_ITEMS_PER_ROW: usize = 4;

/// Read-only access to the rendered grid.
pub trait LayoutProbe {
    /// Vertical offsets of the first `item_count` grid items, as they would
    /// sit with every item displayed. `None` when no grid is rendered.
    ///
    /// Implementations must not change what is currently shown.
    fn item_tops(&mut self, item_count: usize) -> Option<Vec<f32>>;

    /// Whether a grid container exists at all.
    fn grid_present(&mut self) -> bool {
        self.item_tops(0).is_some()
    }
}

/// Count the leading items whose top is within `epsilon` of the first one.
pub fn items_per_row(tops: &[f32], epsilon: f32) -> usize {
    let Some(&first) = tops.first() else {
        return DEFAULT_ITEMS_PER_ROW;
    };

    let in_first_row = tops
        .iter()
        .take_while(|&&top| (top - first).abs() < epsilon)
        .count();

    in_first_row.max(1)
}

/// Terminal grid: fixed-size cells packed left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridProbe {
    pub width: u16,
    pub cell_width: u16,
    pub cell_height: u16,
}

impl GridProbe {
    pub fn new(width: u16, cell_width: u16, cell_height: u16) -> Self {
        Self {
            width,
            cell_width: cell_width.max(1),
            cell_height: cell_height.max(1),
        }
    }

    pub fn columns(&self) -> usize {
        (self.width / self.cell_width).max(1) as usize
    }
}

impl LayoutProbe for GridProbe {
    fn item_tops(&mut self, item_count: usize) -> Option<Vec<f32>> {
        if self.width == 0 {
            return None;
        }
        let columns = self.columns();
        let tops = (0..item_count)
            .map(|i| ((i / columns) as f32) * f32::from(self.cell_height))
            .collect();
        Some(tops)
    }
}

/// A probe that always reports the same number of columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedColumns(pub usize);

impl LayoutProbe for FixedColumns {
    fn item_tops(&mut self, item_count: usize) -> Option<Vec<f32>> {
        let columns = self.0.max(1);
        Some((0..item_count).map(|i| (i / columns) as f32 * 100.0).collect())
    }
}

/// A probe with no grid rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGrid;

impl LayoutProbe for NoGrid {
    fn item_tops(&mut self, _item_count: usize) -> Option<Vec<f32>> {
        None
    }
}
