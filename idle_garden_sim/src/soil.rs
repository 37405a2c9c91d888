// Dense soil fertility grid over the garden rectangle.
//
// The garden is cut into square plots of `soil_cell_size` pixels, stored as a
// flat `Vec<Fertility>` indexed by `col + row * cols`, giving O(1) lookup from
// a garden point to its plot. The last column and row are clipped to the
// garden edge when the garden size is not a multiple of the cell size.
//
// Fertility is an ordinal tier 0..=2. `Fertility` makes out-of-range tiers
// unrepresentable: construction from a raw `u8` either validates (`new`) or
// clamps (`clamped`), and `degrade`/`improve` saturate. The grid has no
// per-tick behavior; it is written by harvests (degrade), fertilizer
// (improve) and, depending on config, plant death.
//
// The grid is built once from config and never resized. On load its tiers are
// overwritten from the save (see `save.rs`).
//
// See also: `sim.rs` which owns the `SoilGrid`, `plant.rs` for the plot a
// plant records at placement.

use crate::types::{PlotIndex, Point, Rect};
use tracing::warn;

/// Fertility tier of a soil plot: 0 (low), 1 (medium) or 2 (high).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fertility(u8);

impl Fertility {
    pub const LOW: Fertility = Fertility(0);
    pub const MEDIUM: Fertility = Fertility(1);
    pub const HIGH: Fertility = Fertility(2);
    pub const MAX: Fertility = Fertility::HIGH;

    /// `None` if `tier` is out of range.
    pub fn new(tier: u8) -> Option<Fertility> {
        (tier <= Self::MAX.0).then_some(Fertility(tier))
    }

    pub fn clamped(tier: u8) -> Fertility {
        Fertility(tier.min(Self::MAX.0))
    }

    pub fn tier(self) -> u8 {
        self.0
    }

    pub fn degraded(self) -> Fertility {
        Fertility(self.0.saturating_sub(1))
    }

    pub fn improved(self) -> Fertility {
        Fertility((self.0 + 1).min(Self::MAX.0))
    }
}

/// Dense 2D fertility grid.
#[derive(Clone, Debug)]
pub struct SoilGrid {
    bounds: Rect,
    cell: i32,
    cols: u32,
    rows: u32,
    /// Flat storage: index = col + row * cols.
    tiers: Vec<Fertility>,
}

impl SoilGrid {
    /// Cover `bounds` with square plots of side `cell`, all at `initial`.
    /// A non-positive `cell` or empty `bounds` yields an empty grid.
    pub fn new(bounds: Rect, cell: i32, initial: Fertility) -> Self {
        let (cols, rows) = Self::dimensions_for(bounds, cell);
        Self {
            bounds,
            cell,
            cols,
            rows,
            tiers: vec![initial; cols as usize * rows as usize],
        }
    }

    /// Columns and rows a grid over `bounds` with cell size `cell` has.
    pub fn dimensions_for(bounds: Rect, cell: i32) -> (u32, u32) {
        if cell > 0 && bounds.w > 0 && bounds.h > 0 {
            (
                (bounds.w as u32).div_ceil(cell as u32),
                (bounds.h as u32).div_ceil(cell as u32),
            )
        } else {
            (0, 0)
        }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    /// The plot under `point`, or `None` outside the garden.
    pub fn find_plot(&self, point: Point) -> Option<PlotIndex> {
        if self.cell <= 0 || !self.bounds.contains(point) {
            return None;
        }
        let col = ((point.x - self.bounds.x) / self.cell) as u32;
        let row = ((point.y - self.bounds.y) / self.cell) as u32;
        Some(PlotIndex(col + row * self.cols))
    }

    /// The garden-space rectangle covered by a plot, clipped to the garden.
    pub fn plot_rect(&self, plot: PlotIndex) -> Option<Rect> {
        if plot.0 as usize >= self.tiers.len() {
            return None;
        }
        let col = (plot.0 % self.cols) as i32;
        let row = (plot.0 / self.cols) as i32;
        let x = self.bounds.x + col * self.cell;
        let y = self.bounds.y + row * self.cell;
        let w = self.cell.min(self.bounds.right() - x);
        let h = self.cell.min(self.bounds.top() - y);
        Some(Rect::new(x, y, w, h))
    }

    pub fn fertility(&self, plot: PlotIndex) -> Option<Fertility> {
        self.tiers.get(plot.0 as usize).copied()
    }

    /// Lower a plot by one tier (floor 0). Returns the new tier.
    pub fn degrade(&mut self, plot: PlotIndex) -> Option<Fertility> {
        self.update(plot, Fertility::degraded)
    }

    /// Raise a plot by one tier (ceiling 2). Returns the new tier.
    pub fn improve(&mut self, plot: PlotIndex) -> Option<Fertility> {
        self.update(plot, Fertility::improved)
    }

    pub fn set(&mut self, plot: PlotIndex, fertility: Fertility) {
        if let Some(slot) = self.tiers.get_mut(plot.0 as usize) {
            *slot = fertility;
        } else {
            warn!(plot = plot.0, len = self.tiers.len(), "set on missing soil plot ignored");
        }
    }

    /// Raw tiers in index order, for saving.
    pub fn tiers(&self) -> impl Iterator<Item = u8> + '_ {
        self.tiers.iter().map(|f| f.tier())
    }

    fn update(&mut self, plot: PlotIndex, f: impl FnOnce(Fertility) -> Fertility) -> Option<Fertility> {
        match self.tiers.get_mut(plot.0 as usize) {
            Some(slot) => {
                *slot = f(*slot);
                Some(*slot)
            }
            None => {
                warn!(plot = plot.0, len = self.tiers.len(), "soil plot out of range");
                None
            }
        }
    }
}
