//! Grid geometry and pointer-to-cell resolution.
//!
//! The rendered grid is laid out in pixel space as a border, then `cols`
//! cells of `cell_size` separated by `cell_gap`, then the border again:
//!
//! ```text
//! |border| cell |gap| cell |gap| ... | cell |border|
//! ```
//!
//! The same layout applies vertically with `rows`.

use std::fmt;
use std::str::FromStr;

use crate::error::FrameError;

/// Number of LEDs driven by one shift register.
pub const BITS_PER_REGISTER: usize = 8;

/// Largest grid accepted, in cells.
pub const MAX_CELLS: usize = 1 << 20;

/// How pointer positions that land in the gap between cells are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    /// Every in-bounds position maps to a cell; gap pixels resolve by floor
    /// to the cell whose period they fall in.
    GapExclusive,
    /// Positions inside a gap resolve to no cell.
    #[default]
    GapAware,
}

impl GapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapPolicy::GapExclusive => "gap-exclusive",
            GapPolicy::GapAware => "gap-aware",
        }
    }
}

impl fmt::Display for GapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GapPolicy {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gap-exclusive" | "exclusive" | "strict" => Ok(GapPolicy::GapExclusive),
            "gap-aware" | "aware" => Ok(GapPolicy::GapAware),
            other => Err(FrameError::InvalidConfiguration(format!(
                "unknown gap policy '{other}', expected 'gap-exclusive' or 'gap-aware'"
            ))),
        }
    }
}

/// One addressable LED position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Grid dimensions plus the pixel layout constants used for resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f64,
    pub cell_gap: f64,
    pub border_width: f64,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self {
            rows: 18,
            cols: 54,
            cell_size: 25.0,
            cell_gap: 5.0,
            border_width: 25.0,
        }
    }
}

impl GridGeometry {
    /// Create a validated geometry.
    pub fn new(
        rows: usize,
        cols: usize,
        cell_size: f64,
        cell_gap: f64,
        border_width: f64,
    ) -> Result<Self, FrameError> {
        let geometry = Self {
            rows,
            cols,
            cell_size,
            cell_gap,
            border_width,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<(), FrameError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(FrameError::InvalidConfiguration(format!(
                "grid must have at least one row and column, got {}x{}",
                self.rows, self.cols
            )));
        }
        match self.rows.checked_mul(self.cols) {
            Some(cells) if cells <= MAX_CELLS => {}
            _ => {
                return Err(FrameError::InvalidConfiguration(format!(
                    "{}x{} grid exceeds the {MAX_CELLS} cell limit",
                    self.rows, self.cols
                )))
            }
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(FrameError::InvalidConfiguration(format!(
                "cell size must be a positive number, got {}",
                self.cell_size
            )));
        }
        if !self.cell_gap.is_finite() || self.cell_gap < 0.0 {
            return Err(FrameError::InvalidConfiguration(format!(
                "cell gap must be a non-negative number, got {}",
                self.cell_gap
            )));
        }
        if !self.border_width.is_finite() || self.border_width < 0.0 {
            return Err(FrameError::InvalidConfiguration(format!(
                "border width must be a non-negative number, got {}",
                self.border_width
            )));
        }
        Ok(())
    }

    /// Number of 8-bit registers needed per row.
    pub fn register_count(&self) -> usize {
        self.cols.div_ceil(BITS_PER_REGISTER)
    }

    /// Distance between the leading edges of adjacent cells.
    pub fn pitch(&self) -> f64 {
        self.cell_size + self.cell_gap
    }

    /// Total pixel width of the rendered grid, borders included.
    pub fn width(&self) -> f64 {
        self.extent(self.cols)
    }

    /// Total pixel height of the rendered grid, borders included.
    pub fn height(&self) -> f64 {
        self.extent(self.rows)
    }

    fn extent(&self, count: usize) -> f64 {
        count as f64 * self.cell_size
            + count.saturating_sub(1) as f64 * self.cell_gap
            + 2.0 * self.border_width
    }

    /// Top-left pixel of a cell.
    pub fn cell_origin(&self, cell: CellRef) -> (f64, f64) {
        (
            self.border_width + cell.col as f64 * self.pitch(),
            self.border_width + cell.row as f64 * self.pitch(),
        )
    }

    /// Pixel center of a cell, where the LED is drawn.
    pub fn cell_center(&self, cell: CellRef) -> (f64, f64) {
        let (x, y) = self.cell_origin(cell);
        let half = self.cell_size * 0.5;
        (x + half, y + half)
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }
}

/// Maps pointer positions to grid cells for a fixed geometry and gap policy.
#[derive(Debug, Clone, Copy)]
pub struct CellResolver {
    geometry: GridGeometry,
    policy: GapPolicy,
}

impl CellResolver {
    pub fn new(geometry: GridGeometry, policy: GapPolicy) -> Self {
        Self { geometry, policy }
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn policy(&self) -> GapPolicy {
        self.policy
    }

    /// Resolve a pointer position to a cell.
    ///
    /// Returns `None` when the pointer is outside the clickable area, inside a
    /// gap under [`GapPolicy::GapAware`], or not a finite number.
    pub fn resolve(&self, x: f64, y: f64) -> Option<CellRef> {
        let col = self.axis_index(x, self.geometry.width(), self.geometry.cols)?;
        let row = self.axis_index(y, self.geometry.height(), self.geometry.rows)?;
        Some(CellRef { row, col })
    }

    fn axis_index(&self, pos: f64, extent: f64, count: usize) -> Option<usize> {
        if !pos.is_finite() {
            return None;
        }
        let g = &self.geometry;

        // The clickable upper bound stops one gap short of the trailing
        // border, which also trims the last cell by one gap width.
        let upper = extent - g.border_width - g.cell_gap;
        if pos < g.border_width || pos >= upper {
            return None;
        }

        let offset = pos - g.border_width;
        let pitch = g.pitch();
        let index = (offset / pitch).floor();

        if self.policy == GapPolicy::GapAware {
            // A remainder of exactly cell_size is the cell's own trailing edge.
            let within = offset - index * pitch;
            if within > g.cell_size {
                return None;
            }
        }

        let index = index as usize;
        (index < count).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GridGeometry {
        GridGeometry::new(3, 10, 25.0, 5.0, 25.0).unwrap()
    }

    #[test]
    fn default_extent_matches_canvas() {
        let g = GridGeometry::default();
        assert_eq!(g.width(), 1665.0);
        assert_eq!(g.height(), 565.0);
        assert_eq!(g.register_count(), 7);
    }

    #[test]
    fn register_count_rounds_up() {
        let mut g = small();
        for (cols, expected) in [(1, 1), (8, 1), (9, 2), (16, 2), (17, 3), (54, 7)] {
            g.cols = cols;
            assert_eq!(g.register_count(), expected, "cols={cols}");
        }
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        assert!(matches!(
            GridGeometry::new(0, 4, 25.0, 5.0, 25.0),
            Err(FrameError::InvalidConfiguration(_))
        ));
        assert!(GridGeometry::new(4, 4, 0.0, 5.0, 25.0).is_err());
        assert!(GridGeometry::new(4, 4, 25.0, -1.0, 25.0).is_err());
        assert!(GridGeometry::new(4, 4, 25.0, 5.0, f64::NAN).is_err());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        assert!(matches!(
            GridGeometry::new(1 << 32, 1 << 32, 25.0, 5.0, 25.0),
            Err(FrameError::InvalidConfiguration(_))
        ));
        assert!(GridGeometry::new(usize::MAX, 2, 25.0, 5.0, 25.0).is_err());
        assert!(GridGeometry::new(MAX_CELLS + 1, 1, 25.0, 5.0, 25.0).is_err());
        assert!(GridGeometry::new(1024, 1024, 1.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn parse_gap_policy() {
        assert_eq!("gap-aware".parse::<GapPolicy>().unwrap(), GapPolicy::GapAware);
        assert_eq!(
            "Gap-Exclusive".parse::<GapPolicy>().unwrap(),
            GapPolicy::GapExclusive
        );
        assert!(matches!(
            "sometimes".parse::<GapPolicy>(),
            Err(FrameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn cell_centers_resolve_under_both_policies() {
        let g = small();
        for policy in [GapPolicy::GapExclusive, GapPolicy::GapAware] {
            let resolver = CellResolver::new(g, policy);
            for row in 0..g.rows {
                // The last column's far side is clipped, its center is not.
                for col in 0..g.cols {
                    let cell = CellRef::new(row, col);
                    let (x, y) = g.cell_center(cell);
                    assert_eq!(resolver.resolve(x, y), Some(cell), "{policy} {cell:?}");
                    let (ox, oy) = g.cell_origin(cell);
                    assert_eq!(resolver.resolve(ox + 1.0, oy + 1.0), Some(cell));
                }
            }
        }
    }

    #[test]
    fn gap_positions() {
        let g = small();
        let aware = CellResolver::new(g, GapPolicy::GapAware);
        let exclusive = CellResolver::new(g, GapPolicy::GapExclusive);

        // Horizontal gap between columns 3 and 4, vertically inside row 1.
        let (_, y) = g.cell_center(CellRef::new(1, 0));
        let x = 25.0 + 3.0 * 30.0 + 27.5;
        assert_eq!(aware.resolve(x, y), None);
        assert_eq!(exclusive.resolve(x, y), Some(CellRef::new(1, 3)));

        // Vertical gap below row 0.
        let (x, _) = g.cell_center(CellRef::new(0, 2));
        let y = 25.0 + 26.0;
        assert_eq!(aware.resolve(x, y), None);
        assert_eq!(exclusive.resolve(x, y), Some(CellRef::new(0, 2)));
    }

    #[test]
    fn boundaries_resolve_by_floor() {
        let g = small();
        let aware = CellResolver::new(g, GapPolicy::GapAware);
        let y = g.cell_center(CellRef::new(0, 0)).1;

        // Leading border edge is inside column 0.
        assert_eq!(aware.resolve(25.0, y), Some(CellRef::new(0, 0)));
        // Trailing edge of a cell still belongs to it.
        assert_eq!(aware.resolve(50.0, y), Some(CellRef::new(0, 0)));
        // Start of the next period belongs to the next cell.
        assert_eq!(aware.resolve(55.0, y), Some(CellRef::new(0, 1)));
    }

    #[test]
    fn outside_grid_is_none() {
        let g = small();
        for policy in [GapPolicy::GapExclusive, GapPolicy::GapAware] {
            let r = CellResolver::new(g, policy);
            let (cx, cy) = g.cell_center(CellRef::new(1, 1));
            assert_eq!(r.resolve(24.9, cy), None);
            assert_eq!(r.resolve(cx, 24.9), None);
            assert_eq!(r.resolve(g.width() - 25.0, cy), None);
            assert_eq!(r.resolve(cx, g.height() - 25.0), None);
            assert_eq!(r.resolve(-3.0, cy), None);
            assert_eq!(r.resolve(cx, -0.5), None);
            assert_eq!(r.resolve(g.width() + 100.0, g.height() + 100.0), None);
        }
    }

    #[test]
    fn non_finite_is_none() {
        let r = CellResolver::new(small(), GapPolicy::GapExclusive);
        assert_eq!(r.resolve(f64::NAN, 40.0), None);
        assert_eq!(r.resolve(40.0, f64::NAN), None);
        assert_eq!(r.resolve(f64::INFINITY, 40.0), None);
        assert_eq!(r.resolve(40.0, f64::NEG_INFINITY), None);
    }

    #[test]
    fn trailing_gap_is_trimmed_from_last_cell() {
        let g = small();
        let r = CellResolver::new(g, GapPolicy::GapExclusive);
        let y = g.cell_center(CellRef::new(0, 0)).1;
        // Last column spans [295, 320); the clickable area ends at 315.
        let upper = g.width() - g.border_width - g.cell_gap;
        assert_eq!(upper, 315.0);
        assert_eq!(r.resolve(314.9, y), Some(CellRef::new(0, 9)));
        assert_eq!(r.resolve(315.0, y), None);
        assert_eq!(r.resolve(318.0, y), None);
    }

    #[test]
    fn zero_gap_has_no_dead_space() {
        let g = GridGeometry::new(2, 2, 10.0, 0.0, 0.0).unwrap();
        let r = CellResolver::new(g, GapPolicy::GapAware);
        assert_eq!(r.resolve(0.0, 0.0), Some(CellRef::new(0, 0)));
        assert_eq!(r.resolve(10.0, 19.9), Some(CellRef::new(1, 1)));
        assert_eq!(r.resolve(20.0, 5.0), None);
    }
}
