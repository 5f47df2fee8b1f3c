//! Grid state plus its packed form, driven one pointer tick at a time.

use crate::error::FrameError;
use crate::geometry::{CellRef, CellResolver, GapPolicy, GridGeometry};
use crate::grid::GridState;
use crate::pack::{pack, ByteMatrix};
use crate::sink::{FrameSink, NullSink};

/// Pointer button held during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Paints cells on.
    Left,
    /// Paints cells off.
    Right,
    Middle,
}

impl Button {
    fn paint_value(self) -> Option<bool> {
        match self {
            Button::Left => Some(true),
            Button::Right => Some(false),
            Button::Middle => None,
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No painting button held.
    Idle,
    /// Pointer outside the grid or in a gap.
    Miss,
    /// Cell already had the painted value.
    Unchanged(CellRef),
    /// Cell flipped and the byte matrix was recomputed.
    Changed(CellRef),
}

/// Owns the LED grid and keeps its byte matrix in sync.
///
/// The byte matrix is recomputed in full, and handed to the sink, only when a
/// mutation actually changes the grid.
pub struct FrameModel<S = NullSink> {
    resolver: CellResolver,
    grid: GridState,
    bytes: ByteMatrix,
    generation: u64,
    sink: S,
}

impl FrameModel<NullSink> {
    pub fn new(geometry: GridGeometry, policy: GapPolicy) -> Result<Self, FrameError> {
        Self::with_sink(geometry, policy, NullSink)
    }
}

impl<S: FrameSink> FrameModel<S> {
    pub fn with_sink(geometry: GridGeometry, policy: GapPolicy, sink: S) -> Result<Self, FrameError> {
        geometry.validate()?;
        let grid = GridState::new(geometry.rows, geometry.cols);
        let bytes = pack(&grid);
        Ok(Self {
            resolver: CellResolver::new(geometry, policy),
            grid,
            bytes,
            generation: 0,
            sink,
        })
    }

    pub fn geometry(&self) -> &GridGeometry {
        self.resolver.geometry()
    }

    pub fn policy(&self) -> GapPolicy {
        self.resolver.policy()
    }

    pub fn resolve(&self, x: f64, y: f64) -> Option<CellRef> {
        self.resolver.resolve(x, y)
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn bytes(&self) -> &ByteMatrix {
        &self.bytes
    }

    /// Number of recomputes since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Process one pointer sample while a button may be held.
    pub fn tick(&mut self, x: f64, y: f64, button: Option<Button>) -> Tick {
        let Some(on) = button.and_then(Button::paint_value) else {
            return Tick::Idle;
        };
        let Some(cell) = self.resolver.resolve(x, y) else {
            return Tick::Miss;
        };
        match self.grid.set_cell(cell, on) {
            Ok(true) => {
                self.recompute();
                Tick::Changed(cell)
            }
            Ok(false) => Tick::Unchanged(cell),
            Err(err) => {
                debug_assert!(false, "resolver produced {cell:?} outside the grid: {err}");
                Tick::Miss
            }
        }
    }

    /// Set one cell directly, recomputing only if it changed.
    pub fn set_cell(&mut self, row: usize, col: usize, on: bool) -> Result<bool, FrameError> {
        let changed = self.grid.set(row, col, on)?;
        if changed {
            self.recompute();
        }
        Ok(changed)
    }

    /// Apply a batch of edits with a single recompute at the end.
    ///
    /// Every edit is bounds-checked before any is applied, so a failing batch
    /// leaves the grid untouched. Returns the number of cells that changed.
    pub fn apply<I>(&mut self, edits: I) -> Result<usize, FrameError>
    where
        I: IntoIterator<Item = (CellRef, bool)>,
    {
        let edits: Vec<(CellRef, bool)> = edits.into_iter().collect();
        for (cell, _) in &edits {
            self.grid.get(cell.row, cell.col)?;
        }

        let mut changed = 0;
        for (cell, on) in edits {
            if self.grid.set_cell(cell, on)? {
                changed += 1;
            }
        }
        if changed > 0 {
            self.recompute();
        }
        Ok(changed)
    }

    /// Turn every LED off.
    pub fn reset(&mut self) {
        if self.grid.count_on() == 0 {
            return;
        }
        self.grid.reset();
        self.recompute();
    }

    /// Replace the whole grid, e.g. with one parsed from a file.
    pub fn load(&mut self, grid: GridState) -> Result<(), FrameError> {
        let g = self.geometry();
        if grid.rows() != g.rows || grid.cols() != g.cols {
            return Err(FrameError::InvalidConfiguration(format!(
                "grid is {}x{}, model expects {}x{}",
                grid.rows(),
                grid.cols(),
                g.rows,
                g.cols
            )));
        }
        if grid != self.grid {
            self.grid = grid;
            self.recompute();
        }
        Ok(())
    }

    fn recompute(&mut self) {
        self.bytes = pack(&self.grid);
        self.generation += 1;
        log::debug!(
            "recomputed frame generation {} ({} LEDs on)",
            self.generation,
            self.grid.count_on()
        );
        self.sink.send(&self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> FrameModel<Vec<ByteMatrix>> {
        FrameModel::with_sink(GridGeometry::default(), GapPolicy::GapAware, Vec::new()).unwrap()
    }

    fn center(model: &FrameModel<Vec<ByteMatrix>>, row: usize, col: usize) -> (f64, f64) {
        model.geometry().cell_center(CellRef::new(row, col))
    }

    #[test]
    fn left_paints_right_erases() {
        let mut m = model();
        let (x, y) = center(&m, 0, 7);
        assert_eq!(m.tick(x, y, Some(Button::Left)), Tick::Changed(CellRef::new(0, 7)));
        assert_eq!(m.bytes().get(0, 0), 1);
        assert_eq!(m.tick(x, y, Some(Button::Right)), Tick::Changed(CellRef::new(0, 7)));
        assert!(m.bytes().is_zero());
        assert_eq!(m.generation(), 2);
        assert_eq!(m.sink().len(), 2);
    }

    #[test]
    fn ticks_only_report_cells_inside_the_grid() {
        let geometry = GridGeometry::new(3, 5, 10.0, 4.0, 6.0).unwrap();
        for policy in [GapPolicy::GapAware, GapPolicy::GapExclusive] {
            let mut m = FrameModel::new(geometry, policy).unwrap();
            let mut y = -3.0;
            while y < geometry.height() + 3.0 {
                let mut x = -3.0;
                while x < geometry.width() + 3.0 {
                    match m.tick(x, y, Some(Button::Left)) {
                        Tick::Changed(cell) | Tick::Unchanged(cell) => {
                            assert!(geometry.contains(cell), "{cell:?} at ({x}, {y})")
                        }
                        Tick::Miss => assert_eq!(m.resolve(x, y), None),
                        Tick::Idle => panic!("left button is never idle"),
                    }
                    x += 0.5;
                }
                y += 0.5;
            }
            assert_eq!(m.grid().count_on(), 15);
        }
    }

    #[test]
    fn idle_and_middle_do_nothing() {
        let mut m = model();
        let (x, y) = center(&m, 3, 3);
        assert_eq!(m.tick(x, y, None), Tick::Idle);
        assert_eq!(m.tick(x, y, Some(Button::Middle)), Tick::Idle);
        assert_eq!(m.generation(), 0);
        assert_eq!(m.grid().count_on(), 0);
    }

    #[test]
    fn held_button_recomputes_once_per_change() {
        let mut m = model();
        let (x, y) = center(&m, 2, 2);
        for _ in 0..10 {
            m.tick(x, y, Some(Button::Left));
        }
        assert_eq!(m.generation(), 1);
        assert_eq!(m.sink().len(), 1);
        assert_eq!(m.tick(x, y, Some(Button::Left)), Tick::Unchanged(CellRef::new(2, 2)));
    }

    #[test]
    fn gap_and_border_ticks_miss() {
        let mut m = model();
        assert_eq!(m.tick(10.0, 10.0, Some(Button::Left)), Tick::Miss);
        assert_eq!(m.tick(52.0, 40.0, Some(Button::Left)), Tick::Miss);
        assert_eq!(m.tick(f64::NAN, 40.0, Some(Button::Left)), Tick::Miss);
        assert_eq!(m.generation(), 0);
    }

    #[test]
    fn set_cell_out_of_range() {
        let mut m = model();
        assert!(matches!(
            m.set_cell(18, 0, true),
            Err(FrameError::OutOfRange { .. })
        ));
        assert!(m.set_cell(0, 54, true).is_err());
        assert_eq!(m.generation(), 0);
    }

    #[test]
    fn apply_batches_into_one_recompute() {
        let mut m = model();
        let changed = m
            .apply([
                (CellRef::new(0, 0), true),
                (CellRef::new(0, 1), true),
                (CellRef::new(0, 1), true),
            ])
            .unwrap();
        assert_eq!(changed, 2);
        assert_eq!(m.generation(), 1);
        assert_eq!(m.bytes().get(0, 0), 192);
    }

    #[test]
    fn apply_rejects_whole_batch() {
        let mut m = model();
        let result = m.apply([(CellRef::new(0, 0), true), (CellRef::new(99, 0), true)]);
        assert!(result.is_err());
        assert_eq!(m.grid().count_on(), 0);
        assert_eq!(m.generation(), 0);
    }

    #[test]
    fn reset_zeroes_and_skips_noop() {
        let mut m = model();
        m.reset();
        assert_eq!(m.generation(), 0);
        m.set_cell(5, 5, true).unwrap();
        m.reset();
        assert_eq!(m.generation(), 2);
        assert_eq!(m.bytes(), &ByteMatrix::zeros(18, 7));
        assert_eq!(m.sink().last(), Some(&ByteMatrix::zeros(18, 7)));
    }

    #[test]
    fn load_checks_shape() {
        let mut m = model();
        assert!(m.load(GridState::new(18, 53)).is_err());
        let mut grid = GridState::new(18, 54);
        grid.set(17, 53, true).unwrap();
        m.load(grid.clone()).unwrap();
        assert_eq!(m.grid(), &grid);
        assert_eq!(m.bytes().get(17, 6), 0b0000_0100);
        m.load(grid).unwrap();
        assert_eq!(m.generation(), 1);
    }

    #[test]
    fn invalid_geometry_fails_fast() {
        let mut g = GridGeometry::default();
        g.cell_size = -1.0;
        assert!(FrameModel::new(g, GapPolicy::GapAware).is_err());
    }
}
