use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use ledgrid::error::FrameError;
use ledgrid::frame::{Button, FrameModel, Tick};
use ledgrid::geometry::{CellRef, GapPolicy, GridGeometry};
use ledgrid::sink::LatestFrame;
use ledgrid::text::CArray;

// ── Tsify types for TypeScript interface generation ──

/// Grid configuration passed from JavaScript. Omitted fields use the
/// 18x54 panel defaults.
#[derive(Tsify, Serialize, Deserialize, Default)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct WasmGridConfig {
    #[serde(default)]
    pub rows: Option<usize>,
    #[serde(default)]
    pub cols: Option<usize>,
    /// LED diameter in pixels (default: 25).
    #[serde(default, rename = "cellSize")]
    pub cell_size: Option<f64>,
    /// Space between LEDs in pixels (default: 5).
    #[serde(default, rename = "cellGap")]
    pub cell_gap: Option<f64>,
    /// Margin around the grid in pixels (default: 25).
    #[serde(default, rename = "borderWidth")]
    pub border_width: Option<f64>,
    /// "gap-aware" (default) or "gap-exclusive".
    #[serde(default, rename = "gapPolicy")]
    pub gap_policy: Option<String>,
}

/// A resolved grid cell returned to JavaScript.
#[derive(Tsify, Serialize, Deserialize)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct WasmCell {
    pub row: usize,
    pub col: usize,
}

fn config_parts(config: &WasmGridConfig) -> Result<(GridGeometry, GapPolicy), FrameError> {
    let defaults = GridGeometry::default();
    let geometry = GridGeometry::new(
        config.rows.unwrap_or(defaults.rows),
        config.cols.unwrap_or(defaults.cols),
        config.cell_size.unwrap_or(defaults.cell_size),
        config.cell_gap.unwrap_or(defaults.cell_gap),
        config.border_width.unwrap_or(defaults.border_width),
    )?;
    let policy = match &config.gap_policy {
        Some(name) => name.parse()?,
        None => GapPolicy::default(),
    };
    Ok((geometry, policy))
}

/// Map `MouseEvent.button` to a painting button.
fn mouse_button(button: Option<u8>) -> Option<Button> {
    match button? {
        0 => Some(Button::Left),
        1 => Some(Button::Middle),
        2 => Some(Button::Right),
        _ => None,
    }
}

fn checked_center(geometry: &GridGeometry, row: usize, col: usize) -> Result<[f64; 2], FrameError> {
    let cell = CellRef::new(row, col);
    if !geometry.contains(cell) {
        return Err(FrameError::OutOfRange {
            row,
            col,
            rows: geometry.rows,
            cols: geometry.cols,
        });
    }
    let (x, y) = geometry.cell_center(cell);
    Ok([x, y])
}

fn to_js_error(err: FrameError) -> JsError {
    JsError::new(&err.to_string())
}

// ── Editor wrapper ──

/// LED grid editor state for use from JavaScript/TypeScript.
#[wasm_bindgen]
pub struct Editor {
    inner: FrameModel<LatestFrame>,
}

#[wasm_bindgen]
impl Editor {
    /// Create an editor with every LED off.
    #[wasm_bindgen(constructor)]
    pub fn new(config: WasmGridConfig) -> Result<Editor, JsError> {
        let (geometry, policy) = config_parts(&config).map_err(to_js_error)?;
        let inner =
            FrameModel::with_sink(geometry, policy, LatestFrame::default()).map_err(to_js_error)?;
        Ok(Editor { inner })
    }

    #[wasm_bindgen(getter)]
    pub fn rows(&self) -> usize {
        self.inner.geometry().rows
    }

    #[wasm_bindgen(getter)]
    pub fn cols(&self) -> usize {
        self.inner.geometry().cols
    }

    #[wasm_bindgen(getter, js_name = "cellSize")]
    pub fn cell_size(&self) -> f64 {
        self.inner.geometry().cell_size
    }

    /// Canvas width in pixels.
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 {
        self.inner.geometry().width()
    }

    /// Canvas height in pixels.
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> f64 {
        self.inner.geometry().height()
    }

    /// Number of frame recomputes so far.
    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> f64 {
        self.inner.generation() as f64
    }

    /// Feed one animation-frame sample. `button` is `MouseEvent.button`, or
    /// `undefined` when no button is held. Returns true if a cell changed.
    pub fn tick(&mut self, x: f64, y: f64, button: Option<u8>) -> bool {
        matches!(self.inner.tick(x, y, mouse_button(button)), Tick::Changed(_))
    }

    /// Resolve a pointer position without painting. Returns `null` for gaps
    /// and positions outside the grid.
    pub fn resolve(&self, x: f64, y: f64) -> Result<JsValue, JsError> {
        match self.inner.resolve(x, y) {
            Some(CellRef { row, col }) => serde_wasm_bindgen::to_value(&WasmCell { row, col })
                .map_err(|e| JsError::new(&e.to_string())),
            None => Ok(JsValue::NULL),
        }
    }

    /// Turn every LED off.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    #[wasm_bindgen(js_name = "isOn")]
    pub fn is_on(&self, row: usize, col: usize) -> Result<bool, JsError> {
        self.inner.grid().get(row, col).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = "setCell")]
    pub fn set_cell(&mut self, row: usize, col: usize, on: bool) -> Result<bool, JsError> {
        self.inner.set_cell(row, col, on).map_err(to_js_error)
    }

    /// Row-major LED states, one byte (0 or 1) per cell.
    pub fn cells(&self) -> Vec<u8> {
        let grid = self.inner.grid();
        (0..grid.rows())
            .flat_map(|row| grid.row(row).iter().map(|&on| on as u8))
            .collect()
    }

    /// Pixel center `[x, y]` of a cell, where its LED is drawn.
    #[wasm_bindgen(js_name = "cellCenter")]
    pub fn cell_center(&self, row: usize, col: usize) -> Result<Vec<f64>, JsError> {
        checked_center(self.inner.geometry(), row, col)
            .map(Vec::from)
            .map_err(to_js_error)
    }

    /// Packed register bytes, row-major.
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes().as_bytes().to_vec()
    }

    /// The byte matrix as a C array literal.
    #[wasm_bindgen(js_name = "frameText")]
    pub fn frame_text(&self, ty: Option<String>, name: Option<String>) -> String {
        let defaults = CArray::default();
        let decl = CArray::new(ty.unwrap_or(defaults.ty), name.unwrap_or(defaults.name));
        decl.format(self.inner.bytes())
    }

    /// Take the most recent unsent frame, if any changed since the last call.
    #[wasm_bindgen(js_name = "takeFrame")]
    pub fn take_frame(&mut self) -> Option<Vec<u8>> {
        self.inner.sink_mut().take().map(|frame| frame.into_bytes())
    }
}
