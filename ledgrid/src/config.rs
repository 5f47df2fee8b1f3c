use serde::{Deserialize, Serialize};

use crate::error::FrameError;
use crate::frame::FrameModel;
use crate::geometry::{GapPolicy, GridGeometry};
use crate::sink::FrameSink;

/// Serde-driven grid configuration matching the TOML format.
///
/// ```toml
/// rows = 18
/// cols = 54
/// cell_size = 25.0
/// cell_gap = 5.0
/// border_width = 25.0
/// gap_policy = "gap-aware"
/// ```
///
/// Missing keys fall back to the defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedGridConfig {
    pub rows: usize,
    pub cols: usize,
    pub cell_size: f64,
    pub cell_gap: f64,
    pub border_width: f64,
    /// `"gap-exclusive"` or `"gap-aware"`. Kept as a string so an unknown
    /// value surfaces as [`FrameError::InvalidConfiguration`].
    pub gap_policy: String,
}

impl Default for LedGridConfig {
    fn default() -> Self {
        let g = GridGeometry::default();
        Self {
            rows: g.rows,
            cols: g.cols,
            cell_size: g.cell_size,
            cell_gap: g.cell_gap,
            border_width: g.border_width,
            gap_policy: GapPolicy::default().to_string(),
        }
    }
}

impl LedGridConfig {
    pub fn from_toml(toml_str: &str) -> Result<Self, FrameError> {
        let config: LedGridConfig = toml::from_str(toml_str)
            .map_err(|e| FrameError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, FrameError> {
        toml::to_string(self).map_err(|e| FrameError::InvalidConfiguration(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), FrameError> {
        self.geometry()?;
        self.policy()?;
        Ok(())
    }

    pub fn geometry(&self) -> Result<GridGeometry, FrameError> {
        GridGeometry::new(
            self.rows,
            self.cols,
            self.cell_size,
            self.cell_gap,
            self.border_width,
        )
    }

    pub fn policy(&self) -> Result<GapPolicy, FrameError> {
        self.gap_policy.parse()
    }

    pub fn build(&self) -> Result<FrameModel, FrameError> {
        FrameModel::new(self.geometry()?, self.policy()?)
    }

    pub fn build_with_sink<S: FrameSink>(&self, sink: S) -> Result<FrameModel<S>, FrameError> {
        FrameModel::with_sink(self.geometry()?, self.policy()?, sink)
    }
}
