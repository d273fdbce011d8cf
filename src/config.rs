use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Physics and sizing constants for the pool layout.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fraction of speed lost every tick.
    pub friction: f32,
    pub max_speed: f32,
    /// Multiplier on the canvas-normalized offset toward linked hosts.
    pub attraction_scale: f32,
    /// Velocities are only exchanged on collision when one side moves faster than this.
    pub exchange_threshold: f32,
    pub separation_margin: f32,
    pub placement_attempts: usize,
    pub initial_speed: f32,
    /// Speeds below this after damping snap to zero.
    pub rest_speed: f32,
    pub label: LabelMetrics,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            friction: 0.05,
            max_speed: 10.0,
            attraction_scale: 50.0,
            exchange_threshold: 0.1,
            separation_margin: 1.01,
            placement_attempts: 40,
            initial_speed: 2.0,
            rest_speed: 0.01,
            label: LabelMetrics::default(),
        }
    }
}

/// Point size the renderer draws node labels at, in its monospace font.
pub const LABEL_FONT_SIZE: f32 = 12.0;

/// Estimated text extents used to size a node around its label.
///
/// The layout never measures text. `glyph_width` stands in for the advance
/// of one monospace glyph at [`LABEL_FONT_SIZE`] (about 0.6 em, so roughly
/// 7px), which keeps radii deterministic and independent of the font actually
/// loaded. A renderer with a different font can override the metrics in the
/// config file; labels may otherwise overhang their circle by a few pixels.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabelMetrics {
    pub glyph_width: f32,
    pub line_height: f32,
    pub padding: f32,
}

impl Default for LabelMetrics {
    fn default() -> Self {
        Self {
            glyph_width: 7.0,
            line_height: 14.0,
            padding: 6.0,
        }
    }
}

impl LabelMetrics {
    /// Half the estimated label width, never less than half a line, plus padding.
    /// Width counts characters, not bytes.
    pub fn radius_for(&self, label: &str) -> f32 {
        let width = label.chars().count() as f32 * self.glyph_width;
        (width.max(self.line_height) * 0.5) + self.padding
    }
}

/// Behavior toggles of the pool view.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoolOptions {
    pub suppress_domain: bool,
    pub show_job_lines: bool,
    pub clients_attract_hosts: bool,
    /// Regex searched in each host's platform string. Hosts that do not match
    /// are kept off the canvas.
    pub platform_filter: Option<String>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            suppress_domain: true,
            show_job_lines: true,
            clients_attract_hosts: false,
            platform_filter: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    pub layout: LayoutConfig,
    pub options: PoolOptions,
}

impl PoolConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }
}
