//! Engine configuration: layout metrics, level policy and reveal timing.
//!
//! Every table is optional in the TOML form; missing keys fall back to the
//! defaults below.
//!
//! ```toml
//! [layout]
//! node_width = 150.0
//! level_policy = "longest-path"
//!
//! [reveal]
//! tick_ms = 300
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::DecisionGraphError;

/// How levels are assigned when a node is reachable along several paths.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LevelPolicy {
    /// Single forward pass over edges; the last incoming edge decides.
    #[default]
    LastWriteWins,
    /// Maximum over all incoming edges. Changes levels of diamond-shaped
    /// graphs relative to `LastWriteWins`.
    LongestPath,
}

impl LevelPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastWriteWins => "last-write-wins",
            Self::LongestPath => "longest-path",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "last-write-wins" | "last_write_wins" | "lww" | "scan" => Some(Self::LastWriteWins),
            "longest-path" | "longest_path" | "longest" => Some(Self::LongestPath),
            _ => None,
        }
    }
}

/// Fixed layout units used by the layered layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutMetrics {
    pub node_width: f32,
    pub node_height: f32,
    /// Horizontal gap between slots within a level.
    pub node_gap: f32,
    /// Vertical gap between levels.
    pub level_gap: f32,
    /// Left and top offset of the first level.
    pub origin: f32,
    /// Extra room added past the right-most and bottom-most node.
    pub canvas_margin: f32,
    pub min_canvas_width: f32,
    pub min_canvas_height: f32,
    pub level_policy: LevelPolicy,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            node_width: 150.0,
            node_height: 60.0,
            node_gap: 50.0,
            level_gap: 100.0,
            origin: 50.0,
            canvas_margin: 100.0,
            min_canvas_width: 400.0,
            min_canvas_height: 200.0,
            level_policy: LevelPolicy::LastWriteWins,
        }
    }
}

impl LayoutMetrics {
    /// Horizontal distance between the left edges of adjacent slots.
    #[must_use]
    pub fn slot_stride(&self) -> f32 {
        self.node_width + self.node_gap
    }

    /// Vertical distance between the top edges of adjacent levels.
    #[must_use]
    pub fn level_stride(&self) -> f32 {
        self.node_height + self.level_gap
    }

    fn validate(&self) -> Result<(), DecisionGraphError> {
        let fields = [
            ("layout.node_width", self.node_width),
            ("layout.node_height", self.node_height),
            ("layout.node_gap", self.node_gap),
            ("layout.level_gap", self.level_gap),
            ("layout.origin", self.origin),
            ("layout.canvas_margin", self.canvas_margin),
            ("layout.min_canvas_width", self.min_canvas_width),
            ("layout.min_canvas_height", self.min_canvas_height),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(DecisionGraphError::ConfigValue {
                    field: field.to_string(),
                    message: format!("must be a finite non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Progressive reveal timing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RevealConfig {
    pub tick_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self { tick_ms: 300 }
    }
}

impl RevealConfig {
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutMetrics,
    pub reveal: RevealConfig,
}

impl EngineConfig {
    /// Decode and validate a TOML config document.
    ///
    /// # Errors
    /// Returns an error for malformed TOML, unknown enum values, negative
    /// metrics or a zero tick.
    pub fn from_toml_str(source: &str) -> Result<Self, DecisionGraphError> {
        let config: Self = toml::from_str(source)?;
        config.layout.validate()?;
        if config.reveal.tick_ms == 0 {
            return Err(DecisionGraphError::ConfigValue {
                field: "reveal.tick_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(config)
    }

    /// Read and decode a TOML config file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or fails
    /// [`EngineConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, DecisionGraphError> {
        let source = std::fs::read_to_string(path).map_err(|source| DecisionGraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
