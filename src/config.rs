//! Parser configuration loaded from `~/.config/timegrid/config.toml`.
//!
//! Every section is optional; a partial file overrides only the keys it
//! names. The layout thresholds are tuned for one observed document family
//! and usually need recalibration for other institutions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::slots::{SlotTable, TimeSlot};

/// Geometric thresholds, all in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Added above a day label's baseline to form its row's upper edge.
    pub row_padding: f32,
    /// Two labels for the same day closer than this are one label.
    pub day_dedup_tolerance: f32,
    /// Fewer numeric period headers than this are ignored.
    pub min_period_markers: usize,
    /// Time-string column anchors closer than this are merged.
    pub anchor_dedup_tolerance: f32,
    /// Column left edge sits this far left of its anchor.
    pub column_shift: f32,
    /// Assumed day-label column width for even column division.
    pub day_column_width: f32,
    /// Slack subtracted from the day-label gutter edge.
    pub gutter_tolerance: f32,
    /// Vertical gap that opens a new sub-group inside a cell.
    pub subgroup_gap: f32,
    /// Runs within this vertical distance share a reconstructed text line.
    pub line_tolerance: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_padding: 35.0,
            day_dedup_tolerance: 10.0,
            min_period_markers: 3,
            anchor_dedup_tolerance: 25.0,
            column_shift: 8.0,
            day_column_width: 80.0,
            gutter_tolerance: 10.0,
            subgroup_gap: 12.0,
            line_tolerance: 3.0,
        }
    }
}

/// Institution-specific vocabulary used by the classification rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Department codes that prefix teacher identifiers (`CSE_Rahman`).
    pub department_prefixes: Vec<String>,
    /// Program codes that prefix class/section identifiers (`BSCS-4A`).
    pub program_prefixes: Vec<String>,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        let owned = |codes: &[&str]| codes.iter().map(|c| (*c).to_string()).collect();
        Self {
            department_prefixes: owned(&["CSE", "EEE", "ECE", "MTH", "PHY", "CHM", "HUM", "MGT"]),
            program_prefixes: owned(&["BSCS", "BSSE", "BSIT", "BSAI", "BBA", "MBA", "MSCS", "BS"]),
        }
    }
}

/// Settings for the optional completion-service refinement pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    pub enabled: bool,
    /// OpenAI-compatible chat completions URL.
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the bearer credential.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "TIMEGRID_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl RefineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The credential, if refinement is enabled and the variable is set.
    pub fn api_key(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// On-disk shape of the config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
struct ConfigFile {
    slots: Vec<TimeSlot>,
    layout: LayoutConfig,
    lexicon: LexiconConfig,
    refine: RefineConfig,
}

/// Complete, validated parser configuration.
///
/// Loaded once at startup and shared (usually behind an `Arc`) with every
/// pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParserConfig {
    pub slots: SlotTable,
    pub layout: LayoutConfig,
    pub lexicon: LexiconConfig,
    pub refine: RefineConfig,
}

impl ParserConfig {
    /// Parse a TOML document. Missing sections fall back to defaults; an
    /// empty `slots` list keeps the default table.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("invalid config TOML")?;
        let slots = if file.slots.is_empty() {
            SlotTable::default()
        } else {
            SlotTable::new(file.slots).map_err(|bad| anyhow!("invalid slot time: {bad}"))?
        };
        Ok(Self {
            slots,
            layout: file.layout,
            lexicon: file.lexicon,
            refine: file.refine,
        })
    }

    /// Load from `path` if given (it must exist), else from the default
    /// location, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) => explicit.to_path_buf(),
            None => {
                let default = config_path();
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Render back to TOML (`timegrid slots --toml`).
    pub fn to_toml(&self) -> Result<String> {
        let file = ConfigFile {
            slots: self.slots.as_slice().to_vec(),
            layout: self.layout.clone(),
            lexicon: self.lexicon.clone(),
            refine: self.refine.clone(),
        };
        toml::to_string_pretty(&file).context("failed to serialize config")
    }
}

/// Return the path to the default config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("timegrid")
        .join("config.toml")
}
