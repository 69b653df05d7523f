//! Tunable extractor settings.
//!
//! The HDFC values are positional heuristics measured on one statement
//! layout (PDF points on an A4 page). They are deserialised from the CLI
//! configuration file so they can be adjusted against real samples.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub hdfc: HdfcConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HdfcConfig {
    /// Vertical bucket size used to group words into printed lines
    pub row_bucket: f64,
    /// A date token must start left of this x to open a transaction
    pub date_margin: f64,
    /// Offset between a detected column edge and the boundary placed beside it
    pub boundary_gap: f64,
    pub default_narration_start: f64,
    pub default_reference_start: f64,
    pub default_reference_end: f64,
    /// Reference identifiers left of this x are treated as narration
    pub min_reference_offset: f64,
    /// Amount-to-balance distance beyond which an amount sits in the withdrawal column
    pub withdrawal_min_gap: f64,
}

impl Default for HdfcConfig {
    fn default() -> Self {
        Self {
            row_bucket: 1.0,
            date_margin: 60.0,
            boundary_gap: 1.0,
            default_narration_start: 70.0,
            default_reference_start: 270.0,
            default_reference_end: 360.0,
            min_reference_offset: 200.0,
            withdrawal_min_gap: 90.0,
        }
    }
}
