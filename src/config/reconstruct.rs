use crate::illumination::Illumination;
use crate::solver::SolverParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct ReconstructConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    /// Light direction; omit to estimate it from the image.
    #[serde(default)]
    pub illumination: IlluminationConfig,
    #[serde(default)]
    pub solver: SolverParams,
    pub output: ReconstructOutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IlluminationConfig {
    pub slant: Option<f64>,
    pub tilt: Option<f64>,
    /// Interpret `slant`/`tilt` as degrees instead of radians.
    pub degrees: bool,
}

impl IlluminationConfig {
    /// `None` when both angles are absent; an error when only one is given.
    pub fn to_illumination(&self) -> Result<Option<Illumination>, String> {
        let convert = |v: f64| if self.degrees { v.to_radians() } else { v };
        Illumination::from_pair(self.slant.map(convert), self.tilt.map(convert))
            .map_err(|e| format!("Invalid illumination config: {e}"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ReconstructOutputConfig {
    /// Smoothed height map, min–max stretched to 8 bits.
    pub height_image: PathBuf,
    #[serde(default)]
    pub p_image: Option<PathBuf>,
    #[serde(default)]
    pub q_image: Option<PathBuf>,
    #[serde(default)]
    pub report_json: Option<PathBuf>,
}

pub fn parse_config(data: &str) -> Result<ReconstructConfig, String> {
    serde_json::from_str(data).map_err(|e| format!("Failed to parse config: {e}"))
}

pub fn load_config(path: &Path) -> Result<ReconstructConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
