//! TOML server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crossline_core::prelude::AnalysisParams;
use serde::Deserialize;

/// Full server configuration. Every section is optional in the file;
/// a missing analysis section means whole-world defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub data: DataSection,
    pub analysis: AnalysisParams,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub listen: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

/// Paths to the three GeoJSON feature sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub crossing_points: PathBuf,
    pub crossing_ways: PathBuf,
    pub roads: PathBuf,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            crossing_points: PathBuf::from("data/crossing_points.geojson"),
            crossing_ways: PathBuf::from("data/crossing_ways.geojson"),
            roads: PathBuf::from("data/roads.geojson"),
        }
    }
}

impl ServerConfig {
    /// Reads and parses the configuration file.
    ///
    /// # Errors
    ///
    /// Fails on an unreadable file or invalid TOML.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("reading {}: {e}", path.display()))?;
        let config = toml::from_str(&text)
            .map_err(|e| format!("parsing {}: {e}", path.display()))?;
        Ok(config)
    }
}
