use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Speed/density presets, ordered from fastest to densest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PackingFactor {
    /// A single height-ordered pass
    Draft,
    /// Height- and width-ordered passes, fewest pages wins
    #[default]
    Balanced,
    /// Every ordering the engine knows, fewest pages wins
    Best,
}

impl PackingFactor {
    pub const ALL: [PackingFactor; 3] = [
        PackingFactor::Draft,
        PackingFactor::Balanced,
        PackingFactor::Best,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PackingFactor::Draft => "Draft",
            PackingFactor::Balanced => "Balanced",
            PackingFactor::Best => "Best",
        }
    }
}

/// Packing configuration shared by the normalizer and the engine
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct PackingOptions {
    pub packing_factor: PackingFactor,
    /// Allow boxes to be turned 90° when that fits better
    pub allow_rotation: bool,
    /// Initial box width as a fraction of the content width
    pub initial_max_width_fraction: f64,
}

impl Default for PackingOptions {
    fn default() -> Self {
        Self {
            packing_factor: PackingFactor::Balanced,
            allow_rotation: true,
            initial_max_width_fraction: 0.4,
        }
    }
}

impl PackingOptions {
    pub fn with_factor(mut self, packing_factor: PackingFactor) -> Self {
        self.packing_factor = packing_factor;
        self
    }

    pub fn with_rotation(mut self, allow_rotation: bool) -> Self {
        self.allow_rotation = allow_rotation;
        self
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| PackError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PackError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the normalizer inputs
    pub fn validate(&self) -> Result<()> {
        check_width_fraction(self.initial_max_width_fraction)
    }
}

pub(crate) fn check_width_fraction(fraction: f64) -> Result<()> {
    if !(fraction.is_finite() && fraction > 0.0 && fraction <= 1.0) {
        return Err(PackError::InvalidInput(format!(
            "Initial max width fraction must be in (0, 1], got {fraction}"
        )));
    }
    Ok(())
}

/// Everything one packing run needs, as an immutable snapshot
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackRequest {
    pub boxes: Vec<PackBox>,
    pub container: ContainerSpec,
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: PackingOptions,
}

impl PackRequest {
    pub fn new(boxes: Vec<PackBox>, container: ContainerSpec, options: PackingOptions) -> Self {
        Self {
            boxes,
            container,
            options,
        }
    }

    /// Load a request from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let request = serde_json::from_slice(&bytes)
            .map_err(|e| PackError::Config(format!("Failed to parse request: {}", e)))?;
        Ok(request)
    }

    /// Save the request to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PackError::Config(format!("Failed to serialize request: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
