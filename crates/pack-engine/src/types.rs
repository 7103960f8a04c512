use std::fmt;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Error, Debug)]
pub enum PackError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Packing run was cancelled")]
    Cancelled,
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
    #[error("A packing run is already in progress")]
    Busy,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl PackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PackError::InvalidInput(_) => ErrorKind::InvalidInput,
            PackError::Cancelled => ErrorKind::Cancelled,
            PackError::InternalInconsistency(_) => ErrorKind::InternalInconsistency,
            PackError::Busy => ErrorKind::Busy,
            PackError::Io(_) => ErrorKind::Io,
            PackError::Config(_) => ErrorKind::Config,
            PackError::TaskJoin(_) => ErrorKind::TaskJoin,
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;

/// Coarse error category carried in failure responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ErrorKind {
    InvalidInput,
    Cancelled,
    InternalInconsistency,
    Busy,
    Io,
    Config,
    TaskJoin,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::InternalInconsistency => "InternalInconsistency",
            ErrorKind::Busy => "Busy",
            ErrorKind::Io => "Io",
            ErrorKind::Config => "Config",
            ErrorKind::TaskJoin => "TaskJoin",
        };
        f.write_str(s)
    }
}

/// Wire form of a failed run: `{ errorKind, message }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PackFailure {
    pub error_kind: ErrorKind,
    pub message: String,
}

impl From<&PackError> for PackFailure {
    fn from(err: &PackError) -> Self {
        Self {
            error_kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Opaque, unique identifier of a box
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BoxId(pub String);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BoxId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BoxId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A rectangle to be packed, in logical units.
///
/// `asset` is carried through untouched so that renderers can join placed
/// boxes back to their source images.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackBox {
    pub id: BoxId,
    pub width: f64,
    pub height: f64,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub asset: Option<String>,
}

impl PackBox {
    pub fn new(id: impl Into<BoxId>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            asset: None,
        }
    }

    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        self.asset = Some(asset.into());
        self
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// An image as it arrives from the decoder: natural pixel dimensions only
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RawImage {
    pub id: BoxId,
    pub pixel_width: u32,
    pub pixel_height: u32,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub asset: Option<String>,
}

impl RawImage {
    pub fn new(id: impl Into<BoxId>, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            id: id.into(),
            pixel_width,
            pixel_height,
            asset: None,
        }
    }

    /// Natural aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.pixel_width) / f64::from(self.pixel_height)
    }
}

/// Page margins in logical units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    /// Create uniform margins on all sides
    pub fn uniform(margin: f64) -> Self {
        Self {
            top: margin,
            right: margin,
            bottom: margin,
            left: margin,
        }
    }

    fn sides(&self) -> [(&'static str, f64); 4] {
        [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ]
    }
}

/// Page geometry the engine packs into.
///
/// `content_width`/`content_height` are already net of margins. Placed
/// coordinates are measured from the page's top-left corner, so the content
/// area starts at `(margin.left, margin.top)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ContainerSpec {
    pub content_width: f64,
    pub content_height: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub margin: Margin,
    #[cfg_attr(feature = "serde", serde(default))]
    pub padding: f64,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        // A4 at 2x the 595x842 pt sheet
        Self {
            content_width: 1190.0,
            content_height: 1684.0,
            margin: Margin::default(),
            padding: 5.0,
        }
    }
}

impl ContainerSpec {
    pub fn new(content_width: f64, content_height: f64) -> Self {
        Self {
            content_width,
            content_height,
            margin: Margin::default(),
            padding: 0.0,
        }
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Full sheet width including margins
    pub fn page_width(&self) -> f64 {
        self.margin.left + self.content_width + self.margin.right
    }

    /// Full sheet height including margins
    pub fn page_height(&self) -> f64 {
        self.margin.top + self.content_height + self.margin.bottom
    }

    pub fn content_area(&self) -> f64 {
        self.content_width * self.content_height
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.content_width.is_finite() && self.content_width > 0.0)
            || !(self.content_height.is_finite() && self.content_height > 0.0)
        {
            return Err(PackError::InvalidInput(format!(
                "Content area must be positive, got {}x{}",
                self.content_width, self.content_height
            )));
        }

        for (side, value) in self.margin.sides() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PackError::InvalidInput(format!(
                    "Margin {side} must be non-negative, got {value}"
                )));
            }
        }

        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(PackError::InvalidInput(format!(
                "Padding must be non-negative, got {}",
                self.padding
            )));
        }

        Ok(())
    }
}

/// A box after placement
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PlacedBox {
    pub box_id: BoxId,
    /// Left edge in page coordinates
    pub x: f64,
    /// Top edge in page coordinates
    pub y: f64,
    /// Footprint width on the page (source height when rotated)
    pub width: f64,
    /// Footprint height on the page (source width when rotated)
    pub height: f64,
    /// Whether the box was turned 90°
    pub rotated: bool,
}

impl PlacedBox {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// One output sheet, boxes in placement order
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Page {
    pub boxes: Vec<PlacedBox>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Sum of placed footprints
    pub fn used_area(&self) -> f64 {
        self.boxes.iter().map(|b| b.width * b.height).sum()
    }
}

/// Result of a packing run
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackedLayout {
    pub pages: Vec<Page>,
    pub unplaceable: Vec<BoxId>,
}

impl PackedLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn placed_count(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Locate a placed box, returning its page index
    pub fn find(&self, id: &BoxId) -> Option<(usize, &PlacedBox)> {
        self.pages.iter().enumerate().find_map(|(index, page)| {
            page.boxes
                .iter()
                .find(|b| &b.box_id == id)
                .map(|placed| (index, placed))
        })
    }

    /// Save the layout as pretty-printed JSON
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PackError::Config(format!("Failed to serialize layout: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// Statistics about a packed layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStatistics {
    /// Total number of input boxes
    pub total_boxes: usize,
    /// Boxes that ended up on a page
    pub placed_boxes: usize,
    /// Boxes too large for an empty page
    pub unplaceable_boxes: usize,
    /// Placed boxes turned 90°
    pub rotated_boxes: usize,
    /// Number of output pages
    pub pages: usize,
    /// Used fraction of the content area, per page
    pub page_utilization: Vec<f64>,
    /// Used fraction of the content area across all pages
    pub overall_utilization: f64,
}
