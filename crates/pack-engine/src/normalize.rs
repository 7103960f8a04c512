//! Dimension normalization
//!
//! Turns natural pixel dimensions into logical box sizes: every image starts
//! at the same width (a fraction of the content width) and keeps its aspect
//! ratio. Collaborators may overwrite the result before packing.

use crate::options::{PackingOptions, check_width_fraction};
use crate::types::*;

/// Assign logical sizes to raw images.
///
/// Output order and ids match the input. Each box is
/// `fraction * content_width` wide and `width / aspect_ratio` tall.
pub fn normalize(
    raw: &[RawImage],
    initial_max_width_fraction: f64,
    content_width: f64,
) -> Result<Vec<PackBox>> {
    check_width_fraction(initial_max_width_fraction)?;
    if !(content_width.is_finite() && content_width > 0.0) {
        return Err(PackError::InvalidInput(format!(
            "Content width must be positive, got {content_width}"
        )));
    }

    let width = initial_max_width_fraction * content_width;

    raw.iter()
        .map(|image| {
            if image.pixel_width == 0 || image.pixel_height == 0 {
                return Err(PackError::InvalidInput(format!(
                    "Image {} has zero pixel dimension ({}x{})",
                    image.id, image.pixel_width, image.pixel_height
                )));
            }

            Ok(PackBox {
                id: image.id.clone(),
                width,
                height: width / image.aspect_ratio(),
                asset: image.asset.clone(),
            })
        })
        .collect()
}

/// [`normalize`] driven by packing options and a container
pub fn normalize_with_options(
    raw: &[RawImage],
    options: &PackingOptions,
    container: &ContainerSpec,
) -> Result<Vec<PackBox>> {
    normalize(
        raw,
        options.initial_max_width_fraction,
        container.content_width,
    )
}
