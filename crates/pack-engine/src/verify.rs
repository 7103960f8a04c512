//! Layout invariant checks
//!
//! Every layout the engine returns passes [`verify_layout`]; a failure is
//! reported as [`PackError::InternalInconsistency`].

use std::collections::{HashMap, HashSet};

use crate::packer::{Rect, tolerance};
use crate::types::*;

/// Check id accounting, page bounds and padded non-overlap
pub fn verify_layout(
    boxes: &[PackBox],
    container: &ContainerSpec,
    layout: &PackedLayout,
) -> Result<()> {
    let inputs: HashMap<&BoxId, &PackBox> = boxes.iter().map(|b| (&b.id, b)).collect();
    let mut seen: HashSet<&BoxId> = HashSet::with_capacity(boxes.len());

    let content = Rect::new(
        container.margin.left,
        container.margin.top,
        container.content_width,
        container.content_height,
    );
    let half_padding = container.padding / 2.0;
    let tol = tolerance(container);

    for (page_index, page) in layout.pages.iter().enumerate() {
        if page.is_empty() {
            return Err(inconsistency(format!("Page {} is empty", page_index + 1)));
        }

        let mut padded: Vec<(&BoxId, Rect)> = Vec::with_capacity(page.len());
        for placed in &page.boxes {
            let source = inputs
                .get(&placed.box_id)
                .ok_or_else(|| inconsistency(format!("Unknown box {}", placed.box_id)))?;
            if !seen.insert(&placed.box_id) {
                return Err(inconsistency(format!("Box {} placed twice", placed.box_id)));
            }

            let (w, h) = if placed.rotated {
                (source.height, source.width)
            } else {
                (source.width, source.height)
            };
            if (placed.width - w).abs() > tol || (placed.height - h).abs() > tol {
                return Err(inconsistency(format!(
                    "Box {} placed as {}x{}, expected {}x{}",
                    placed.box_id, placed.width, placed.height, w, h
                )));
            }

            let rect = Rect::new(placed.x, placed.y, placed.width, placed.height);
            if !content.contains(&rect, tol) {
                return Err(inconsistency(format!(
                    "Box {} at ({}, {}) leaves the content area on page {}",
                    placed.box_id,
                    placed.x,
                    placed.y,
                    page_index + 1
                )));
            }

            let inflated = rect.inflate(half_padding);
            if let Some((other, _)) =
                padded.iter().find(|(_, r)| r.intersects(&inflated, tol))
            {
                return Err(inconsistency(format!(
                    "Boxes {} and {} overlap on page {}",
                    other,
                    placed.box_id,
                    page_index + 1
                )));
            }
            padded.push((&placed.box_id, inflated));
        }
    }

    for id in &layout.unplaceable {
        if !inputs.contains_key(id) {
            return Err(inconsistency(format!("Unknown unplaceable box {id}")));
        }
        if !seen.insert(id) {
            return Err(inconsistency(format!(
                "Box {id} is both placed and unplaceable"
            )));
        }
    }

    if seen.len() != inputs.len() {
        return Err(inconsistency(format!(
            "{} of {} boxes accounted for",
            seen.len(),
            inputs.len()
        )));
    }

    Ok(())
}

fn inconsistency(message: String) -> PackError {
    PackError::InternalInconsistency(message)
}
