//! Multi-page rectangle packing
//!
//! This module orchestrates a packing run:
//! 1. Validate boxes and container
//! 2. Run one guillotine best-area-fit pass per sort key of the preset
//! 3. Keep the pass with the fewest pages
//! 4. Verify the winning layout before handing it out

mod geometry;
mod order;
mod page;
mod progress;

pub use geometry::Rect;
pub use order::SortKey;
pub use progress::{CancelToken, NoProgress, ProgressSink};

use std::collections::HashSet;

use crate::options::PackingOptions;
use crate::types::*;
use crate::verify::verify_layout;
use page::PageAllocator;
use progress::ProgressTracker;

pub(crate) use geometry::tolerance;

/// Pack boxes onto as few pages as the preset can find
pub fn pack(
    boxes: &[PackBox],
    container: &ContainerSpec,
    options: &PackingOptions,
) -> Result<PackedLayout> {
    pack_with_progress(boxes, container, options, &mut NoProgress, &CancelToken::new())
}

/// [`pack`] with progress notifications and cooperative cancellation.
///
/// `cancel` is checked before every box; once set the run stops and
/// returns [`PackError::Cancelled`] without any layout.
pub fn pack_with_progress(
    boxes: &[PackBox],
    container: &ContainerSpec,
    options: &PackingOptions,
    progress: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<PackedLayout> {
    validate_input(boxes, container)?;

    let passes = SortKey::passes(options.packing_factor);
    let mut tracker = ProgressTracker::new(progress, passes.len() * boxes.len());
    let mut best: Option<PackedLayout> = None;

    for &key in passes {
        let layout = run_pass(
            boxes,
            container,
            options.allow_rotation,
            key,
            &mut tracker,
            cancel,
        )?;
        log::debug!(
            "{:?} pass: {} page(s), {} unplaceable",
            key,
            layout.page_count(),
            layout.unplaceable.len()
        );

        // Strictly fewer pages replaces; ties keep the earlier pass
        if best
            .as_ref()
            .is_none_or(|b| layout.page_count() < b.page_count())
        {
            best = Some(layout);
        }
    }

    if cancel.is_cancelled() {
        return Err(PackError::Cancelled);
    }

    let layout = best.unwrap_or_default();
    verify_layout(boxes, container, &layout)?;

    for id in &layout.unplaceable {
        log::warn!("Box {} does not fit on an empty page", id);
    }

    tracker.finish();
    Ok(layout)
}

/// Run [`pack`] on the blocking thread pool
pub async fn pack_async(
    boxes: &[PackBox],
    container: &ContainerSpec,
    options: &PackingOptions,
) -> Result<PackedLayout> {
    let boxes = boxes.to_vec();
    let container = *container;
    let options = options.clone();

    tokio::task::spawn_blocking(move || pack(&boxes, &container, &options)).await?
}

fn validate_input(boxes: &[PackBox], container: &ContainerSpec) -> Result<()> {
    container.validate()?;

    let mut ids = HashSet::with_capacity(boxes.len());
    for item in boxes {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(item.width) || !valid(item.height) {
            return Err(PackError::InvalidInput(format!(
                "Box {} has non-positive dimensions {}x{}",
                item.id, item.width, item.height
            )));
        }
        if !ids.insert(&item.id) {
            return Err(PackError::InvalidInput(format!(
                "Duplicate box id {}",
                item.id
            )));
        }
    }

    Ok(())
}

fn run_pass(
    boxes: &[PackBox],
    container: &ContainerSpec,
    allow_rotation: bool,
    key: SortKey,
    tracker: &mut ProgressTracker<'_>,
    cancel: &CancelToken,
) -> Result<PackedLayout> {
    let mut pages = PageAllocator::new(container);
    let mut unplaceable = Vec::new();

    for item in order::sorted(boxes, key) {
        if cancel.is_cancelled() {
            log::debug!("Cancelled with {} page(s) allocated", pages.page_count());
            return Err(PackError::Cancelled);
        }

        if !pages.fits_empty_page(item, allow_rotation) {
            unplaceable.push(item.id.clone());
        } else if let Some(slot) = pages.find_slot(item, allow_rotation) {
            pages.place(slot, item, container.padding)?;
        } else {
            pages.place_on_new_page(item, allow_rotation, container.padding)?;
        }

        tracker.advance();
    }

    Ok(PackedLayout {
        pages: pages.into_pages(),
        unplaceable,
    })
}
