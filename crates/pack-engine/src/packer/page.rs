//! Page allocation and free-space bookkeeping
//!
//! Pages are created on demand, seeded with a single free rectangle covering
//! the content area, and never removed or reordered: a page's index is its
//! creation order.

use crate::types::*;

use super::geometry::{Rect, tolerance};

/// Where a box would go if placed now
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Slot {
    pub page: usize,
    pub rect_index: usize,
    pub rotated: bool,
    /// Free area left in the chosen rectangle after placement
    pub leftover: f64,
}

impl Slot {
    /// Smaller leftover wins; on an exact tie the unrotated orientation wins.
    /// Otherwise the earlier candidate is kept.
    fn beats(&self, other: &Slot) -> bool {
        self.leftover < other.leftover
            || (self.leftover == other.leftover && !self.rotated && other.rotated)
    }
}

/// Bookkeeping for a single page
#[derive(Debug, Clone)]
pub(crate) struct PageState {
    free: Vec<Rect>,
    boxes: Vec<PlacedBox>,
    tol: f64,
}

impl PageState {
    fn new(content: Rect, tol: f64) -> Self {
        Self {
            free: vec![content],
            boxes: Vec::new(),
            tol,
        }
    }

    #[cfg(test)]
    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    fn best_fit(&self, page: usize, item: &PackBox, allow_rotation: bool) -> Option<Slot> {
        let mut best: Option<Slot> = None;
        // A square gains nothing from turning
        let try_rotated = allow_rotation && item.width != item.height;

        for (rect_index, rect) in self.free.iter().enumerate() {
            let leftover = rect.area() - item.area();
            let orientations = [
                (false, item.width, item.height),
                (true, item.height, item.width),
            ];

            for (rotated, w, h) in orientations {
                if rotated && !try_rotated {
                    continue;
                }
                if !rect.fits(w, h, self.tol) {
                    continue;
                }
                let candidate = Slot {
                    page,
                    rect_index,
                    rotated,
                    leftover,
                };
                if best.is_none_or(|b| candidate.beats(&b)) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Put `item` in the top-left corner of free rectangle `rect_index` and
    /// split the remainder into a right strip and a full-width strip below.
    fn place(
        &mut self,
        rect_index: usize,
        item: &PackBox,
        rotated: bool,
        padding: f64,
    ) -> Result<PlacedBox> {
        if rect_index >= self.free.len() {
            return Err(PackError::InternalInconsistency(format!(
                "Free rectangle {rect_index} does not exist ({} tracked)",
                self.free.len()
            )));
        }

        let (w, h) = if rotated {
            (item.height, item.width)
        } else {
            (item.width, item.height)
        };

        let free = self.free.remove(rect_index);
        if !free.fits(w, h, self.tol) {
            return Err(PackError::InternalInconsistency(format!(
                "Box {} ({w}x{h}) does not fit its free rectangle ({}x{})",
                item.id, free.width, free.height
            )));
        }

        let right = Rect::new(
            free.x + w + padding,
            free.y,
            free.width - w - padding,
            h,
        );
        let below = Rect::new(
            free.x,
            free.y + h + padding,
            free.width,
            free.height - h - padding,
        );

        for rect in [right, below] {
            if !rect.is_empty(self.tol) {
                self.free.push(rect);
            }
        }
        self.prune();

        let placed = PlacedBox {
            box_id: item.id.clone(),
            x: free.x,
            y: free.y,
            width: w,
            height: h,
            rotated,
        };
        self.boxes.push(placed.clone());
        Ok(placed)
    }

    /// Drop free rectangles fully covered by another; of two identical
    /// rectangles the earlier one survives.
    fn prune(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let rect = self.free[i];
            let covered = self.free.iter().enumerate().any(|(j, other)| {
                j != i
                    && other.contains(&rect, self.tol)
                    && (j < i || !rect.contains(other, self.tol))
            });
            if covered {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

/// Creates pages on demand and routes placements to them
#[derive(Debug, Clone)]
pub(crate) struct PageAllocator {
    content: Rect,
    tol: f64,
    pages: Vec<PageState>,
}

impl PageAllocator {
    pub fn new(container: &ContainerSpec) -> Self {
        Self {
            content: Rect::new(
                container.margin.left,
                container.margin.top,
                container.content_width,
                container.content_height,
            ),
            tol: tolerance(container),
            pages: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[cfg(test)]
    pub fn page(&self, index: usize) -> Option<&PageState> {
        self.pages.get(index)
    }

    /// Whether the box fits an empty page in some permitted orientation
    pub fn fits_empty_page(&self, item: &PackBox, allow_rotation: bool) -> bool {
        self.content.fits(item.width, item.height, self.tol)
            || (allow_rotation && self.content.fits(item.height, item.width, self.tol))
    }

    /// Best-area-fit search across every free rectangle of every page
    pub fn find_slot(&self, item: &PackBox, allow_rotation: bool) -> Option<Slot> {
        let mut best: Option<Slot> = None;
        for (index, page) in self.pages.iter().enumerate() {
            if let Some(candidate) = page.best_fit(index, item, allow_rotation) {
                if best.is_none_or(|b| candidate.beats(&b)) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    /// Append a fresh page and return its index
    pub fn allocate(&mut self) -> usize {
        self.pages.push(PageState::new(self.content, self.tol));
        let index = self.pages.len() - 1;
        log::debug!("Allocated page {}", index + 1);
        index
    }

    /// Place on a freshly allocated page, at the content origin
    pub fn place_on_new_page(
        &mut self,
        item: &PackBox,
        allow_rotation: bool,
        padding: f64,
    ) -> Result<(usize, PlacedBox)> {
        let index = self.allocate();
        let slot = self.pages[index]
            .best_fit(index, item, allow_rotation)
            .ok_or_else(|| {
                PackError::InternalInconsistency(format!(
                    "Box {} does not fit an empty page",
                    item.id
                ))
            })?;
        let placed = self.place(slot, item, padding)?;
        Ok((index, placed))
    }

    pub fn place(&mut self, slot: Slot, item: &PackBox, padding: f64) -> Result<PlacedBox> {
        let page = self.pages.get_mut(slot.page).ok_or_else(|| {
            PackError::InternalInconsistency(format!("Page {} does not exist", slot.page))
        })?;
        page.place(slot.rect_index, item, slot.rotated, padding)
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
            .into_iter()
            .map(|state| Page { boxes: state.boxes })
            .collect()
    }
}
