//! Box orderings for placement passes

use std::cmp::Ordering;

use crate::options::PackingFactor;
use crate::types::PackBox;

/// Primary key of a placement pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Decreasing height
    Height,
    /// Decreasing width
    Width,
    /// Decreasing area
    Area,
    /// Decreasing longer side
    LongSide,
    /// Decreasing perimeter
    Perimeter,
}

impl SortKey {
    fn value(self, item: &PackBox) -> f64 {
        match self {
            SortKey::Height => item.height,
            SortKey::Width => item.width,
            SortKey::Area => item.area(),
            SortKey::LongSide => item.width.max(item.height),
            SortKey::Perimeter => item.width + item.height,
        }
    }

    /// Passes run for a preset. Each preset's list extends the one below it.
    pub fn passes(factor: PackingFactor) -> &'static [SortKey] {
        static ALL: [SortKey; 5] = [
            SortKey::Height,
            SortKey::Width,
            SortKey::Area,
            SortKey::LongSide,
            SortKey::Perimeter,
        ];
        match factor {
            PackingFactor::Draft => &ALL[..1],
            PackingFactor::Balanced => &ALL[..2],
            PackingFactor::Best => &ALL,
        }
    }
}

/// Order boxes for a pass.
///
/// Every key falls back to decreasing height, decreasing width and then
/// ascending id, so the order is total and independent of input order.
pub fn sorted(boxes: &[PackBox], key: SortKey) -> Vec<&PackBox> {
    let mut ordered: Vec<&PackBox> = boxes.iter().collect();
    ordered.sort_by(|a, b| compare(a, b, key));
    ordered
}

fn compare(a: &PackBox, b: &PackBox, key: SortKey) -> Ordering {
    key.value(b)
        .total_cmp(&key.value(a))
        .then_with(|| b.height.total_cmp(&a.height))
        .then_with(|| b.width.total_cmp(&a.width))
        .then_with(|| a.id.cmp(&b.id))
}
