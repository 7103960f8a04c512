use crate::types::*;

/// Calculate statistics for a packed layout
pub fn calculate_statistics(layout: &PackedLayout, container: &ContainerSpec) -> LayoutStatistics {
    let content_area = container.content_area();

    let page_utilization: Vec<f64> = layout
        .pages
        .iter()
        .map(|page| utilization(page.used_area(), content_area))
        .collect();

    let used: f64 = layout.pages.iter().map(Page::used_area).sum();
    let overall_utilization = utilization(used, content_area * layout.page_count() as f64);

    let rotated_boxes = layout
        .pages
        .iter()
        .flat_map(|page| page.boxes.iter())
        .filter(|placed| placed.rotated)
        .count();

    let placed_boxes = layout.placed_count();

    LayoutStatistics {
        total_boxes: placed_boxes + layout.unplaceable.len(),
        placed_boxes,
        unplaceable_boxes: layout.unplaceable.len(),
        rotated_boxes,
        pages: layout.page_count(),
        page_utilization,
        overall_utilization,
    }
}

fn utilization(used: f64, available: f64) -> f64 {
    if available > 0.0 { used / available } else { 0.0 }
}
