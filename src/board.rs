use crate::calendar::{date_to_index, period_labels, ViewMode};
use crate::layout::{pack_column, IndexedItem, LayoutError, LayoutMetrics, PositionedItem};
use crate::model::{ItemId, Roadmap, RoadmapItem};
use tracing::{debug, warn};

/// Grid span of an item in one view mode. Recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpan {
    pub start: f64,
    pub end: f64,
}

impl GridSpan {
    pub fn covers(&self, period: usize) -> bool {
        let period = period as f64;
        self.start.floor() <= period && period <= self.end
    }
}

/// Project an item's dates onto the grid of `mode`.
///
/// A stored span whose end precedes its start is drawn as a single period.
/// A well-formed span whose end wraps around the period table is drawn up to
/// the last visible period.
pub fn project_span(item: &RoadmapItem, mode: ViewMode) -> GridSpan {
    let start = date_to_index(item.start_date, mode);
    let mut end = date_to_index(item.end_date, mode);
    if item.end_date < item.start_date {
        end = start;
    } else if end < start {
        end = start.max((mode.visible_periods() as f64 - 1.0).max(0.0));
    }
    GridSpan { start, end }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub pillar: usize,
    pub lane_count: usize,
    pub items: Vec<PositionedItem>,
    /// Items of this pillar that start past the visible window.
    pub hidden: Vec<ItemId>,
}

impl ColumnLayout {
    /// Items whose span covers `period`, in placement order.
    pub fn items_at(&self, period: usize) -> Vec<&PositionedItem> {
        self.items
            .iter()
            .filter(|p| {
                GridSpan {
                    start: p.start_index,
                    end: p.end_index,
                }
                .covers(period)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardLayout {
    pub mode: ViewMode,
    pub labels: Vec<String>,
    pub columns: Vec<ColumnLayout>,
}

/// Lay out every pillar of `roadmap` for `mode`. Packing is independent per
/// pillar.
pub fn layout_board(
    roadmap: &Roadmap,
    mode: ViewMode,
    metrics: LayoutMetrics,
    project: Option<&str>,
) -> Result<BoardLayout, LayoutError> {
    let visible = mode.visible_periods();
    let mut columns = Vec::with_capacity(roadmap.pillars.len());
    for pillar in 0..roadmap.pillars.len() {
        columns.push(layout_column(roadmap, pillar, mode, metrics, project)?);
    }
    debug!(
        view = %mode,
        pillars = columns.len(),
        items = columns.iter().map(|c| c.items.len()).sum::<usize>(),
        visible,
        "laid out board"
    );
    Ok(BoardLayout {
        mode,
        labels: period_labels(mode),
        columns,
    })
}

pub fn layout_column(
    roadmap: &Roadmap,
    pillar: usize,
    mode: ViewMode,
    metrics: LayoutMetrics,
    project: Option<&str>,
) -> Result<ColumnLayout, LayoutError> {
    let visible = mode.visible_periods() as f64;
    let mut hidden = Vec::new();
    let mut indexed = Vec::new();
    for item in roadmap.items_in_pillar(pillar, project) {
        let span = project_span(item, mode);
        if span.start >= visible {
            hidden.push(item.id.clone());
            continue;
        }
        indexed.push(IndexedItem {
            item: item.clone(),
            start_index: span.start,
            end_index: span.end,
        });
    }
    if !hidden.is_empty() {
        warn!(pillar, count = hidden.len(), view = %mode, "items start past the visible window");
    }
    let packing = pack_column(indexed, mode.visible_periods(), metrics)?;
    Ok(ColumnLayout {
        pillar,
        lane_count: packing.lane_count,
        items: packing.items,
        hidden,
    })
}
