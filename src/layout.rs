use crate::model::{ItemId, RoadmapItem};
use serde::{Deserialize, Serialize};

/// Size of one period along the time axis and the spacing between stacked
/// items, in whatever unit the renderer draws with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    pub period_size: f64,
    pub gap: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        LayoutMetrics {
            period_size: 120.0,
            gap: 8.0,
        }
    }
}

impl LayoutMetrics {
    pub fn half_gap(&self) -> f64 {
        self.gap / 2.0
    }
}

/// An item with its grid span for the active view mode.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedItem {
    pub item: RoadmapItem,
    pub start_index: f64,
    pub end_index: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionedItem {
    pub item: RoadmapItem,
    pub start_index: f64,
    /// End index after clamping to the visible window.
    pub end_index: f64,
    pub lane: usize,
    pub lane_top: f64,
    pub lane_height: f64,
    /// Fraction of the column width, in `[0, 1]`.
    pub lane_left: f64,
    pub lane_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPacking {
    pub lane_count: usize,
    /// In placement order: ascending start index, ties in input order.
    pub items: Vec<PositionedItem>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("no visible periods to lay items out on")]
    EmptyWindow,
    #[error("item {id} ends at {end} before it starts at {start}")]
    InvertedSpan { id: ItemId, start: f64, end: f64 },
}

/// Greedy interval partitioning of one category column.
///
/// Items are sorted by start index (stable), then each goes into the first
/// lane that is free, or into a new lane. An item occupies `[start, end + 1)`
/// since its card is drawn through the whole of its last period, so a lane is
/// free once its last item ends a full period before the new start. For whole
/// indices this is `end < start`. This opens no more lanes than the largest
/// number of cards overlapping at a single point. At least one lane is always
/// reported.
pub fn pack_column(
    items: Vec<IndexedItem>,
    visible_periods: usize,
    metrics: LayoutMetrics,
) -> Result<ColumnPacking, LayoutError> {
    if visible_periods == 0 {
        return Err(LayoutError::EmptyWindow);
    }
    let last_period = (visible_periods - 1) as f64;

    let mut clamped = items
        .into_iter()
        .map(|mut entry| {
            entry.end_index = entry.end_index.min(last_period);
            entry
        })
        .collect::<Vec<_>>();
    if let Some(bad) = clamped.iter().find(|e| e.end_index < e.start_index) {
        return Err(LayoutError::InvertedSpan {
            id: bad.item.id.clone(),
            start: bad.start_index,
            end: bad.end_index,
        });
    }
    clamped.sort_by(|a, b| a.start_index.total_cmp(&b.start_index));

    let mut lane_ends: Vec<f64> = Vec::new();
    let mut placed = Vec::with_capacity(clamped.len());
    for entry in clamped {
        let lane = match lane_ends.iter().position(|end| *end + 1.0 <= entry.start_index) {
            Some(lane) => {
                lane_ends[lane] = entry.end_index;
                lane
            }
            None => {
                lane_ends.push(entry.end_index);
                lane_ends.len() - 1
            }
        };
        placed.push((entry, lane));
    }

    let lane_count = lane_ends.len().max(1);
    let items = placed
        .into_iter()
        .map(|(entry, lane)| position(entry, lane, lane_count, metrics))
        .collect();
    Ok(ColumnPacking { lane_count, items })
}

fn position(
    entry: IndexedItem,
    lane: usize,
    lane_count: usize,
    metrics: LayoutMetrics,
) -> PositionedItem {
    let span = entry.end_index - entry.start_index + 1.0;
    PositionedItem {
        lane,
        lane_top: entry.start_index * metrics.period_size + metrics.half_gap(),
        lane_height: span * metrics.period_size - metrics.gap,
        lane_left: lane as f64 / lane_count as f64,
        lane_width: 1.0 / lane_count as f64,
        start_index: entry.start_index,
        end_index: entry.end_index,
        item: entry.item,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(id: &str, start: f64, end: f64) -> IndexedItem {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        IndexedItem {
            item: RoadmapItem::new(id.into(), id.to_uppercase(), 0, date, date),
            start_index: start,
            end_index: end,
        }
    }

    fn lane_of(packing: &ColumnPacking, id: &str) -> usize {
        packing
            .items
            .iter()
            .find(|p| p.item.id == id)
            .map(|p| p.lane)
            .unwrap()
    }

    #[test]
    fn overlapping_items_split_into_two_lanes() {
        let items = vec![entry("a", 0.0, 2.0), entry("b", 1.0, 1.0), entry("c", 3.0, 3.0)];
        let packing = pack_column(items, 16, LayoutMetrics::default()).unwrap();
        assert_eq!(packing.lane_count, 2);
        assert_eq!(lane_of(&packing, "a"), 0);
        assert_eq!(lane_of(&packing, "b"), 1);
        assert_eq!(lane_of(&packing, "c"), 0);
    }

    #[test]
    fn touching_ranges_share_a_lane_only_when_strictly_apart() {
        let items = vec![entry("a", 0.0, 2.0), entry("b", 2.0, 3.0)];
        let packing = pack_column(items, 16, LayoutMetrics::default()).unwrap();
        assert_eq!(packing.lane_count, 2);

        let items = vec![entry("a", 0.0, 1.0), entry("b", 2.0, 3.0)];
        let packing = pack_column(items, 16, LayoutMetrics::default()).unwrap();
        assert_eq!(packing.lane_count, 1);
    }

    #[test]
    fn fractional_week_spans_do_not_share_a_lane_while_cards_overlap() {
        // 2026-03-02..03-03, 2026-03-05 and 2026-03-12 in week mode
        let items = vec![
            entry("a", 1.0, 8.0 / 7.0),
            entry("b", 10.0 / 7.0, 10.0 / 7.0),
            entry("c", 17.0 / 7.0, 17.0 / 7.0),
        ];
        let packing = pack_column(items, 16, LayoutMetrics::default()).unwrap();
        assert_eq!(packing.lane_count, 2);
        assert_eq!(lane_of(&packing, "a"), 0);
        assert_eq!(lane_of(&packing, "b"), 1);
        assert_eq!(lane_of(&packing, "c"), 0);

        let a = packing.items.iter().find(|p| p.item.id == "a").unwrap();
        let c = packing.items.iter().find(|p| p.item.id == "c").unwrap();
        assert!(a.lane_top + a.lane_height <= c.lane_top);
    }

    #[test]
    fn empty_column_still_reports_one_lane() {
        let packing = pack_column(Vec::new(), 12, LayoutMetrics::default()).unwrap();
        assert_eq!(packing.lane_count, 1);
        assert!(packing.items.is_empty());
    }

    #[test]
    fn single_item_gets_full_width_geometry() {
        let metrics = LayoutMetrics {
            period_size: 120.0,
            gap: 8.0,
        };
        let packing = pack_column(vec![entry("a", 2.0, 4.0)], 16, metrics).unwrap();
        let item = &packing.items[0];
        assert_eq!(item.lane_left, 0.0);
        assert_eq!(item.lane_width, 1.0);
        assert_eq!(item.lane_top, 244.0);
        assert_eq!(item.lane_height, 352.0);
    }

    #[test]
    fn lane_fractions_divide_the_column() {
        let items = vec![entry("a", 0.0, 5.0), entry("b", 0.0, 5.0), entry("c", 1.0, 1.0)];
        let packing = pack_column(items, 16, LayoutMetrics::default()).unwrap();
        assert_eq!(packing.lane_count, 3);
        let c = packing.items.iter().find(|p| p.item.id == "c").unwrap();
        assert!((c.lane_left - 2.0 / 3.0).abs() < 1e-12);
        assert!((c.lane_width - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn end_is_clamped_to_the_visible_window() {
        let packing = pack_column(vec![entry("a", 6.0, 30.0)], 8, LayoutMetrics::default()).unwrap();
        let item = &packing.items[0];
        assert_eq!(item.end_index, 7.0);
        assert_eq!(item.lane_height, 2.0 * 120.0 - 8.0);
    }

    #[test]
    fn equal_starts_keep_input_order() {
        let items = vec![entry("z", 1.0, 1.0), entry("y", 1.0, 1.0), entry("x", 0.0, 0.0)];
        let packing = pack_column(items, 16, LayoutMetrics::default()).unwrap();
        let order: Vec<&str> = packing.items.iter().map(|p| p.item.id.as_str()).collect();
        assert_eq!(order, vec!["x", "z", "y"]);
        assert_eq!(lane_of(&packing, "z"), 0);
        assert_eq!(lane_of(&packing, "y"), 1);
    }

    #[test]
    fn rejects_empty_window_and_inverted_spans() {
        assert_eq!(
            pack_column(vec![entry("a", 0.0, 0.0)], 0, LayoutMetrics::default()),
            Err(LayoutError::EmptyWindow)
        );
        let err = pack_column(vec![entry("a", 9.0, 9.0)], 8, LayoutMetrics::default()).unwrap_err();
        assert!(matches!(err, LayoutError::InvertedSpan { ref id, .. } if id == "a"));
    }
}
