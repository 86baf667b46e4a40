use crate::calendar::{index_to_date, ViewMode};
use crate::model::{ItemId, RoadmapItem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A resolved drop: put `item_id` at `target_index` in pillar `target_pillar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub item_id: ItemId,
    pub target_pillar: usize,
    pub target_index: f64,
}

/// Re-anchor `item` at the start of period `new_start_index`, keeping its
/// duration exactly. Malformed spans (end before start) keep their negative
/// duration. Grid indices are not stored; they are projected again on the
/// next render.
pub fn reposition(item: &RoadmapItem, new_start_index: f64, mode: ViewMode) -> RoadmapItem {
    let duration = item.end_date.signed_duration_since(item.start_date);
    let start_date = index_to_date(new_start_index, mode);
    let end_date = start_date
        .checked_add_signed(duration)
        .unwrap_or(if duration < chrono::Duration::zero() {
            NaiveDate::MIN
        } else {
            NaiveDate::MAX
        });
    RoadmapItem {
        start_date,
        end_date,
        ..item.clone()
    }
}
