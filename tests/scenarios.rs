use chrono::NaiveDate;
use roadmap::board::layout_board;
use roadmap::calendar::{date_to_index, index_to_date, period_labels, ViewMode};
use roadmap::layout::{pack_column, IndexedItem, LayoutMetrics};
use roadmap::model::{Roadmap, RoadmapItem};
use roadmap::reposition::MoveRequest;
use roadmap::status::{item_effective_status, Status};
use roadmap::storage::{init_project_board_in, load_board, save_board};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn item(id: &str, pillar: usize, start: NaiveDate, end: NaiveDate) -> RoadmapItem {
    RoadmapItem::new(id.into(), format!("Item {}", id), pillar, start, end)
}

#[test]
fn month_view_wraps_after_a_year() {
    assert_eq!(index_to_date(11.0, ViewMode::Month), ymd(2027, 1, 1));
    assert_eq!(index_to_date(12.0, ViewMode::Month), ymd(2026, 2, 1));
}

#[test]
fn quarter_view_starts_in_january() {
    assert_eq!(index_to_date(4.0, ViewMode::Quarter), ymd(2027, 1, 1));
    assert_eq!(date_to_index(ymd(2027, 1, 1), ViewMode::Quarter), 4.0);
}

#[test]
fn fractional_weeks_floor_to_whole_days() {
    assert_eq!(index_to_date(1.5, ViewMode::Week), ymd(2026, 3, 5));
}

#[test]
fn packing_reuses_a_lane_once_it_is_free() {
    let day = ymd(2026, 3, 2);
    let spans = [("a", 0.0, 2.0), ("b", 1.0, 1.0), ("c", 3.0, 3.0)];
    let items = spans
        .iter()
        .map(|(id, start, end)| IndexedItem {
            item: item(id, 0, day, day),
            start_index: *start,
            end_index: *end,
        })
        .collect();
    let packing = pack_column(items, 16, LayoutMetrics::default()).unwrap();
    assert_eq!(packing.lane_count, 2);
    let lanes: Vec<(&str, usize)> = packing
        .items
        .iter()
        .map(|p| (p.item.id.as_str(), p.lane))
        .collect();
    assert_eq!(lanes, vec![("a", 0), ("b", 1), ("c", 0)]);
}

#[test]
fn dropping_an_item_keeps_its_two_weeks() {
    let mut roadmap = Roadmap::default_named("scenario");
    roadmap
        .add_item(item("a", 0, ymd(2026, 3, 1), ymd(2026, 3, 15)))
        .unwrap();
    let request = MoveRequest {
        item_id: "a".into(),
        target_pillar: 2,
        target_index: date_to_index(ymd(2026, 4, 1), ViewMode::Month),
    };
    let moved = roadmap.apply_move(&request, ViewMode::Month).unwrap();
    assert_eq!(moved.start_date, ymd(2026, 4, 1));
    assert_eq!(moved.end_date, ymd(2026, 4, 15));
    assert_eq!(moved.pillar, 2);
}

#[test]
fn sweep_and_display_agree_on_overdue_items() {
    let today = ymd(2026, 3, 10);
    let mut roadmap = Roadmap::default_named("scenario");
    let mut late = item("late", 0, ymd(2026, 3, 2), today.pred_opt().unwrap());
    late.status = Status::InProgress;
    roadmap.add_item(late).unwrap();

    let before = item_effective_status(roadmap.find_item("late").unwrap(), today);
    assert_eq!(before, Status::Delayed);
    assert_eq!(roadmap.find_item("late").unwrap().status, Status::InProgress);

    assert_eq!(roadmap.sweep_overdue(today), vec!["late".to_string()]);
    let stored = roadmap.find_item("late").unwrap();
    assert_eq!(stored.status, Status::Delayed);
    assert_eq!(item_effective_status(stored, today), before);
}

#[test]
fn saved_board_lays_out_the_same_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let location = init_project_board_in(dir.path(), Some("Bank roadmap".into())).unwrap();
    let mut roadmap = load_board(&location).unwrap();
    roadmap
        .add_item(item("a", 0, ymd(2026, 2, 23), ymd(2026, 3, 9)))
        .unwrap();
    roadmap
        .add_item(item("b", 0, ymd(2026, 3, 2), ymd(2026, 3, 2)))
        .unwrap();
    roadmap
        .add_item(item("c", 3, ymd(2026, 12, 1), ymd(2027, 3, 1)))
        .unwrap();
    save_board(&location, &roadmap).unwrap();

    let reloaded = load_board(&location).unwrap();
    assert_eq!(reloaded, roadmap);
    for mode in ViewMode::ALL {
        let before = layout_board(&roadmap, mode, roadmap.settings.metrics(), None).unwrap();
        let after = layout_board(&reloaded, mode, reloaded.settings.metrics(), None).unwrap();
        assert_eq!(before, after);
        assert_eq!(after.labels, period_labels(mode));
    }

    let month = layout_board(&reloaded, ViewMode::Month, LayoutMetrics::default(), None).unwrap();
    let wrapped = &month.columns[3].items[0];
    assert_eq!(wrapped.start_index, 10.0);
    assert_eq!(wrapped.end_index, 11.0);
}
