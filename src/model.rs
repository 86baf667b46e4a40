use crate::calendar::{index_to_date, ViewMode};
use crate::layout::LayoutMetrics;
use crate::reposition::{reposition, MoveRequest};
use crate::status::{cycle_status, swept, Status};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type ItemId = String;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Roadmap {
    pub name: String,
    #[serde(default)]
    pub settings: Settings,
    pub pillars: Vec<Pillar>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub items: Vec<RoadmapItem>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub view: ViewMode,
    pub dark: bool,
    pub period_size: f64,
    pub gap: f64,
    pub progress_step: u8,
}

impl Default for Settings {
    fn default() -> Self {
        let metrics = LayoutMetrics::default();
        Settings {
            view: ViewMode::Week,
            dark: true,
            period_size: metrics.period_size,
            gap: metrics.gap,
            progress_step: 10,
        }
    }
}

impl Settings {
    pub fn metrics(&self) -> LayoutMetrics {
        LayoutMetrics {
            period_size: self.period_size,
            gap: self.gap,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PillarColor {
    Salmon,
    Gold,
    Emerald,
    Azure,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Pillar {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub color: PillarColor,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub client: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoadmapItem {
    pub id: ItemId,
    pub title: String,
    /// Position of the owning pillar in [`Roadmap::pillars`].
    pub pillar: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub project: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RoadmapError {
    #[error("item not found: {0}")]
    ItemNotFound(String),
    #[error("item id already in use: {0}")]
    DuplicateId(String),
    #[error("pillar not found: {0}")]
    PillarNotFound(u32),
    #[error("pillar index {index} out of range ({count} pillars)")]
    PillarOutOfRange { index: usize, count: usize },
    #[error("project not found: {0}")]
    ProjectNotFound(String),
    #[error("end date {end} is before start date {start}")]
    InvertedSpan { start: NaiveDate, end: NaiveDate },
    #[error("progress {0} is outside 0..=100")]
    ProgressOutOfRange(u8),
    #[error("title must not be empty")]
    EmptyTitle,
}

impl Roadmap {
    pub fn default_named(name: impl Into<String>) -> Self {
        let pillar = |id: u32, color: PillarColor| Pillar {
            id,
            title: format!("Pillar {:02}", id),
            description: String::new(),
            color,
        };
        Roadmap {
            name: name.into(),
            settings: Settings::default(),
            pillars: vec![
                pillar(1, PillarColor::Salmon),
                pillar(2, PillarColor::Gold),
                pillar(3, PillarColor::Emerald),
                pillar(4, PillarColor::Azure),
            ],
            projects: Vec::new(),
            users: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn find_item(&self, id: &str) -> Option<&RoadmapItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_position(&self, id: &str) -> Result<usize, RoadmapError> {
        self.items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| RoadmapError::ItemNotFound(id.to_string()))
    }

    pub fn pillar_index(&self, pillar_id: u32) -> Result<usize, RoadmapError> {
        self.pillars
            .iter()
            .position(|p| p.id == pillar_id)
            .ok_or(RoadmapError::PillarNotFound(pillar_id))
    }

    pub fn find_project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn user_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.as_str())
            .unwrap_or(id)
    }

    /// Items of one pillar in collection order, optionally limited to a project.
    pub fn items_in_pillar<'a>(
        &'a self,
        pillar: usize,
        project: Option<&'a str>,
    ) -> impl Iterator<Item = &'a RoadmapItem> + 'a {
        self.items.iter().filter(move |item| {
            item.pillar == pillar && project.map_or(true, |p| item.project.as_deref() == Some(p))
        })
    }

    pub fn add_item(&mut self, item: RoadmapItem) -> Result<(), RoadmapError> {
        if self.find_item(&item.id).is_some() {
            return Err(RoadmapError::DuplicateId(item.id));
        }
        self.validate(&item)?;
        self.items.push(item);
        Ok(())
    }

    /// Apply `f` to a copy of the item and store it only if the fields it
    /// changed are valid. Untouched fields loaded from disk are never checked,
    /// so a stored malformed span does not block a status or progress change.
    pub fn update_item<F>(&mut self, id: &str, f: F) -> Result<&RoadmapItem, RoadmapError>
    where
        F: FnOnce(&mut RoadmapItem),
    {
        let idx = self.item_position(id)?;
        let mut updated = self.items[idx].clone();
        f(&mut updated);
        updated.id = self.items[idx].id.clone();
        self.validate_changes(&self.items[idx], &updated)?;
        updated.updated_at = Utc::now();
        self.items[idx] = updated;
        Ok(&self.items[idx])
    }

    pub fn remove_item(&mut self, id: &str) -> Result<RoadmapItem, RoadmapError> {
        let idx = self.item_position(id)?;
        Ok(self.items.remove(idx))
    }

    /// Copy an item under `new_id`, keeping its span. The copy is appended.
    pub fn duplicate_item(
        &mut self,
        id: &str,
        new_id: ItemId,
    ) -> Result<&RoadmapItem, RoadmapError> {
        if self.find_item(&new_id).is_some() {
            return Err(RoadmapError::DuplicateId(new_id));
        }
        let idx = self.item_position(id)?;
        let now = Utc::now();
        let source = &self.items[idx];
        let copy = RoadmapItem {
            id: new_id,
            title: format!("{} (copy)", source.title),
            created_at: now,
            updated_at: now,
            ..source.clone()
        };
        self.items.push(copy);
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn cycle_status(&mut self, id: &str, today: NaiveDate) -> Result<Status, RoadmapError> {
        let item = self.update_item(id, |item| {
            item.status = cycle_status(item.status, item.end_date, today);
        })?;
        Ok(item.status)
    }

    pub fn bump_progress(&mut self, id: &str, step: u8) -> Result<u8, RoadmapError> {
        let item = self.update_item(id, |item| {
            item.progress = item.progress.saturating_add(step).min(100);
        })?;
        Ok(item.progress)
    }

    /// Apply a resolved drag/move. The span keeps its duration; stored spans
    /// that are already malformed are carried over untouched.
    pub fn apply_move(
        &mut self,
        request: &MoveRequest,
        mode: ViewMode,
    ) -> Result<&RoadmapItem, RoadmapError> {
        self.check_pillar(request.target_pillar)?;
        let idx = self.item_position(&request.item_id)?;
        let mut moved = reposition(&self.items[idx], request.target_index, mode);
        moved.pillar = request.target_pillar;
        moved.updated_at = Utc::now();
        self.items[idx] = moved;
        Ok(&self.items[idx])
    }

    /// One-time overdue sweep run when the collection is loaded. Returns the
    /// ids whose stored status was rewritten to Delayed.
    pub fn sweep_overdue(&mut self, today: NaiveDate) -> Vec<ItemId> {
        let mut changed = Vec::new();
        for item in self.items.iter_mut() {
            if let Some(delayed) = swept(item, today) {
                changed.push(delayed.id.clone());
                *item = delayed;
            }
        }
        changed
    }

    fn check_pillar(&self, index: usize) -> Result<(), RoadmapError> {
        if index >= self.pillars.len() {
            return Err(RoadmapError::PillarOutOfRange {
                index,
                count: self.pillars.len(),
            });
        }
        Ok(())
    }

    fn validate_changes(
        &self,
        before: &RoadmapItem,
        after: &RoadmapItem,
    ) -> Result<(), RoadmapError> {
        if after.title != before.title && after.title.trim().is_empty() {
            return Err(RoadmapError::EmptyTitle);
        }
        if after.pillar != before.pillar {
            self.check_pillar(after.pillar)?;
        }
        let span_changed =
            after.start_date != before.start_date || after.end_date != before.end_date;
        if span_changed && after.end_date < after.start_date {
            return Err(RoadmapError::InvertedSpan {
                start: after.start_date,
                end: after.end_date,
            });
        }
        if after.progress != before.progress && after.progress > 100 {
            return Err(RoadmapError::ProgressOutOfRange(after.progress));
        }
        if after.project != before.project {
            if let Some(project) = after.project.as_deref() {
                if self.find_project(project).is_none() {
                    return Err(RoadmapError::ProjectNotFound(project.to_string()));
                }
            }
        }
        Ok(())
    }

    fn validate(&self, item: &RoadmapItem) -> Result<(), RoadmapError> {
        if item.title.trim().is_empty() {
            return Err(RoadmapError::EmptyTitle);
        }
        self.check_pillar(item.pillar)?;
        if item.end_date < item.start_date {
            return Err(RoadmapError::InvertedSpan {
                start: item.start_date,
                end: item.end_date,
            });
        }
        if item.progress > 100 {
            return Err(RoadmapError::ProgressOutOfRange(item.progress));
        }
        if let Some(project) = item.project.as_deref() {
            if self.find_project(project).is_none() {
                return Err(RoadmapError::ProjectNotFound(project.to_string()));
            }
        }
        Ok(())
    }
}

impl RoadmapItem {
    pub fn new(
        id: ItemId,
        title: String,
        pillar: usize,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        RoadmapItem {
            id,
            title,
            pillar,
            start_date,
            end_date,
            progress: 0,
            status: Status::Todo,
            tag: None,
            description: None,
            assignees: Vec::new(),
            project: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A fresh single-period item anchored at the start of period `index`.
    pub fn at_period(
        id: ItemId,
        title: String,
        pillar: usize,
        index: f64,
        mode: ViewMode,
    ) -> Self {
        let date = index_to_date(index, mode);
        RoadmapItem::new(id, title, pillar, date, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Roadmap {
        let mut roadmap = Roadmap::default_named("test");
        roadmap.projects.push(Project {
            id: "p1".into(),
            name: "Project Roadmap".into(),
            client: Some("HSBC".into()),
        });
        roadmap
            .add_item(RoadmapItem::new(
                "a".into(),
                "Pricing review".into(),
                0,
                ymd(2026, 2, 23),
                ymd(2026, 3, 9),
            ))
            .unwrap();
        roadmap
            .add_item(RoadmapItem::new(
                "b".into(),
                "Liquidity levels".into(),
                1,
                ymd(2026, 3, 9),
                ymd(2026, 3, 9),
            ))
            .unwrap();
        roadmap
    }

    #[test]
    fn default_roadmap_has_four_pillars() {
        let roadmap = Roadmap::default_named("x");
        let titles: Vec<&str> = roadmap.pillars.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Pillar 01", "Pillar 02", "Pillar 03", "Pillar 04"]);
        assert_eq!(roadmap.pillar_index(3), Ok(2));
        assert_eq!(roadmap.pillar_index(9), Err(RoadmapError::PillarNotFound(9)));
    }

    #[test]
    fn new_items_default_to_a_single_period() {
        let item = RoadmapItem::at_period("n".into(), "New".into(), 0, 2.0, ViewMode::Month);
        assert_eq!(item.start_date, ymd(2026, 4, 1));
        assert_eq!(item.end_date, item.start_date);
        assert_eq!(item.status, Status::Todo);
        assert_eq!(item.progress, 0);
    }

    #[test]
    fn add_rejects_invalid_items() {
        let mut roadmap = sample();
        let dup = RoadmapItem::new("a".into(), "Dup".into(), 0, ymd(2026, 3, 1), ymd(2026, 3, 1));
        assert_eq!(
            roadmap.add_item(dup),
            Err(RoadmapError::DuplicateId("a".into()))
        );
        let far = RoadmapItem::new("z".into(), "Far".into(), 7, ymd(2026, 3, 1), ymd(2026, 3, 1));
        assert!(matches!(
            roadmap.add_item(far),
            Err(RoadmapError::PillarOutOfRange { index: 7, count: 4 })
        ));
        let inverted =
            RoadmapItem::new("y".into(), "Back".into(), 0, ymd(2026, 3, 5), ymd(2026, 3, 1));
        assert!(matches!(
            roadmap.add_item(inverted),
            Err(RoadmapError::InvertedSpan { .. })
        ));
    }

    #[test]
    fn failed_update_leaves_item_untouched() {
        let mut roadmap = sample();
        let before = roadmap.find_item("a").cloned().unwrap();
        let err = roadmap
            .update_item("a", |item| item.project = Some("nope".into()))
            .unwrap_err();
        assert_eq!(err, RoadmapError::ProjectNotFound("nope".into()));
        assert_eq!(roadmap.find_item("a"), Some(&before));

        roadmap
            .update_item("a", |item| item.project = Some("p1".into()))
            .unwrap();
        assert_eq!(roadmap.items_in_pillar(0, Some("p1")).count(), 1);
        assert_eq!(roadmap.items_in_pillar(1, Some("p1")).count(), 0);
    }

    #[test]
    fn move_preserves_duration_and_changes_pillar() {
        let mut roadmap = sample();
        let request = MoveRequest {
            item_id: "a".into(),
            target_pillar: 3,
            target_index: 4.0,
        };
        let moved = roadmap.apply_move(&request, ViewMode::Week).unwrap();
        assert_eq!(moved.pillar, 3);
        assert_eq!(moved.start_date, ymd(2026, 3, 23));
        assert_eq!(moved.end_date, ymd(2026, 4, 6));

        let bad = MoveRequest {
            target_pillar: 4,
            ..request
        };
        assert!(matches!(
            roadmap.apply_move(&bad, ViewMode::Week),
            Err(RoadmapError::PillarOutOfRange { .. })
        ));
    }

    #[test]
    fn duplicate_gets_new_identity_and_same_span() {
        let mut roadmap = sample();
        let copy = roadmap.duplicate_item("a", "a2".into()).unwrap().clone();
        let original = roadmap.find_item("a").unwrap();
        assert_eq!(copy.title, "Pricing review (copy)");
        assert_eq!(copy.start_date, original.start_date);
        assert_eq!(copy.end_date, original.end_date);
        assert_eq!(roadmap.items.last().map(|i| i.id.as_str()), Some("a2"));
        assert!(roadmap.duplicate_item("a", "b".into()).is_err());
    }

    #[test]
    fn progress_bump_saturates() {
        let mut roadmap = sample();
        roadmap.update_item("b", |item| item.progress = 95).unwrap();
        assert_eq!(roadmap.bump_progress("b", 10), Ok(100));
        assert_eq!(roadmap.bump_progress("b", 10), Ok(100));
    }

    #[test]
    fn sweep_rewrites_only_overdue_open_items() {
        let mut roadmap = sample();
        roadmap.update_item("a", |item| item.status = Status::Done).unwrap();
        roadmap
            .update_item("b", |item| item.status = Status::InProgress)
            .unwrap();
        let changed = roadmap.sweep_overdue(ymd(2026, 3, 10));
        assert_eq!(changed, vec!["b".to_string()]);
        assert_eq!(roadmap.find_item("a").unwrap().status, Status::Done);
        assert_eq!(roadmap.find_item("b").unwrap().status, Status::Delayed);
        assert!(roadmap.sweep_overdue(ymd(2026, 3, 10)).is_empty());
    }

    #[test]
    fn stored_malformed_items_can_still_cycle_and_bump() {
        let mut roadmap = sample();
        let mut broken =
            RoadmapItem::new("x".into(), "Backwards".into(), 0, ymd(2026, 3, 16), ymd(2026, 3, 2));
        broken.project = Some("gone".into());
        roadmap.items.push(broken);

        assert_eq!(roadmap.cycle_status("x", ymd(2026, 3, 1)), Ok(Status::InProgress));
        assert_eq!(roadmap.bump_progress("x", 10), Ok(10));
        roadmap
            .update_item("x", |item| item.title = "Renamed".into())
            .unwrap();
        let stored = roadmap.find_item("x").unwrap();
        assert_eq!(stored.end_date, ymd(2026, 3, 2));
        assert_eq!(stored.project.as_deref(), Some("gone"));

        assert!(matches!(
            roadmap.update_item("x", |item| item.end_date = ymd(2026, 3, 9)),
            Err(RoadmapError::InvertedSpan { .. })
        ));
        roadmap
            .update_item("x", |item| item.end_date = ymd(2026, 3, 20))
            .unwrap();
    }

    #[test]
    fn remove_then_lookup_fails() {
        let mut roadmap = sample();
        assert_eq!(roadmap.remove_item("a").map(|i| i.id), Ok("a".to_string()));
        assert_eq!(
            roadmap.cycle_status("a", ymd(2026, 3, 1)),
            Err(RoadmapError::ItemNotFound("a".into()))
        );
    }
}
